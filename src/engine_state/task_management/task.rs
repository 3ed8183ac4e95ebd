//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which runs work on background threads and applies the results on the main
//! thread.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with the world
//! 5. The result can spawn follow-up tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Results are the only way task output reaches the world, so chunk state is
//!   never mutated while the render pass reads it

use crate::engine_state::voxels::world::World;

/// A unit of work executed on a worker thread.
///
/// Tasks should own all the data they need (shared services behind `Arc`) and
/// must not hold references into main-thread state.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a background thread. Errors are handled inside the task and
    /// reflected in the result.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`, applied on the main thread.
pub trait TaskResult: Send {
    /// Applies the result to the world.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (usually empty).
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>>;
}
