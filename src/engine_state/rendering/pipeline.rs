//! Per-frame transform, cull and project pipeline.
//!
//! Every face of the world mesh goes through the same steps:
//!
//! 1. backface cull against the camera position
//! 2. translate and rotate the four corners into view space (yaw, then pitch)
//! 3. near-plane cull: any corner closer than `near` drops the whole face
//! 4. perspective divide into screen space
//! 5. screen-bounds cull: at least one corner must land on the surface
//!
//! The trigonometry is computed once per frame into a [`FrameView`]; the
//! per-face step is a pure function of the face and that snapshot, so it can
//! run on the rayon pool without changing the result.

use cgmath::{Angle, InnerSpace, MetricSpace, Point2, Point3, Vector3};
use rayon::prelude::*;

use super::meshing::Face;
use crate::config::Rgb;
use crate::engine_state::camera_state::camera::Camera;

/// Faces whose normal·(face − camera) is above this are facing away.
pub const BACKFACE_THRESHOLD: f32 = -0.5;

/// Camera and surface parameters shared by every face of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    camera: Point3<f32>,
    sin_yaw: f32,
    cos_yaw: f32,
    sin_pitch: f32,
    cos_pitch: f32,
    width: f32,
    height: f32,
    half_width: f32,
    half_height: f32,
    near: f32,
}

/// A face that survived culling, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedFace {
    pub points: [Point2<f32>; 4],
    pub color: Rgb,
    /// Squared distance from the camera to the face's voxel.
    pub depth: f32,
}

impl FrameView {
    pub fn new(camera: &Camera, size: (u32, u32), near: f32) -> Self {
        // The world turns the opposite way to the camera.
        let (sin_yaw, cos_yaw) = (-camera.yaw).sin_cos();
        let (sin_pitch, cos_pitch) = camera.pitch.sin_cos();
        let (width, height) = (size.0 as f32, size.1 as f32);
        Self {
            camera: camera.position,
            sin_yaw,
            cos_yaw,
            sin_pitch,
            cos_pitch,
            width,
            height,
            half_width: width / 2.0,
            half_height: height / 2.0,
            near,
        }
    }

    /// Moves a world point into view space.
    pub fn to_view(&self, point: Point3<f32>) -> Vector3<f32> {
        let Vector3 { x, y, z } = point - self.camera;

        let x_yaw = x * self.cos_yaw + z * self.sin_yaw;
        let z_yaw = -x * self.sin_yaw + z * self.cos_yaw;

        let y_pitch = y * self.cos_pitch - z_yaw * self.sin_pitch;
        let z_pitch = y * self.sin_pitch + z_yaw * self.cos_pitch;

        Vector3::new(x_yaw, y_pitch, z_pitch)
    }

    /// Perspective divide into screen coordinates.
    ///
    /// Only called on points at or beyond the near plane.
    pub fn project(&self, view: Vector3<f32>) -> Point2<f32> {
        debug_assert!(view.z >= self.near, "projecting a point in front of the near plane");
        Point2::new(
            (view.x / view.z + 1.0) * self.half_width,
            (view.y / view.z + 1.0) * self.half_height,
        )
    }

    fn on_screen(&self, point: Point2<f32>) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Whether a face's outward side points at the camera.
    pub fn faces_camera(&self, face: &Face) -> bool {
        face.normal().dot(face.origin() - self.camera) <= BACKFACE_THRESHOLD
    }
}

/// Runs one face through the pipeline.
///
/// # Returns
/// `None` if the face was culled at any step.
pub fn process_face(face: &Face, view: &FrameView) -> Option<ProjectedFace> {
    if !view.faces_camera(face) {
        return None;
    }

    let rotated = face.vertices().map(|vertex| view.to_view(vertex));
    if rotated.iter().any(|vertex| vertex.z < view.near) {
        return None;
    }

    let points = rotated.map(|vertex| view.project(vertex));
    // A vertex counts only when it is inside on both axes; being inside the
    // width alone (or the height alone) does not keep the face.
    if !points.iter().any(|&point| view.on_screen(point)) {
        return None;
    }

    Some(ProjectedFace {
        points,
        color: face.color,
        depth: face.origin().distance2(view.camera),
    })
}

/// Runs every face through the pipeline, keeping mesh order.
pub fn process_mesh(faces: &[Face], view: &FrameView, parallel: bool) -> Vec<ProjectedFace> {
    if parallel {
        faces
            .par_iter()
            .filter_map(|face| process_face(face, view))
            .collect()
    } else {
        faces
            .iter()
            .filter_map(|face| process_face(face, view))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;
    use cgmath::Deg;

    const COLOR: Rgb = [10, 20, 30];

    fn view_from(position: [f32; 3], yaw: f32, pitch: f32) -> FrameView {
        let camera = Camera::new(Point3::from(position), Deg(yaw), Deg(pitch));
        FrameView::new(&camera, (200, 200), 0.1)
    }

    #[test]
    fn point_straight_ahead_projects_to_the_centre() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        let point = view.project(view.to_view(Point3::new(0.0, 0.0, 5.0)));
        assert_eq!(point, Point2::new(100.0, 100.0));
    }

    #[test]
    fn yaw_brings_the_side_into_view() {
        // Looking along +X, a point on +X is straight ahead.
        let view = view_from([0.0, 0.0, 0.0], 90.0, 0.0);
        let rotated = view.to_view(Point3::new(4.0, 0.0, 0.0));
        assert!((rotated.x).abs() < 1e-5);
        assert!((rotated.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn positive_pitch_looks_down() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 90.0);
        // +Y is down; pitched fully down it is straight ahead.
        let rotated = view.to_view(Point3::new(0.0, 3.0, 0.0));
        assert!((rotated.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn backface_cull_is_symmetric() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        for side in BlockSide::all() {
            // A voxel three steps out along this side's normal.
            let position = Point3::new(0, 0, 0) + side.offset() * 3;
            let opposite = BlockSide::from_index((side.index() ^ 1) as u8).unwrap();
            let towards = Face::new(position, opposite, COLOR);
            let away = Face::new(position, side, COLOR);
            assert!(view.faces_camera(&towards), "{:?} should face the camera", opposite);
            assert!(!view.faces_camera(&away), "{:?} should face away", side);
        }
    }

    #[test]
    fn faces_behind_or_at_the_camera_are_dropped() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        // Faces the camera, but lies behind it.
        let behind = Face::new(Point3::new(0, 0, -3), BlockSide::BACK, COLOR);
        assert!(view.faces_camera(&behind));
        assert!(process_face(&behind, &view).is_none());

        // The camera sits inside this voxel row; the face spans z = 0.
        let straddling = Face::new(Point3::new(0, 2, 0), BlockSide::TOP, COLOR);
        assert!(process_face(&straddling, &view).is_none());
    }

    #[test]
    fn surviving_faces_never_have_near_vertices() {
        let view = view_from([0.3, -1.7, 0.2], 33.0, 20.0);
        let mut survivors = 0;
        for x in -4..5 {
            for z in -4..5 {
                for side in BlockSide::all() {
                    let face = Face::new(Point3::new(x, 0, z), side, COLOR);
                    if process_face(&face, &view).is_some() {
                        survivors += 1;
                        assert!(face.vertices().iter().all(|&v| view.to_view(v).z >= 0.1));
                    }
                }
            }
        }
        assert!(survivors > 0);
    }

    #[test]
    fn off_screen_faces_are_dropped() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        // Far to the right of a 90 degree field of view.
        let face = Face::new(Point3::new(40, 0, 3), BlockSide::FRONT, COLOR);
        assert!(view.faces_camera(&face));
        assert!(process_face(&face, &view).is_none());
    }

    #[test]
    fn on_screen_needs_both_axes_inside() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        assert!(view.on_screen(Point2::new(100.0, 100.0)));
        assert!(view.on_screen(Point2::new(0.0, 200.0)));
        assert!(!view.on_screen(Point2::new(100.0, -5.0)));
        assert!(!view.on_screen(Point2::new(-5.0, 100.0)));
        assert!(!view.on_screen(Point2::new(250.0, 100.0)));

        // Vertical extent is on screen, horizontal extent is not.
        let beside = Face::new(Point3::new(40, 0, 3), BlockSide::FRONT, COLOR);
        let points = beside.vertices().map(|v| view.project(view.to_view(v)));
        assert!(points.iter().all(|p| (0.0..=200.0).contains(&p.y)));
        assert!(process_face(&beside, &view).is_none());
    }

    #[test]
    fn depth_is_squared_distance_to_the_voxel() {
        let view = view_from([0.0, 0.0, 0.0], 0.0, 0.0);
        let face = Face::new(Point3::new(1, 0, 4), BlockSide::FRONT, COLOR);
        let projected = process_face(&face, &view).unwrap();
        assert_eq!(projected.depth, 17.0);
        assert_eq!(projected.color, COLOR);
    }

    #[test]
    fn parallel_and_serial_agree() {
        let view = view_from([8.0, -2.0, 8.0], 20.0, 10.0);
        let faces: Vec<Face> = (0..16)
            .flat_map(|x| {
                (0..16).map(move |z| Face::new(Point3::new(x, 0, z), BlockSide::TOP, COLOR))
            })
            .collect();
        assert_eq!(process_mesh(&faces, &view, false), process_mesh(&faces, &view, true));
    }
}
