use crate::{Mat4, Vec2, Vec3};

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// First-person fly camera (right-handed, +Y up).
///
/// Orientation is stored as yaw/pitch in radians. Yaw 0 looks down +X,
/// yaw -90deg looks down -Z.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Radians of rotation per unit of mouse delta.
    pub sensitivity: f32,
    last_mouse: Option<Vec2>,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            sensitivity: 0.1f32.to_radians(),
            last_mouse: None,
        }
    }

    #[inline]
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn move_forward(&mut self, step: f32) {
        self.position += self.forward() * step;
    }

    pub fn move_backward(&mut self, step: f32) {
        self.position -= self.forward() * step;
    }

    pub fn move_left(&mut self, step: f32) {
        self.position -= self.right() * step;
    }

    pub fn move_right(&mut self, step: f32) {
        self.position += self.right() * step;
    }

    pub fn move_up(&mut self, step: f32) {
        self.position.y += step;
    }

    pub fn move_down(&mut self, step: f32) {
        self.position.y -= step;
    }

    /// Feed an absolute mouse position. The first sample only primes the
    /// reference point; later samples rotate by the delta to the previous one.
    pub fn mouse_look(&mut self, x: f32, y: f32) {
        let current = Vec2::new(x, y);
        if let Some(previous) = self.last_mouse.replace(current) {
            let delta = current - previous;
            self.yaw += delta.x * self.sensitivity;
            self.pitch = (self.pitch - delta.y * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 5.0), -90f32.to_radians(), 0.0)
    }
}

/// Perspective projection parameters.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fov_y_rad: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_rad,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            z_near,
            z_far,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Depth range [0, 1], matching wgpu clip space.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn movement_is_additive() {
        let mut cam = Camera::default();
        cam.mouse_look(0.0, 0.0);
        cam.mouse_look(37.0, -12.0);
        let start = cam.position;

        cam.move_forward(0.75);
        assert_ne!(cam.position, start);
        cam.move_backward(0.75);
        assert_close(cam.position, start);

        cam.move_left(1.5);
        cam.move_right(1.5);
        assert_close(cam.position, start);

        cam.move_up(0.01);
        cam.move_down(0.01);
        assert_close(cam.position, start);
    }

    #[test]
    fn strafe_is_perpendicular_to_forward() {
        let cam = Camera::new(Vec3::ZERO, 0.3, 0.4);
        assert!(cam.right().dot(cam.forward()).abs() < 1e-5);
        assert!(cam.right().y.abs() < 1e-6);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        assert_close(Camera::default().forward(), Vec3::NEG_Z);
    }

    #[test]
    fn first_mouse_sample_only_primes() {
        let mut cam = Camera::default();
        let (yaw, pitch) = (cam.yaw, cam.pitch);
        cam.mouse_look(512.0, 384.0);
        assert_eq!((cam.yaw, cam.pitch), (yaw, pitch));

        cam.mouse_look(522.0, 384.0);
        assert!((cam.yaw - (yaw + 10.0 * cam.sensitivity)).abs() < 1e-6);
        assert_eq!(cam.pitch, pitch);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default().with_sensitivity(1.0f32.to_radians());
        cam.mouse_look(0.0, 0.0);
        cam.mouse_look(0.0, -10_000.0);
        assert!(cam.pitch <= PITCH_LIMIT + 1e-6);
        cam.mouse_look(0.0, 10_000.0);
        assert!(cam.pitch >= -PITCH_LIMIT - 1e-6);
    }

    #[test]
    fn view_matrix_is_invertible() {
        let mut cam = Camera::default().with_sensitivity(1.0f32.to_radians());
        cam.mouse_look(0.0, 0.0);
        for (x, y) in [(0.0, -500.0), (90.0, 1000.0), (-400.0, 3.0), (7.0, -2000.0)] {
            cam.mouse_look(x, y);
            cam.move_forward(0.3);
            let view = cam.view_matrix();
            let det = view.determinant();
            assert!(det.is_finite() && det.abs() > 1e-4, "det = {det}");
            let round_trip = view * view.inverse();
            assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-4));
        }
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut proj = Projection::new(1024, 768, 45f32.to_radians(), 0.1, 100.0);
        assert!((proj.aspect - 1024.0 / 768.0).abs() < 1e-6);
        proj.resize(800, 0);
        assert!((proj.aspect - 800.0).abs() < 1e-6);
    }
}
