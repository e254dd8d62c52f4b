use crate::math::{mat4_mul, Mat4, Vec3};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            yaw,
            pitch,
            fov: std::f32::consts::PI / 3.0,
            near: 0.1,
            far: 1000.0,
        };
        camera.update_vectors();
        camera
    }

    pub fn update_vectors(&mut self) {
        let forward = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();

        let world_up = Vec3::new(0.0, 1.0, 0.0);
        let right = forward.cross(world_up).normalize();

        self.forward = forward;
        self.right = if right.length_squared() < 1e-6 {
            Vec3::new(1.0, 0.0, 0.0)
        } else {
            right
        };
        self.up = self.right.cross(forward).normalize();
    }

    /// Distance along the view direction; positive in front of the camera.
    pub fn view_depth(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.forward)
    }

    /// Right-handed view matrix looking down -Z, column-major.
    pub fn view_matrix(&self) -> Mat4 {
        let (r, u, f, p) = (self.right, self.up, self.forward, self.position);
        [
            r.x, u.x, -f.x, 0.0, //
            r.y, u.y, -f.y, 0.0, //
            r.z, u.z, -f.z, 0.0, //
            -r.dot(p), -u.dot(p), f.dot(p), 1.0,
        ]
    }

    /// OpenGL-style perspective projection, column-major.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let f = 1.0 / (self.fov * 0.5).tan().max(1e-6);
        let aspect = aspect.max(1e-6);
        let range_inv = 1.0 / (self.near - self.far);
        [
            f / aspect, 0.0, 0.0, 0.0, //
            0.0, f, 0.0, 0.0, //
            0.0, 0.0, (self.near + self.far) * range_inv, -1.0, //
            0.0, 0.0, 2.0 * self.near * self.far * range_inv, 0.0,
        ]
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        mat4_mul(&self.projection_matrix(aspect), &self.view_matrix())
    }
}

pub fn look_at_target(camera: &mut Camera, target: Vec3) {
    let to_target = (target - camera.position).normalize();
    if to_target.length_squared() < 1e-8 {
        return;
    }
    camera.yaw = to_target.z.atan2(to_target.x);
    camera.pitch = to_target.y.clamp(-1.0, 1.0).asin();
    camera.update_vectors();
}

/// Point on a horizontal circle of `radius` around `target`, raised by
/// `height`.
pub fn orbit_position(target: Vec3, radius: f32, angle: f32, height: f32) -> Vec3 {
    Vec3::new(
        target.x + radius * angle.sin(),
        target.y + height,
        target.z + radius * angle.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4_transform_point;

    fn camera_looking_at_origin() -> Camera {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), -std::f32::consts::FRAC_PI_2, 0.0);
        look_at_target(&mut camera, Vec3::ZERO);
        camera
    }

    #[test]
    fn view_matrix_puts_target_on_negative_z() {
        let camera = camera_looking_at_origin();
        let p = mat4_transform_point(&camera.view_matrix(), Vec3::ZERO);
        assert!(p[0].abs() < 1e-5 && p[1].abs() < 1e-5);
        assert!((p[2] + 5.0).abs() < 1e-5);
    }

    #[test]
    fn projected_depth_grows_with_distance() {
        let camera = camera_looking_at_origin();
        let vp = camera.view_projection(16.0 / 9.0);
        let near = mat4_transform_point(&vp, Vec3::new(0.0, 0.0, 2.0));
        let far = mat4_transform_point(&vp, Vec3::new(0.0, 0.0, -3.0));
        assert!(far[2] > near[2]);

        // Entries 2, 6, 10 form a positive multiple of the view direction.
        let row = Vec3::new(vp[2], vp[6], vp[10]);
        assert!(row.normalize().dot(camera.forward) > 0.999);
    }

    #[test]
    fn orbit_keeps_radius() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        for step in 0..8 {
            let p = orbit_position(target, 4.0, step as f32 * 0.7, 0.0);
            assert!(((p - target).length() - 4.0).abs() < 1e-4);
        }
    }

    #[test]
    fn view_depth_matches_distance_along_forward() {
        let camera = camera_looking_at_origin();
        assert!((camera.view_depth(Vec3::ZERO) - 5.0).abs() < 1e-5);
        assert!(camera.view_depth(Vec3::new(0.0, 0.0, 10.0)) < 0.0);
    }
}
