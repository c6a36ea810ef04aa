use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

const DEFAULT_UP: Vec3 = Vec3::Y;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Perspective camera used to turn cursor positions into world rays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    #[serde(default = "Camera3D::default_up")]
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    fn default_up() -> Vec3 {
        DEFAULT_UP
    }

    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    /// World-space ray through a point in normalized device coordinates (x right, y up,
    /// both in `[-1, 1]`).
    pub fn ndc_ray(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        if !ndc.is_finite() {
            return None;
        }
        let inv_view_proj = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if far.w.abs() < f32::EPSILON {
            return None;
        }
        let direction = far.truncate() / far.w - self.position;
        if direction.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(Ray { origin: self.position, direction: direction.normalize() })
    }
}

/// Converts a cursor position in pixels (origin top-left) to normalized device coordinates.
pub fn cursor_to_ndc(cursor: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(cursor.x / viewport.x * 2.0 - 1.0, 1.0 - cursor.y / viewport.y * 2.0))
}

pub fn ray_plane_intersection(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Point where the cursor ray hits the horizontal floor at `floor_height`.
pub fn pick_floor(camera: &Camera3D, ndc: Vec2, aspect: f32, floor_height: f32) -> Option<Vec3> {
    let ray = camera.ndc_ray(ndc, aspect)?;
    let t = ray_plane_intersection(&ray, Vec3::new(0.0, floor_height, 0.0), Vec3::Y)?;
    Some(ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_ray_hits_look_target_on_floor() {
        let camera = Camera3D::new(Vec3::new(0.0, 10.0, 10.0), Vec3::new(0.0, -1.0, 0.0), 0.6, 0.1, 100.0);
        let hit = pick_floor(&camera, Vec2::ZERO, 16.0 / 9.0, -1.0).expect("floor hit");
        assert!((hit - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-2, "hit={hit:?}");
    }

    #[test]
    fn parallel_and_backward_rays_miss() {
        let flat = Ray { origin: Vec3::new(0.0, 1.0, 0.0), direction: Vec3::X };
        assert_eq!(ray_plane_intersection(&flat, Vec3::ZERO, Vec3::Y), None);
        let upward = Ray { origin: Vec3::new(0.0, 1.0, 0.0), direction: Vec3::Y };
        assert_eq!(ray_plane_intersection(&upward, Vec3::ZERO, Vec3::Y), None);
    }

    #[test]
    fn cursor_maps_to_ndc_corners() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(cursor_to_ndc(Vec2::ZERO, viewport), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(cursor_to_ndc(viewport, viewport), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(cursor_to_ndc(Vec2::ZERO, Vec2::ZERO), None);
    }

    #[test]
    fn cursor_to_the_right_picks_positive_x() {
        let camera = Camera3D::new(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO, 0.6, 0.1, 100.0);
        let hit = pick_floor(&camera, Vec2::new(0.5, 0.0), 1.0, 0.0).expect("floor hit");
        assert!(hit.x > 0.5);
        assert!(hit.y.abs() < 1e-3);
    }
}
