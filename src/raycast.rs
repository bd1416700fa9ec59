//! Raycast service over detected surfaces.
//!
//! Controllers point with a ray, the shadow projector casts straight down,
//! and the spawner needs to know which triangle of a surface proxy was
//! struck. All queries here are world-space and read-only: the surface set
//! is owned by the scanning collaborator and only borrowed per frame.

use glam::Vec3;

use crate::input::Pose;
use crate::surface::{SurfaceId, SurfaceSet};

/// Intersections closer than this are rejected as self-hits.
const MIN_HIT_DISTANCE: f32 = 1e-4;

/// A world-space ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// The pointing ray of a controller pose. Controllers point along their
    /// local -Z axis.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.forward())
    }

    /// Point along the ray at parameter `t`.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the closest approach of `center`, if the
    /// ray passes within `radius` of it in front of the origin.
    ///
    /// Used as the grab test against a core's bounding sphere.
    pub fn passes_within(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let t = to_center.dot(self.direction);
        if t < 0.0 {
            return None;
        }
        let closest = self.point_at(t);
        if closest.distance_squared(center) <= radius * radius {
            Some(t)
        } else {
            None
        }
    }
}

/// The nearest intersection of a ray with a surface set.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The struck surface.
    pub surface: SurfaceId,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// The three vertices of the struck triangle, used for face
    /// classification by the spawner.
    pub triangle: [Vec3; 3],
}

/// Ray/triangle intersection (Moller-Trumbore), returning the distance along
/// the ray. Backfaces count as hits; surface proxies are struck from either
/// side depending on where the user stands.
pub fn intersect_triangle(ray: &Ray, triangle: &[Vec3; 3]) -> Option<f32> {
    let edge1 = triangle[1] - triangle[0];
    let edge2 = triangle[2] - triangle[0];
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - triangle[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    if t > MIN_HIT_DISTANCE {
        Some(t)
    } else {
        None
    }
}

/// Find the nearest hit of `ray` against every surface in the set.
pub fn nearest_hit(ray: &Ray, surfaces: &SurfaceSet) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for (id, surface) in surfaces.iter() {
        for triangle in surface.triangles() {
            if let Some(distance) = intersect_triangle(ray, triangle) {
                if best.map_or(true, |hit| distance < hit.distance) {
                    best = Some(RayHit {
                        surface: id,
                        distance,
                        point: ray.point_at(distance),
                        triangle: *triangle,
                    });
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, Scene};
    use crate::surface::{quad_triangles, Surface, SurfaceLabel};

    #[test]
    fn test_triangle_hit_and_miss() {
        let triangle = [
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        ];
        let hit = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((intersect_triangle(&hit, &triangle).unwrap() - 2.0).abs() < 1e-6);

        let miss = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(intersect_triangle(&miss, &triangle).is_none());

        // Behind the origin
        let behind = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(intersect_triangle(&behind, &triangle).is_none());
    }

    #[test]
    fn test_backface_still_hits() {
        let triangle = [
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
        ];
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(intersect_triangle(&ray, &triangle).is_some());
    }

    #[test]
    fn test_nearest_hit_picks_closest_surface() {
        let mut scene = Scene::new();
        let node = scene.add_at_root(NodeKind::Group);
        let mut set = SurfaceSet::new();
        let far = set.add(Surface::new(
            SurfaceLabel::Wall,
            quad_triangles(Vec3::new(0.0, 0.0, -5.0), Vec3::X, Vec3::Y),
            node,
        ));
        let near = set.add(Surface::new(
            SurfaceLabel::Screen,
            quad_triangles(Vec3::new(0.0, 0.0, -2.0), Vec3::X, Vec3::Y),
            node,
        ));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = nearest_hit(&ray, &set).unwrap();
        assert_eq!(hit.surface, near);
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);

        set.remove(near);
        let hit = nearest_hit(&ray, &set).unwrap();
        assert_eq!(hit.surface, far);
    }

    #[test]
    fn test_nearest_hit_empty_set() {
        let set = SurfaceSet::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(nearest_hit(&ray, &set).is_none());
    }

    #[test]
    fn test_passes_within_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        // Dead center
        assert!(ray.passes_within(Vec3::new(0.0, 0.0, -3.0), 0.1).is_some());
        // Within radius off to the side
        assert!(ray
            .passes_within(Vec3::new(0.05, 0.0, -3.0), 0.1)
            .is_some());
        // Outside radius
        assert!(ray.passes_within(Vec3::new(0.5, 0.0, -3.0), 0.1).is_none());
        // Behind the origin
        assert!(ray.passes_within(Vec3::new(0.0, 0.0, 3.0), 0.1).is_none());
    }
}
