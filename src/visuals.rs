//! Visual catalog for renderable nodes.
//!
//! The crate never touches the GPU; it only tags scene nodes with *what* an
//! external renderer should draw. This module holds those tags: the small set
//! of core geometries, the matcap material slots the embedding application
//! provides textures for, and the color helpers used by the flame effect.
//!
//! # Usage
//!
//! ```ignore
//! let geometry = CoreGeometry::random(&mut rng);
//! let material = Matcap::random(&mut rng);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

/// Geometry variants a core can be built from.
///
/// Picked at random each time a container generates a fresh core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreGeometry {
    /// Icosahedron with radius 0.1.
    Icosahedron,
    /// Torus knot, tube radius 0.03 around a 0.05 path.
    TorusKnot,
    /// Dodecahedron with radius 0.1.
    Dodecahedron,
}

impl CoreGeometry {
    /// All geometry variants, in catalog order.
    pub const ALL: [CoreGeometry; 3] = [
        CoreGeometry::Icosahedron,
        CoreGeometry::TorusKnot,
        CoreGeometry::Dodecahedron,
    ];

    /// Pick a random geometry from the catalog.
    pub fn random(rng: &mut SmallRng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A matcap material slot.
///
/// The index refers to one of the matcap textures the embedding application
/// loads; this crate only chooses which slot a node uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcap(pub u8);

impl Matcap {
    /// Number of matcap slots the renderer is expected to provide.
    pub const COUNT: u8 = 6;

    /// Pick a random matcap slot.
    pub fn random(rng: &mut SmallRng) -> Self {
        Matcap(rng.gen_range(0..Self::COUNT))
    }
}

/// Linear interpolation between two RGB colors.
#[inline]
pub fn lerp_rgb(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_picks_stay_in_catalog() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let geometry = CoreGeometry::random(&mut rng);
            assert!(CoreGeometry::ALL.contains(&geometry));
            let matcap = Matcap::random(&mut rng);
            assert!(matcap.0 < Matcap::COUNT);
        }
    }

    #[test]
    fn test_lerp_rgb_endpoints() {
        let a = Vec3::new(1.0, 1.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(lerp_rgb(a, b, 0.0), a);
        assert_eq!(lerp_rgb(a, b, 1.0), b);
        assert_eq!(lerp_rgb(a, b, 0.5), Vec3::new(1.0, 0.5, 0.0));
        // Out-of-range t clamps instead of extrapolating
        assert_eq!(lerp_rgb(a, b, 2.0), b);
    }
}
