//! Scene aggregate and the recursive path integrator.

use crate::{Color, Hit, Sphere};
use glint_math::{Interval, Ray};
use rand::RngCore;

/// An ordered collection of spheres.
///
/// Insertion order matters only for exact ties: when two spheres are hit at
/// the same distance, the one added first wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene from spheres, keeping their order.
    pub fn with_spheres(spheres: impl IntoIterator<Item = Sphere>) -> Self {
        let spheres: Vec<Sphere> = spheres.into_iter().collect();
        log::debug!("Scene created with {} spheres", spheres.len());
        Self { spheres }
    }

    /// Append a sphere.
    pub fn add(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Find the closest sphere along the ray within `ray_t`.
    ///
    /// Ray directions are unit length, so `t` is the distance from the ray
    /// origin. Only a strictly smaller `t` replaces the current best.
    pub fn nearest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<(&Sphere, Hit)> {
        let mut closest: Option<(&Sphere, Hit)> = None;

        for sphere in &self.spheres {
            if let Some(hit) = sphere.intersect(ray, ray_t) {
                match closest {
                    Some((_, best)) if best.t <= hit.t => {}
                    _ => closest = Some((sphere, hit)),
                }
            }
        }

        closest
    }

    /// Compute the color carried back along `ray`.
    ///
    /// `depth < 0` returns `background` without touching the scene, so a
    /// starting depth of `D` evaluates at most `D + 1` scattering events.
    /// Misses return `background`; absorbed paths return black.
    pub fn trace(
        &self,
        ray: &Ray,
        background: Color,
        ray_t: Interval,
        depth: i32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if depth < 0 {
            return background;
        }

        let Some((sphere, hit)) = self.nearest_hit(ray, ray_t) else {
            return background;
        };

        match sphere.material().scatter(ray, &hit, rng) {
            Some(result) => {
                result.attenuation * self.trace(&result.scattered, background, ray_t, depth - 1, rng)
            }
            None => Color::ZERO,
        }
    }
}
