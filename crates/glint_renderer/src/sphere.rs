//! Sphere primitive for ray tracing.

use crate::error::{RenderError, RenderResult};
use crate::hittable::Hit;
use crate::Material;
use glint_math::{Interval, Ray, Vec3};

/// A sphere primitive owning its material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere, rejecting non-finite geometry and invalid materials.
    pub fn new(center: Vec3, radius: f32, material: Material) -> RenderResult<Self> {
        if !center.is_finite() {
            return Err(RenderError::InvalidSphere(format!(
                "center {center:?} must be finite"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RenderError::InvalidSphere(format!(
                "radius {radius} must be finite and positive"
            )));
        }
        material.validate()?;

        Ok(Self {
            center,
            radius,
            material,
        })
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Intersect a ray with the sphere, accepting roots inside `ray_t` (inclusive).
    ///
    /// The nearer root wins when it is in range; otherwise the farther one
    /// is tried. A ray with a zero direction never hits.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        if ray.is_degenerate() {
            return None;
        }

        let a = ray.direction().length_squared();

        let oc = ray.origin() - self.center;
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center).normalize();
        Some(Hit::new(ray, root, outward_normal))
    }
}
