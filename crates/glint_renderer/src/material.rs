//! Surface materials and how they scatter light.

use crate::error::{RenderError, RenderResult};
use crate::hittable::Hit;
use crate::sampling::{gen_f32, random_unit_vector};
use glint_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of a successful scatter: how much light survives and where it goes next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
///
/// `roughness` ranges from 0 (mirror / clean refraction) to 1 (fully
/// randomized). Diffuse and metal share the same glossy reflection model;
/// diffuse is its fully rough end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Matte surface
    Diffuse { albedo: Color, roughness: f32 },
    /// Reflective surface, perturbed by roughness
    Metal { albedo: Color, roughness: f32 },
    /// Transparent surface that reflects or refracts
    Dielectric {
        albedo: Color,
        roughness: f32,
        /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
        refraction_index: f32,
    },
}

impl Material {
    /// Fully rough matte material.
    pub fn diffuse(albedo: Color) -> Self {
        Material::Diffuse {
            albedo,
            roughness: 1.0,
        }
    }

    /// Reflective material.
    ///
    /// - `albedo`: The color of the metal
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough
    pub fn metal(albedo: Color, roughness: f32) -> Self {
        Material::Metal { albedo, roughness }
    }

    /// Clear, smooth dielectric.
    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric {
            albedo: Color::ONE,
            roughness: 0.0,
            refraction_index,
        }
    }

    /// Map the flag encoding (`is_dielectric` + `roughness`) onto a variant.
    ///
    /// Non-dielectric surfaces with `roughness >= 1` become `Diffuse`,
    /// anything smoother becomes `Metal`.
    pub fn from_flags(albedo: Color, roughness: f32, refraction_index: f32, is_dielectric: bool) -> Self {
        if is_dielectric {
            Material::Dielectric {
                albedo,
                roughness,
                refraction_index,
            }
        } else if roughness >= 1.0 {
            Material::Diffuse { albedo, roughness }
        } else {
            Material::Metal { albedo, roughness }
        }
    }

    /// Replace the albedo, keeping the variant.
    pub fn with_albedo(mut self, color: Color) -> Self {
        match &mut self {
            Material::Diffuse { albedo, .. }
            | Material::Metal { albedo, .. }
            | Material::Dielectric { albedo, .. } => *albedo = color,
        }
        self
    }

    /// Replace the roughness, keeping the variant.
    pub fn with_roughness(mut self, value: f32) -> Self {
        match &mut self {
            Material::Diffuse { roughness, .. }
            | Material::Metal { roughness, .. }
            | Material::Dielectric { roughness, .. } => *roughness = value,
        }
        self
    }

    pub fn albedo(&self) -> Color {
        match *self {
            Material::Diffuse { albedo, .. }
            | Material::Metal { albedo, .. }
            | Material::Dielectric { albedo, .. } => albedo,
        }
    }

    pub fn roughness(&self) -> f32 {
        match *self {
            Material::Diffuse { roughness, .. }
            | Material::Metal { roughness, .. }
            | Material::Dielectric { roughness, .. } => roughness,
        }
    }

    /// Check albedo and roughness lie in [0, 1] and the refraction index is positive.
    pub fn validate(&self) -> RenderResult<()> {
        let albedo = self.albedo();
        if !albedo.to_array().iter().all(|&c| Interval::UNIT.contains(c)) {
            return Err(RenderError::InvalidMaterial(format!(
                "albedo {albedo:?} must have every channel in [0, 1]"
            )));
        }

        let roughness = self.roughness();
        if !Interval::UNIT.contains(roughness) {
            return Err(RenderError::InvalidMaterial(format!(
                "roughness {roughness} must be in [0, 1]"
            )));
        }

        if let Material::Dielectric {
            refraction_index, ..
        } = *self
        {
            if !(refraction_index.is_finite() && refraction_index > 0.0) {
                return Err(RenderError::InvalidMaterial(format!(
                    "refraction index {refraction_index} must be finite and positive"
                )));
            }
        }

        Ok(())
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` when the ray is absorbed, which ends the path.
    pub fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        match *self {
            Material::Diffuse { albedo, roughness } | Material::Metal { albedo, roughness } => {
                scatter_glossy(albedo, roughness, ray_in, hit, rng)
            }
            Material::Dielectric {
                albedo,
                roughness,
                refraction_index,
            } => Some(scatter_dielectric(
                albedo,
                roughness,
                refraction_index,
                ray_in,
                hit,
                rng,
            )),
        }
    }
}

fn scatter_glossy(
    albedo: Color,
    roughness: f32,
    ray_in: &Ray,
    hit: &Hit,
    rng: &mut dyn RngCore,
) -> Option<ScatterRecord> {
    let mut direction = reflect(ray_in.direction(), hit.normal);
    if direction == Vec3::ZERO {
        direction = hit.normal;
    }
    let direction = (direction + roughness * random_unit_vector(rng)).normalize_or_zero();

    // Perturbed into the surface: absorbed
    if direction.dot(hit.normal) <= 0.0 {
        return None;
    }

    Some(ScatterRecord {
        attenuation: albedo,
        scattered: Ray::new(hit.point, direction),
    })
}

fn scatter_dielectric(
    albedo: Color,
    roughness: f32,
    refraction_index: f32,
    ray_in: &Ray,
    hit: &Hit,
    rng: &mut dyn RngCore,
) -> ScatterRecord {
    let unit_direction = ray_in.direction();
    let refraction_ratio = if hit.is_front_face() {
        1.0 / refraction_index
    } else {
        refraction_index
    };

    let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    // Total internal reflection
    let cannot_refract = refraction_ratio * sin_theta > 1.0;

    let direction = if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
        reflect(unit_direction, hit.normal)
    } else {
        let refracted = refract(unit_direction, hit.normal, refraction_ratio);
        if refracted == Vec3::ZERO {
            hit.normal
        } else {
            refracted
        }
    };

    ScatterRecord {
        attenuation: albedo,
        scattered: Ray::new(hit.point, direction + roughness * random_unit_vector(rng)),
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflectance weight used to pick reflection over refraction.
///
/// This is `r0 * (1 - r0) * (1 - cos)^5`, a weaker variant of Schlick's
/// approximation. Renders are tuned against it, keep the exact form.
#[inline]
fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 * (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface, or zero when no refraction exists.
#[inline]
fn refract(uv: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_i = n.dot(uv);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * uv - (eta * cos_i + k.sqrt()) * n
    }
}
