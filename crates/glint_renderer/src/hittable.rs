//! Hit records for ray-primitive intersection.

use glint_math::{Ray, Vec3};

/// Which side of a surface a ray struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The ray arrived from outside (entering the primitive).
    Front,
    /// The ray arrived from inside (exiting the primitive).
    Back,
}

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal, always oriented against the incoming ray
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the front or back face was hit
    pub surface: Surface,
}

impl Hit {
    /// Build a hit from an outward normal, flipping it when the ray exits.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3) -> Self {
        let point = ray.at(t);
        // Exiting when the ray and outward normal point the same way
        let (normal, surface) = if ray.direction().dot(outward_normal) > 0.0 {
            (-outward_normal, Surface::Back)
        } else {
            (outward_normal, Surface::Front)
        };

        Self {
            point,
            normal,
            t,
            surface,
        }
    }

    #[inline]
    pub fn is_front_face(&self) -> bool {
        self.surface == Surface::Front
    }
}
