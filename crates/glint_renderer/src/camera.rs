//! Thin-lens camera for ray generation.

use crate::error::{RenderError, RenderResult};
use crate::sampling::random_in_unit_disk;
use glint_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Camera placement and lens settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInfo {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Image width / height
    pub aspect_ratio: f32,
    /// Extra horizontal stretch, for displays with non-square pixels
    pub aspect_multiplier: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_distance: f32,
}

impl Default for CameraInfo {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            aspect_ratio: 16.0 / 9.0,
            aspect_multiplier: 1.0,
            fov_y: 90.0_f32.to_radians(),
            aperture: 0.0,
            focus_distance: 1.0,
        }
    }
}

impl CameraInfo {
    /// Set camera position.
    pub fn with_position(mut self, position: Vec3, target: Vec3, up: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self.up = up;
        self
    }

    /// Set lens settings. `fov_y` is in radians.
    pub fn with_lens(mut self, fov_y: f32, aperture: f32, focus_distance: f32) -> Self {
        self.fov_y = fov_y;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }

    /// Set aspect ratio and multiplier.
    pub fn with_aspect(mut self, aspect_ratio: f32, aspect_multiplier: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.aspect_multiplier = aspect_multiplier;
        self
    }
}

/// Camera with a cached orthonormal basis and viewport.
///
/// `w` points from the target back to the camera. The viewport height is
/// negative, so `(0, 0)` maps to the top-left of the image and raster rows
/// can be fed in directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Build a camera, rejecting degenerate placement or lens settings.
    pub fn new(info: &CameraInfo) -> RenderResult<Self> {
        validate(info)?;

        let viewport_height = -2.0 * (info.fov_y * 0.5).tan();
        let viewport_width = -info.aspect_ratio * info.aspect_multiplier * viewport_height;

        let w = (info.position - info.target).normalize();
        let u = info.up.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = info.focus_distance * viewport_width * u;
        let vertical = info.focus_distance * viewport_height * v;
        let lower_left_corner =
            info.position - horizontal * 0.5 - vertical * 0.5 - info.focus_distance * w;

        log::debug!(
            "Camera at {:?} looking at {:?}: viewport {:.3}x{:.3}, lens radius {}",
            info.position,
            info.target,
            viewport_width,
            viewport_height,
            info.aperture * 0.5
        );

        Ok(Self {
            position: info.position,
            u,
            v,
            w,
            lower_left_corner,
            horizontal,
            vertical,
            lens_radius: info.aperture * 0.5,
        })
    }

    /// Generate a ray through normalized image coordinates `(s, t)`.
    ///
    /// `s` runs left to right and `t` top to bottom, both nominally in
    /// [0, 1] but not clamped. The origin is jittered over the lens disk.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        Ray::new(
            self.position + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.position - offset,
        )
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn u(&self) -> Vec3 {
        self.u
    }

    pub fn v(&self) -> Vec3 {
        self.v
    }

    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn lower_left_corner(&self) -> Vec3 {
        self.lower_left_corner
    }

    pub fn horizontal(&self) -> Vec3 {
        self.horizontal
    }

    pub fn vertical(&self) -> Vec3 {
        self.vertical
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

fn validate(info: &CameraInfo) -> RenderResult<()> {
    let invalid = |msg: String| Err(RenderError::InvalidCamera(msg));

    if !(info.position.is_finite() && info.target.is_finite() && info.up.is_finite()) {
        return invalid("position, target and up must be finite".into());
    }

    let view = info.position - info.target;
    if view.length_squared() < f32::EPSILON {
        return invalid(format!("position and target coincide at {:?}", info.position));
    }
    if info.up.normalize_or_zero().cross(view.normalize()).length_squared() < 1e-6 {
        return invalid(format!("up {:?} is parallel to the view direction", info.up));
    }

    if !(info.fov_y > 0.0 && info.fov_y < PI) {
        return invalid(format!("vertical fov {} must be in (0, pi) radians", info.fov_y));
    }
    if !(info.aspect_ratio.is_finite() && info.aspect_ratio > 0.0) {
        return invalid(format!("aspect ratio {} must be positive", info.aspect_ratio));
    }
    if !(info.aspect_multiplier.is_finite() && info.aspect_multiplier > 0.0) {
        return invalid(format!("aspect multiplier {} must be positive", info.aspect_multiplier));
    }
    if !(info.aperture.is_finite() && info.aperture >= 0.0) {
        return invalid(format!("aperture {} must be non-negative", info.aperture));
    }
    if !(info.focus_distance.is_finite() && info.focus_distance > 0.0) {
        return invalid(format!("focus distance {} must be positive", info.focus_distance));
    }

    Ok(())
}
