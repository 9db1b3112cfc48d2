//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::error::{RenderError, RenderResult};
use crate::sampling::gen_f32;
use crate::{Camera, Color, Framebuffer, Scene};
use glint_math::Interval;
use rand::RngCore;
use std::time::Instant;

/// Deepest bounce bound accepted by [`RenderConfig::validate`].
pub const MAX_DEPTH: u32 = 64;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Bounce bound; a path scatters at most `max_depth + 1` times
    pub max_depth: u32,
    /// Closest accepted hit distance
    pub t_min: f32,
    /// Farthest accepted hit distance
    pub t_max: f32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Base seed for parallel renders
    pub seed: u64,
    /// Tile edge length for parallel renders
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 32,
            max_depth: 32,
            t_min: 0.001,
            t_max: 1000.0,
            background: Color::new(0.7, 0.9, 1.0),
            seed: 0,
            bucket_size: crate::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Reject settings that would divide by zero or feed NaN into the integrator.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if self.width <= 1 || self.height <= 1 {
            return invalid(format!(
                "resolution {}x{} must be at least 2x2",
                self.width, self.height
            ));
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be positive".into());
        }
        if self.max_depth > MAX_DEPTH {
            return invalid(format!(
                "max depth {} exceeds the limit of {MAX_DEPTH}",
                self.max_depth
            ));
        }
        if !self.t_min.is_finite() || self.t_max.is_nan() || self.ray_interval().is_empty() {
            return invalid(format!(
                "clip range [{}, {}] is empty or not finite",
                self.t_min, self.t_max
            ));
        }
        if !self
            .background
            .to_array()
            .iter()
            .all(|&c| Interval::UNIT.contains(c))
        {
            return invalid(format!(
                "background {:?} must have every channel in [0, 1]",
                self.background
            ));
        }
        if self.bucket_size == 0 {
            return invalid("bucket size must be positive".into());
        }

        Ok(())
    }

    /// The `[t_min, t_max]` clip range.
    pub fn ray_interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }

    /// Width over height of the output raster.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Receives render progress as a percentage in [0, 100].
pub trait Progress: Sync {
    fn report(&self, percent: f32);
}

impl<F: Fn(f32) + Sync> Progress for F {
    fn report(&self, percent: f32) {
        self(percent)
    }
}

/// Discards progress reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _percent: f32) {}
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Render a single pixel with multi-sampling.
///
/// Returns the gamma-corrected average. Expects a validated `config`.
pub(crate) fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    row: u32,
    col: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    debug_assert!(config.validate().is_ok(), "render_pixel needs a validated config");

    let ray_t = config.ray_interval();
    let depth = config.max_depth as i32;
    let last_col = (config.width - 1) as f32;
    let last_row = (config.height - 1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (col as f32 + gen_f32(rng)) / last_col;
        let t = (row as f32 + gen_f32(rng)) / last_row;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += scene.trace(&ray, config.background, ray_t, depth, rng);
    }

    // Average the samples
    let average = pixel_color / config.samples_per_pixel as f32;
    Color::new(
        linear_to_gamma(average.x),
        linear_to_gamma(average.y),
        linear_to_gamma(average.z),
    )
}

/// Render the entire scene to a framebuffer on the calling thread.
///
/// Every sample draws from `rng`, so a seeded generator gives a
/// reproducible image. Progress is reported after each row.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    progress: &dyn Progress,
) -> RenderResult<Framebuffer> {
    config.validate()?;
    log::info!(
        "Rendering {}x{} @ {} spp, depth {} ({} spheres)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        scene.len()
    );

    let start = Instant::now();
    let mut image = Framebuffer::new(config.width, config.height);

    for row in 0..config.height {
        for col in 0..config.width {
            let color = render_pixel(camera, scene, row, col, config, rng);
            image.set_pixel(row, col, color)?;
        }
        progress.report((row + 1) as f32 / config.height as f32 * 100.0);
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraInfo, Material, Sphere};
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    fn gamma(color: Color) -> Color {
        Color::new(
            linear_to_gamma(color.x),
            linear_to_gamma(color.y),
            linear_to_gamma(color.z),
        )
    }

    fn ground_scene() -> Scene {
        Scene::with_spheres([Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::diffuse(Color::splat(0.5)),
        )
        .unwrap()])
    }

    fn horizon_camera(config: &RenderConfig) -> Camera {
        let info = CameraInfo::default()
            .with_position(Vec3::new(0.0, 1.0, 3.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
            .with_aspect(config.aspect_ratio(), 1.0);
        Camera::new(&info).unwrap()
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 16,
            height: 10,
            samples_per_pixel: 1,
            max_depth: 0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_configs_rejected() {
        let base = RenderConfig::default();
        let cases = [
            RenderConfig { width: 1, ..base.clone() },
            RenderConfig { height: 0, ..base.clone() },
            RenderConfig { samples_per_pixel: 0, ..base.clone() },
            RenderConfig { max_depth: MAX_DEPTH + 1, ..base.clone() },
            RenderConfig { t_min: 5.0, t_max: 1.0, ..base.clone() },
            RenderConfig { t_min: f32::NAN, ..base.clone() },
            RenderConfig { background: Color::new(0.0, 1.5, 0.0), ..base.clone() },
            RenderConfig { bucket_size: 0, ..base.clone() },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(RenderError::InvalidConfig(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_infinite_far_clip_is_allowed() {
        let config = RenderConfig {
            t_max: f32::INFINITY,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_scene_pixel_is_gamma_background() {
        let config = RenderConfig {
            samples_per_pixel: 8,
            ..small_config()
        };
        let camera = horizon_camera(&config);
        let mut rng = StdRng::seed_from_u64(3);

        let color = render_pixel(&camera, &Scene::new(), 4, 7, &config, &mut rng);
        assert!((color - gamma(config.background)).length() < 1e-5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "validated config")]
    fn test_pixel_with_unvalidated_config_panics() {
        let config = RenderConfig {
            width: 1,
            ..small_config()
        };
        let camera = horizon_camera(&small_config());

        render_pixel(&camera, &Scene::new(), 0, 0, &config, &mut StdRng::seed_from_u64(0));
    }

    #[test]
    fn test_ground_plane_render() {
        let config = small_config();
        let camera = horizon_camera(&config);
        let scene = ground_scene();
        let mut rng = StdRng::seed_from_u64(21);

        let image = render(&camera, &scene, &config, &mut rng, &NoProgress).unwrap();
        let sky = gamma(config.background);
        let shadowed = gamma(0.5 * config.background);

        // Top row looks above the horizon and misses the ground
        for col in 0..config.width {
            assert_eq!(image.get_pixel(0, col).unwrap(), sky);
        }

        // Bottom row hits the ground and is attenuated (or absorbed)
        for col in 0..config.width {
            let pixel = image.get_pixel(config.height - 1, col).unwrap();
            assert!(pixel == Color::ZERO || (pixel - shadowed).length() < 1e-5);
            assert!(pixel.x < sky.x && pixel.y < sky.y && pixel.z < sky.z);
        }
    }

    #[test]
    fn test_seeded_render_is_reproducible() {
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 8,
            ..small_config()
        };
        let camera = horizon_camera(&config);
        let mut scene = ground_scene();
        scene.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)).unwrap());
        scene.add(Sphere::new(Vec3::new(1.5, 0.5, 0.5), 0.5, Material::metal(Color::splat(0.8), 0.1)).unwrap());

        let first = render(&camera, &scene, &config, &mut StdRng::seed_from_u64(99), &NoProgress).unwrap();
        let second = render(&camera, &scene, &config, &mut StdRng::seed_from_u64(99), &NoProgress).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_rgba8(), second.to_rgba8());
    }

    #[test]
    fn test_progress_reports_each_row() {
        let config = small_config();
        let camera = horizon_camera(&config);
        let reports = Mutex::new(Vec::new());
        let record = |percent: f32| reports.lock().unwrap().push(percent);

        render(&camera, &Scene::new(), &config, &mut StdRng::seed_from_u64(0), &record).unwrap();

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), config.height as usize);
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*reports.last().unwrap(), 100.0);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..small_config()
        };
        let camera = horizon_camera(&small_config());

        let result = render(&camera, &Scene::new(), &config, &mut StdRng::seed_from_u64(0), &NoProgress);
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }
}
