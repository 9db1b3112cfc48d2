//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket owns its pixels and its own
//! seeded generator, so the result does not depend on thread scheduling.

use crate::error::RenderResult;
use crate::renderer::{render_pixel, Progress};
use crate::{Camera, Color, Framebuffer, RenderConfig, Scene};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Generator for this bucket, derived from the render seed and the
    /// bucket's position (not its index, which depends on sort order).
    pub fn rng(&self, seed: u64) -> StdRng {
        let position = (u64::from(self.y) << 32) | u64::from(self.x);
        StdRng::seed_from_u64(seed ^ position.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are rendered from the center outward so the most important
/// part of the frame finishes first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    buckets.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket. Expects a
/// validated `config`.
pub(crate) fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    debug_assert!(config.validate().is_ok(), "render_bucket needs a validated config");

    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let row = bucket.y + local_y;
            let col = bucket.x + local_x;
            pixels.push(render_pixel(camera, scene, row, col, config, rng));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

/// Render the scene across all cores.
///
/// Buckets tile the image without overlap, so each pixel is written once.
/// Output is a pure function of the inputs and `config.seed`. Progress
/// counts finished pixels and may arrive out of order.
pub fn render_parallel(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    progress: &dyn Progress,
) -> RenderResult<Framebuffer> {
    config.validate()?;

    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    log::info!(
        "Rendering {}x{} @ {} spp, depth {} ({} spheres, {} buckets on {} threads)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        scene.len(),
        buckets.len(),
        rayon::current_num_threads()
    );

    let start = Instant::now();
    let total = config.width as usize * config.height as usize;
    let finished = AtomicUsize::new(0);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = bucket.rng(config.seed);
            let pixels = render_bucket(bucket, camera, scene, config, &mut rng);

            let done = finished.fetch_add(pixels.len(), Ordering::Relaxed) + pixels.len();
            progress.report(done as f32 / total as f32 * 100.0);
            log::trace!("Bucket {} at ({}, {}) done", bucket.index, bucket.x, bucket.y);

            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = Framebuffer::new(config.width, config.height);
    for result in &results {
        image.write_block(result.bucket.y, result.bucket.x, result.bucket.width, &result.pixels)?;
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NoProgress;
    use crate::{CameraInfo, Material, Sphere};
    use glint_math::Vec3;
    use std::sync::Mutex;

    fn test_scene() -> (Camera, Scene) {
        let info = CameraInfo::default()
            .with_position(Vec3::new(-3.0, 1.0, 3.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
            .with_lens(65.0_f32.to_radians(), 0.1, 2.5);
        let scene = Scene::with_spheres([
            Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, Material::metal(Color::splat(0.5), 0.25)).unwrap(),
            Sphere::new(Vec3::new(-2.1, 1.0, 0.0), 1.0, Material::dielectric(1.5)).unwrap(),
            Sphere::new(Vec3::new(0.0, 1.0, 0.5), 1.0, Material::diffuse(Color::new(1.0, 0.5, 0.5))).unwrap(),
        ]);
        (Camera::new(&info).unwrap(), scene)
    }

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_buckets_cover_each_pixel_once() {
        let (width, height) = (37, 23);
        let mut coverage = vec![0u32; (width * height) as usize];

        for bucket in generate_buckets(width, height, 8) {
            for y in bucket.y..bucket.y + bucket.height {
                for x in bucket.x..bucket.x + bucket.width {
                    coverage[(y * width + x) as usize] += 1;
                }
            }
        }

        assert!(coverage.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert_eq!(first.index, 0);
    }

    #[test]
    fn test_bucket_rng_depends_on_position() {
        let a = Bucket::new(0, 0, 8, 8, 0);
        let b = Bucket::new(8, 0, 8, 8, 0);

        assert_eq!(a.rng(1).next_u64(), a.rng(1).next_u64());
        assert_ne!(a.rng(1).next_u64(), b.rng(1).next_u64());
        assert_ne!(a.rng(1).next_u64(), a.rng(2).next_u64());
    }

    #[test]
    fn test_parallel_render_is_reproducible() {
        let (camera, scene) = test_scene();
        let config = RenderConfig {
            width: 40,
            height: 24,
            samples_per_pixel: 4,
            max_depth: 6,
            bucket_size: 8,
            seed: 1234,
            ..RenderConfig::default()
        };

        let first = render_parallel(&camera, &scene, &config, &NoProgress).unwrap();
        let second = render_parallel(&camera, &scene, &config, &NoProgress).unwrap();

        assert_eq!(first, second);
        assert!(first.pixels().iter().any(|&p| p != Color::ZERO));
    }

    #[test]
    fn test_parallel_matches_bucket_render() {
        let (camera, scene) = test_scene();
        let config = RenderConfig {
            width: 20,
            height: 12,
            samples_per_pixel: 2,
            max_depth: 4,
            bucket_size: 8,
            seed: 7,
            ..RenderConfig::default()
        };

        let image = render_parallel(&camera, &scene, &config, &NoProgress).unwrap();

        for bucket in generate_buckets(config.width, config.height, config.bucket_size) {
            let pixels = render_bucket(&bucket, &camera, &scene, &config, &mut bucket.rng(config.seed));
            let first = image.get_pixel(bucket.y, bucket.x).unwrap();
            assert_eq!(first, pixels[0]);
            let last = image
                .get_pixel(bucket.y + bucket.height - 1, bucket.x + bucket.width - 1)
                .unwrap();
            assert_eq!(last, pixels[pixels.len() - 1]);
        }
    }

    #[test]
    fn test_parallel_progress_reaches_completion() {
        let (camera, scene) = test_scene();
        let config = RenderConfig {
            width: 16,
            height: 16,
            samples_per_pixel: 1,
            max_depth: 2,
            bucket_size: 4,
            ..RenderConfig::default()
        };
        let reports = Mutex::new(Vec::new());
        let record = |percent: f32| reports.lock().unwrap().push(percent);

        render_parallel(&camera, &scene, &config, &record).unwrap();

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 16);
        let max = reports.iter().cloned().fold(0.0, f32::max);
        assert_eq!(max, 100.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "validated config")]
    fn test_bucket_with_unvalidated_config_panics() {
        let (camera, scene) = test_scene();
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        let bucket = Bucket::new(0, 0, 1, 1, 0);

        render_bucket(&bucket, &camera, &scene, &config, &mut bucket.rng(0));
    }

    #[test]
    fn test_parallel_rejects_invalid_config() {
        let (camera, scene) = test_scene();
        let config = RenderConfig {
            width: 1,
            ..RenderConfig::default()
        };

        assert!(render_parallel(&camera, &scene, &config, &NoProgress).is_err());
    }
}
