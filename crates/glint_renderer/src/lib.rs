//! Glint renderer - CPU path tracing core
//!
//! A Monte Carlo path tracer for scenes of spheres with diffuse, metal and
//! dielectric materials. Rendering is deterministic for a given seed, both
//! on a single thread ([`render`]) and across buckets ([`render_parallel`]).

mod bucket;
mod camera;
mod error;
mod framebuffer;
mod hittable;
mod material;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;

pub use bucket::{generate_buckets, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraInfo};
pub use error::{RenderError, RenderResult};
pub use framebuffer::{color_to_rgba, Framebuffer};
pub use hittable::{Hit, Surface};
pub use material::{Color, Material, ScatterRecord};
pub use renderer::{linear_to_gamma, render, NoProgress, Progress, RenderConfig, MAX_DEPTH};
pub use scene::Scene;
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Interval, Ray, Vec3};
