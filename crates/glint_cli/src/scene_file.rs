//! JSON scene descriptions.
//!
//! Every section is optional; anything left out falls back to the built-in
//! demo scene and default render settings.

use crate::cli::Args;
use anyhow::{Context, Result};
use glint_renderer::{Camera, CameraInfo, Color, Material, RenderConfig, Scene, Sphere, Vec3};
use serde::Deserialize;
use std::path::Path;

/// Top-level scene file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneFile {
    pub render: RenderSection,
    pub camera: CameraSection,
    /// `None` means "use the demo spheres"; an empty list is an empty scene
    pub spheres: Option<Vec<SphereSection>>,
}

/// Render settings; unset fields keep [`RenderConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub samples: Option<u32>,
    pub depth: Option<u32>,
    pub seed: Option<u64>,
    pub bucket_size: Option<u32>,
    pub t_min: Option<f32>,
    pub t_max: Option<f32>,
    pub background: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSection {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aperture: f32,
    pub focus_distance: f32,
    pub aspect_multiplier: f32,
    /// Derived from the output resolution when unset
    pub aspect_ratio: Option<f32>,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            position: [-3.0, 1.0, 3.0],
            target: [0.0, 1.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y_degrees: 65.0,
            aperture: 0.1,
            focus_distance: 2.5,
            aspect_multiplier: 1.0,
            aspect_ratio: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereSection {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: MaterialSection,
}

/// Materials, tagged by `"type"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialSection {
    Diffuse {
        albedo: [f32; 3],
        #[serde(default = "full_roughness")]
        roughness: f32,
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        roughness: f32,
    },
    Dielectric {
        #[serde(default = "white")]
        albedo: [f32; 3],
        #[serde(default)]
        roughness: f32,
        refraction_index: f32,
    },
    /// Older flag-style description, mapped onto the variants above
    Flags {
        albedo: [f32; 3],
        roughness: f32,
        #[serde(default)]
        refraction_index: f32,
        #[serde(default)]
        is_dielectric: bool,
    },
}

fn full_roughness() -> f32 {
    1.0
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl From<&MaterialSection> for Material {
    fn from(section: &MaterialSection) -> Self {
        match *section {
            MaterialSection::Diffuse { albedo, roughness } => {
                Material::diffuse(Color::from_array(albedo)).with_roughness(roughness)
            }
            MaterialSection::Metal { albedo, roughness } => {
                Material::metal(Color::from_array(albedo), roughness)
            }
            MaterialSection::Dielectric {
                albedo,
                roughness,
                refraction_index,
            } => Material::dielectric(refraction_index)
                .with_albedo(Color::from_array(albedo))
                .with_roughness(roughness),
            MaterialSection::Flags {
                albedo,
                roughness,
                refraction_index,
                is_dielectric,
            } => Material::from_flags(
                Color::from_array(albedo),
                roughness,
                refraction_index,
                is_dielectric,
            ),
        }
    }
}

/// Everything a render needs, validated.
#[derive(Debug, Clone)]
pub struct Setup {
    pub camera: Camera,
    pub scene: Scene,
    pub config: RenderConfig,
}

impl SceneFile {
    /// Load a scene file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let scene = Self::from_json(&text)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))?;
        log::debug!("Loaded scene file {}", path.display());
        Ok(scene)
    }

    /// Parse a scene description from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve settings (command line over file over defaults) and build
    /// the camera and scene.
    pub fn into_setup(self, args: &Args) -> Result<Setup> {
        let config = self.render_config(args);
        config.validate().context("Invalid render settings")?;

        let cam = &self.camera;
        let info = CameraInfo {
            position: Vec3::from_array(cam.position),
            target: Vec3::from_array(cam.target),
            up: Vec3::from_array(cam.up),
            aspect_ratio: cam.aspect_ratio.unwrap_or_else(|| config.aspect_ratio()),
            aspect_multiplier: cam.aspect_multiplier,
            fov_y: cam.fov_y_degrees.to_radians(),
            aperture: cam.aperture,
            focus_distance: cam.focus_distance,
        };
        let camera = Camera::new(&info).context("Invalid camera")?;

        let spheres = match &self.spheres {
            Some(spheres) => spheres
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Sphere::new(Vec3::from_array(s.center), s.radius, Material::from(&s.material))
                        .with_context(|| format!("Invalid sphere #{i}"))
                })
                .collect::<Result<Vec<_>>>()?,
            None => demo_spheres()?,
        };

        Ok(Setup {
            camera,
            scene: Scene::with_spheres(spheres),
            config,
        })
    }

    fn render_config(&self, args: &Args) -> RenderConfig {
        let defaults = RenderConfig::default();
        let file = &self.render;

        RenderConfig {
            width: args.width.or(file.width).unwrap_or(defaults.width),
            height: args.height.or(file.height).unwrap_or(defaults.height),
            samples_per_pixel: args.samples.or(file.samples).unwrap_or(defaults.samples_per_pixel),
            max_depth: args.depth.or(file.depth).unwrap_or(defaults.max_depth),
            seed: args.seed.or(file.seed).unwrap_or(defaults.seed),
            bucket_size: args.bucket_size.or(file.bucket_size).unwrap_or(defaults.bucket_size),
            t_min: file.t_min.unwrap_or(defaults.t_min),
            t_max: file.t_max.unwrap_or(defaults.t_max),
            background: file.background.map(Color::from_array).unwrap_or(defaults.background),
        }
    }
}

/// Ground plane plus glass, glossy and matte spheres.
pub fn demo_spheres() -> Result<Vec<Sphere>> {
    let spheres = vec![
        Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::metal(Color::splat(0.5), 0.25),
        )?,
        Sphere::new(
            Vec3::new(-2.1, 1.0, 0.0),
            1.0,
            Material::dielectric(1.5).with_albedo(Color::new(0.5, 0.5, 1.0)),
        )?,
        Sphere::new(
            Vec3::new(0.0, 1.0, 0.5),
            1.0,
            Material::metal(Color::new(1.0, 0.5, 0.5), 0.1),
        )?,
        Sphere::new(
            Vec3::new(2.1, 1.0, 1.5),
            1.0,
            Material::metal(Color::new(0.5, 1.0, 0.5), 0.5),
        )?,
        Sphere::new(
            Vec3::new(0.5, 0.5, 3.0),
            0.5,
            Material::metal(Color::new(1.0, 0.8, 0.6), 0.1),
        )?,
        Sphere::new(
            Vec3::new(-0.75, 0.4, 2.2),
            0.4,
            Material::diffuse(Color::new(0.0, 1.0, 1.0)),
        )?,
        Sphere::new(
            Vec3::new(-1.75, 0.3, 1.6),
            0.3,
            Material::diffuse(Color::new(1.0, 0.0, 1.0)),
        )?,
    ];
    Ok(spheres)
}
