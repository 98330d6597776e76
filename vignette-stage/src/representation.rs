//! Exclusive visual representations of one logical object.
//!
//! The variant set is closed: every object can be shown as its default mesh,
//! a point cloud, a neon shell, a glitch shell or a wireframe. Each registered
//! variant owns a full clone of the geometry plus its own material, and at
//! most one variant is visible at a time.

use crate::offsets::{OffsetHandle, VertexOffsetBuffer};
use crate::StageError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use vignette_data::Model;

/// Available representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// The model as loaded.
    Default,
    /// Vertices rendered as a point cloud.
    Points,
    /// Emissive pulsing shell.
    Neon,
    /// Flat-shaded shell with cycling specular color.
    Glitch,
    /// Slowly spinning wireframe.
    Wireframe,
}

impl Representation {
    pub const COUNT: usize = 5;

    /// Get all representations in registration order.
    pub fn all() -> &'static [Representation] {
        &[
            Representation::Default,
            Representation::Points,
            Representation::Neon,
            Representation::Glitch,
            Representation::Wireframe,
        ]
    }

    /// Local rotation a variant starts with. The point cloud lies flat.
    pub fn base_rotation(self) -> Vec3 {
        match self {
            Representation::Points => Vec3::new(-FRAC_PI_2, 0.0, 0.0),
            _ => Vec3::ZERO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Representation::Default => "default",
            Representation::Points => "points",
            Representation::Neon => "neon",
            Representation::Glitch => "glitch",
            Representation::Wireframe => "wireframe",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Representation {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Representation::all()
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StageError::UnknownVariant(s.to_string()))
    }
}

/// Linear RGB from a `0xRRGGBB` literal.
pub fn hex_color(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// HSL to RGB. Hue wraps into `[0, 1)`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    Vec3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// Material handed to the renderer for a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialDescriptor {
    /// Keep whatever materials the model was loaded with.
    Original,
    Points {
        color: Vec3,
        size: f32,
        size_attenuation: bool,
    },
    Standard {
        color: Vec3,
        emissive: Vec3,
        emissive_intensity: f32,
        metalness: f32,
        roughness: f32,
    },
    Phong {
        color: Vec3,
        specular: Vec3,
        shininess: f32,
        emissive: Vec3,
        double_sided: bool,
        flat_shading: bool,
    },
    Basic {
        color: Vec3,
        wireframe: bool,
        transparent: bool,
        opacity: f32,
    },
}

impl MaterialDescriptor {
    /// The look each representation starts with.
    pub fn for_representation(representation: Representation) -> Self {
        match representation {
            Representation::Default => MaterialDescriptor::Original,
            Representation::Points => MaterialDescriptor::Points {
                color: hex_color(0xff6b6b),
                size: 0.05,
                size_attenuation: true,
            },
            Representation::Neon => MaterialDescriptor::Standard {
                color: hex_color(0xff0000),
                emissive: hex_color(0xff0000),
                emissive_intensity: NEON_BASE_INTENSITY,
                metalness: 0.8,
                roughness: 0.2,
            },
            Representation::Glitch => MaterialDescriptor::Phong {
                color: hex_color(0x0000ff),
                specular: hex_color(0xff00ff),
                shininess: 100.0,
                emissive: hex_color(0x000033),
                double_sided: true,
                flat_shading: true,
            },
            Representation::Wireframe => MaterialDescriptor::Basic {
                color: hex_color(0x00ff00),
                wireframe: true,
                transparent: true,
                opacity: 0.8,
            },
        }
    }
}

const NEON_BASE_INTENSITY: f32 = 0.5;
const NEON_PULSE: f32 = 0.3;
const WIREFRAME_SPIN_RATE: f32 = 0.06;
const GLITCH_HUE_RATE: f32 = 0.1;

/// One mesh of a variant: its baseline handle and the buffer the renderer draws.
#[derive(Debug, Clone)]
pub struct VariantMesh {
    pub handle: OffsetHandle,
    pub working: Vec<Vec3>,
}

impl VariantMesh {
    pub fn new(handle: OffsetHandle, working: Vec<Vec3>) -> Self {
        Self { handle, working }
    }
}

/// A registered representation.
#[derive(Debug, Clone)]
pub struct Variant {
    meshes: Vec<VariantMesh>,
    material: MaterialDescriptor,
    /// Local Euler rotation relative to the object's group.
    rotation: Vec3,
    active: bool,
}

impl Variant {
    fn new(meshes: Vec<VariantMesh>, material: MaterialDescriptor, rotation: Vec3) -> Self {
        Self {
            meshes,
            material,
            rotation,
            active: false,
        }
    }

    pub fn meshes(&self) -> &[VariantMesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [VariantMesh] {
        &mut self.meshes
    }

    pub fn material(&self) -> &MaterialDescriptor {
        &self.material
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Manages the exclusive set of representations for one object.
#[derive(Debug, Default)]
pub struct RepresentationSet {
    variants: [Option<Variant>; Representation::COUNT],
    current: Option<Representation>,
}

impl RepresentationSet {
    /// Create an empty set with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture baselines for every mesh of `model` and register all five
    /// representations as clones of it, showing the default one.
    pub fn from_model(model: &Model, offsets: &mut VertexOffsetBuffer) -> Self {
        let handles: Vec<OffsetHandle> = model
            .meshes
            .iter()
            .map(|mesh| offsets.capture(&mesh.positions))
            .collect();

        let mut set = Self::new();
        for &representation in Representation::all() {
            let meshes = model
                .meshes
                .iter()
                .zip(&handles)
                .map(|(mesh, &handle)| VariantMesh::new(handle, mesh.positions.clone()))
                .collect();
            set.variants[representation as usize] = Some(Variant::new(
                meshes,
                MaterialDescriptor::for_representation(representation),
                representation.base_rotation(),
            ));
        }

        // Every representation was just registered.
        set.show(Representation::Default);
        info!(
            "Registered {} representations over {} meshes",
            Representation::COUNT,
            handles.len()
        );
        set
    }

    /// Register (or replace) a variant. New variants start hidden.
    pub fn add_variant(
        &mut self,
        representation: Representation,
        meshes: Vec<VariantMesh>,
        material: MaterialDescriptor,
    ) {
        let slot = &mut self.variants[representation as usize];
        if slot.is_some() {
            warn!("Replacing already registered representation '{}'", representation);
        }
        let mut variant = Variant::new(meshes, material, representation.base_rotation());
        variant.active = self.current == Some(representation);
        *slot = Some(variant);
    }

    /// Show `representation` and hide every other variant.
    pub fn set_visible(&mut self, representation: Representation) -> Result<(), StageError> {
        if self.variants[representation as usize].is_none() {
            return Err(StageError::UnknownVariant(representation.name().to_string()));
        }
        self.show(representation);
        Ok(())
    }

    /// Name-based switch, for callers holding the hit target as text.
    pub fn set_visible_by_name(&mut self, name: &str) -> Result<(), StageError> {
        let representation: Representation = name.parse()?;
        self.set_visible(representation)
    }

    fn show(&mut self, representation: Representation) {
        for (i, slot) in self.variants.iter_mut().enumerate() {
            if let Some(variant) = slot {
                variant.active = i == representation as usize;
            }
        }
        if self.current != Some(representation) {
            debug!("Representation -> {}", representation);
        }
        self.current = Some(representation);
    }

    /// Swap between `a` and `b`: shows `b` when `a` is active, otherwise `a`.
    pub fn toggle(&mut self, a: Representation, b: Representation) -> Result<(), StageError> {
        let next = if self.current == Some(a) { b } else { a };
        self.set_visible(next)
    }

    /// Get the active representation.
    pub fn current(&self) -> Option<Representation> {
        self.current
    }

    /// Check if a representation is registered.
    pub fn is_registered(&self, representation: Representation) -> bool {
        self.variants[representation as usize].is_some()
    }

    /// Check if a representation is the visible one.
    pub fn is_active(&self, representation: Representation) -> bool {
        self.variants[representation as usize]
            .as_ref()
            .is_some_and(|v| v.active)
    }

    pub fn variant(&self, representation: Representation) -> Option<&Variant> {
        self.variants[representation as usize].as_ref()
    }

    pub fn variant_mut(&mut self, representation: Representation) -> Option<&mut Variant> {
        self.variants[representation as usize].as_mut()
    }

    pub fn active_variant(&self) -> Option<&Variant> {
        self.current.and_then(|r| self.variant(r))
    }

    pub fn active_variant_mut(&mut self) -> Option<&mut Variant> {
        let current = self.current?;
        self.variant_mut(current)
    }

    /// Number of variants currently flagged visible.
    pub fn active_count(&self) -> usize {
        self.variants.iter().flatten().filter(|v| v.active).count()
    }

    /// Drive the active variant's material and transform animation.
    /// Hidden variants are left untouched. `time` is elapsed seconds.
    pub fn animate(&mut self, time: f32, dt: f32) {
        let Some(current) = self.current else {
            return;
        };
        let Some(variant) = self.variants[current as usize].as_mut() else {
            return;
        };

        match current {
            Representation::Neon => {
                if let MaterialDescriptor::Standard {
                    emissive_intensity, ..
                } = &mut variant.material
                {
                    *emissive_intensity = NEON_BASE_INTENSITY + time.sin() * NEON_PULSE;
                }
            }
            Representation::Wireframe => {
                variant.rotation.y += WIREFRAME_SPIN_RATE * dt;
            }
            Representation::Glitch => {
                if let MaterialDescriptor::Phong { specular, .. } = &mut variant.material {
                    *specular = hsl_to_rgb((time * GLITCH_HUE_RATE).sin(), 1.0, 0.5);
                }
            }
            // Point ripple is a geometry pass, see `deform::ripple_delta`.
            Representation::Points | Representation::Default => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_data::MeshGeometry;

    fn model() -> Model {
        Model::new(vec![
            MeshGeometry::new("a", vec![Vec3::ZERO, Vec3::X]),
            MeshGeometry::new("b", vec![Vec3::Y]),
        ])
    }

    #[test]
    fn test_from_model_starts_on_default() {
        let mut offsets = VertexOffsetBuffer::new();
        let set = RepresentationSet::from_model(&model(), &mut offsets);
        assert_eq!(set.current(), Some(Representation::Default));
        assert_eq!(set.active_count(), 1);
        assert_eq!(offsets.len(), 2);
        for &r in Representation::all() {
            assert!(set.is_registered(r));
            assert_eq!(set.variant(r).unwrap().meshes().len(), 2);
        }
    }

    #[test]
    fn test_exactly_one_active_after_every_switch() {
        let mut offsets = VertexOffsetBuffer::new();
        let mut set = RepresentationSet::from_model(&model(), &mut offsets);
        let sequence = [
            Representation::Points,
            Representation::Points,
            Representation::Glitch,
            Representation::Default,
            Representation::Wireframe,
            Representation::Neon,
        ];
        for r in sequence {
            set.set_visible(r).unwrap();
            assert_eq!(set.active_count(), 1);
            assert!(set.is_active(r));
            assert_eq!(set.current(), Some(r));
        }
    }

    #[test]
    fn test_unregistered_variant_leaves_visibility_unchanged() {
        let mut set = RepresentationSet::new();
        let mut offsets = VertexOffsetBuffer::new();
        let handle = offsets.capture(&[Vec3::ZERO]);
        set.add_variant(
            Representation::Default,
            vec![VariantMesh::new(handle, vec![Vec3::ZERO])],
            MaterialDescriptor::Original,
        );
        set.set_visible(Representation::Default).unwrap();

        let err = set.set_visible(Representation::Neon).unwrap_err();
        assert_eq!(err, StageError::UnknownVariant("neon".into()));
        assert_eq!(set.current(), Some(Representation::Default));

        let err = set.set_visible_by_name("hologram").unwrap_err();
        assert_eq!(err, StageError::UnknownVariant("hologram".into()));
        assert_eq!(set.active_count(), 1);
    }

    #[test]
    fn test_added_points_variant_lies_flat() {
        let mut set = RepresentationSet::new();
        let mut offsets = VertexOffsetBuffer::new();
        let handle = offsets.capture(&[Vec3::ZERO]);
        set.add_variant(
            Representation::Points,
            vec![VariantMesh::new(handle, vec![Vec3::ZERO])],
            MaterialDescriptor::for_representation(Representation::Points),
        );
        set.add_variant(
            Representation::Neon,
            vec![VariantMesh::new(handle, vec![Vec3::ZERO])],
            MaterialDescriptor::for_representation(Representation::Neon),
        );

        let from_model = RepresentationSet::from_model(&model(), &mut offsets);
        for r in [Representation::Points, Representation::Neon] {
            assert_eq!(
                set.variant(r).unwrap().rotation(),
                from_model.variant(r).unwrap().rotation()
            );
        }
        assert_eq!(
            set.variant(Representation::Points).unwrap().rotation().x,
            -FRAC_PI_2
        );
    }

    #[test]
    fn test_toggle_swaps_pair() {
        let mut offsets = VertexOffsetBuffer::new();
        let mut set = RepresentationSet::from_model(&model(), &mut offsets);
        set.toggle(Representation::Default, Representation::Points).unwrap();
        assert_eq!(set.current(), Some(Representation::Points));
        set.toggle(Representation::Default, Representation::Points).unwrap();
        assert_eq!(set.current(), Some(Representation::Default));
    }

    #[test]
    fn test_animate_only_touches_active_variant() {
        let mut offsets = VertexOffsetBuffer::new();
        let mut set = RepresentationSet::from_model(&model(), &mut offsets);
        set.set_visible(Representation::Wireframe).unwrap();
        set.animate(1.0, 1.0);
        set.animate(2.0, 1.0);
        let spin = set.variant(Representation::Wireframe).unwrap().rotation().y;
        assert!((spin - 2.0 * WIREFRAME_SPIN_RATE).abs() < 1e-6);

        let neon = set.variant(Representation::Neon).unwrap().material().clone();
        assert_eq!(neon, MaterialDescriptor::for_representation(Representation::Neon));
    }

    #[test]
    fn test_neon_pulse_range() {
        let mut offsets = VertexOffsetBuffer::new();
        let mut set = RepresentationSet::from_model(&model(), &mut offsets);
        set.set_visible(Representation::Neon).unwrap();
        set.animate(std::f32::consts::FRAC_PI_2, 0.016);
        match set.active_variant().unwrap().material() {
            MaterialDescriptor::Standard {
                emissive_intensity, ..
            } => assert!((emissive_intensity - 0.8).abs() < 1e-5),
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Points".parse::<Representation>().unwrap(), Representation::Points);
        assert_eq!("wireframe".parse::<Representation>().unwrap(), Representation::Wireframe);
        assert!("mesh".parse::<Representation>().is_err());
    }

    #[test]
    fn test_hsl_primaries() {
        assert!((hsl_to_rgb(0.0, 1.0, 0.5) - Vec3::X).length() < 1e-5);
        assert!((hsl_to_rgb(1.0 / 3.0, 1.0, 0.5) - Vec3::Y).length() < 1e-5);
        // Negative hue wraps around.
        assert!((hsl_to_rgb(-1.0 / 3.0, 1.0, 0.5) - Vec3::Z).length() < 1e-5);
    }
}
