//! Pose types shared by scene descriptors and the stage.
//!
//! Rotations are Euler angles in radians (XYZ order), matching how the scene
//! descriptor table records them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera placement: world position plus Euler rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    #[serde(with = "xyz")]
    pub position: Vec3,
    #[serde(with = "xyz")]
    pub rotation: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Component-wise interpolation of position and rotation.
    pub fn lerp(&self, target: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(target.position, t),
            rotation: self.rotation.lerp(target.rotation, t),
        }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
        }
    }
}

/// Placement of the showcased object: position, Euler rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPose {
    #[serde(with = "xyz")]
    pub position: Vec3,
    #[serde(with = "xyz")]
    pub rotation: Vec3,
    #[serde(with = "xyz", default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl ObjectPose {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Position, rotation and scale each interpolate independently.
    pub fn lerp(&self, target: &ObjectPose, t: f32) -> ObjectPose {
        ObjectPose {
            position: self.position.lerp(target.position, t),
            rotation: self.rotation.lerp(target.rotation, t),
            scale: self.scale.lerp(target.scale, t),
        }
    }
}

impl Default for ObjectPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Serde adapter for `{ "x": .., "y": .., "z": .. }` records.
pub(crate) mod xyz {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xyz {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    }

    pub fn serialize<S>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Xyz {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec3, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Xyz { x, y, z } = Xyz::deserialize(deserializer)?;
        Ok(Vec3::new(x, y, z))
    }
}
