//! Spatial types shared by authority and peers
//!
//! Coordinates follow the host world convention: Y is up, distances in metres.
//! Vector and rotation math come from `cgmath`; this module fixes the wire
//! format and the few entity types the audio peer needs.

use cgmath::{Quaternion, Rotation, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 3-component vector; serializes as `{"x", "y", "z"}`
pub type Vec3 = Vector3<f32>;

/// Unit quaternion rotation; serializes as `{"x", "y", "z", "w"}`
pub type Quat = Quaternion<f32>;

/// Rotation that leaves every vector unchanged
pub fn identity_rotation() -> Quat {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// Wire format for [`Quat`], matching the host engine's component order
pub mod quat_xyzw {
    use super::Quat;
    use cgmath::Quaternion;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xyzw {
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    }

    pub fn serialize<S: Serializer>(q: &Quat, serializer: S) -> Result<S::Ok, S::Error> {
        Xyzw { x: q.v.x, y: q.v.y, z: q.v.z, w: q.s }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quat, D::Error> {
        let q = Xyzw::deserialize(deserializer)?;
        Ok(Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

/// World-space pose of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    #[serde(default = "identity_rotation", with = "quat_xyzw")]
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::new(0.0, 0.0, 0.0))
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position, rotation: identity_rotation() }
    }

    /// Map a point expressed in this transform's local frame to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation.rotate_vector(local)
    }
}

/// Kind of world entity an audio resource can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Vehicle,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Player => write!(f, "player"),
            EntityKind::Vehicle => write!(f, "vehicle"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "player" => Ok(EntityKind::Player),
            "vehicle" => Ok(EntityKind::Vehicle),
            other => Err(crate::Error::InvalidInput(format!("unknown entity kind '{}'", other))),
        }
    }
}

/// Identity of an externally-owned entity (never a reference to it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityRef {
    pub const fn player(id: u64) -> Self {
        Self { kind: EntityKind::Player, id }
    }

    pub const fn vehicle(id: u64) -> Self {
        Self { kind: EntityKind::Vehicle, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Spatialization preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMode {
    /// Volume independent of the listener's position
    NonPositional,
    /// Volume attenuates with distance to the listener
    Positional,
}

impl AudioMode {
    /// Spatial blend value the preset stands for
    pub fn spatial_blend(self) -> f32 {
        match self {
            AudioMode::NonPositional => 0.0,
            AudioMode::Positional => 1.0,
        }
    }
}

/// Distance attenuation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RolloffMode {
    #[default]
    Logarithmic,
    Linear,
    Custom,
}

/// How a resource's position is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    /// Absolute world position
    World,
    /// Offset from an attachment target
    Local,
}
