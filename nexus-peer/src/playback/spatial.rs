//! Spatial placement and entity lookup
//!
//! Resources never hold references to world entities. An attachment stores the
//! target's id plus the last transform it resolved to, and re-resolves through
//! the [`EntityDirectory`] every tick. When the target disappears the cached
//! transform keeps being used.

use cgmath::Zero;
use nexus_common::spatial::{EntityRef, PositionMode, Transform, Vec3};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Lookup of live entity transforms, owned by the host
pub trait EntityDirectory: Send + Sync {
    /// Current world transform of `target`, or None if it does not exist
    fn resolve(&self, target: EntityRef) -> Option<Transform>;

    /// Local listener transform, when known
    fn listener(&self) -> Option<Transform> {
        None
    }
}

#[derive(Debug, Default)]
struct DirectoryInner {
    entities: HashMap<EntityRef, Transform>,
    listener: Option<Transform>,
}

/// In-process directory fed by the transport adapter
#[derive(Debug, Clone, Default)]
pub struct SharedEntityDirectory {
    inner: Arc<RwLock<DirectoryInner>>,
}

impl SharedEntityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, target: EntityRef, transform: Transform) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.entities.insert(target, transform);
    }

    pub fn remove(&self, target: EntityRef) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.entities.remove(&target).is_some()
    }

    pub fn set_listener(&self, transform: Transform) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.listener = Some(transform);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntityDirectory for SharedEntityDirectory {
    fn resolve(&self, target: EntityRef) -> Option<Transform> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).entities.get(&target).copied()
    }

    fn listener(&self) -> Option<Transform> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).listener
    }
}

/// Binding of a resource to a world entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub target: EntityRef,
    /// Offset in the target's local frame
    pub local_offset: Vec3,
    /// Last transform the target resolved to (possibly stale)
    pub cached: Transform,
}

impl Attachment {
    pub fn world_position(&self) -> Vec3 {
        self.cached.transform_point(self.local_offset)
    }
}

/// Where a resource sits in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Free { world: Vec3 },
    Attached(Attachment),
}

impl Placement {
    pub fn free(world: Vec3) -> Self {
        Placement::Free { world }
    }

    pub fn position_mode(&self) -> PositionMode {
        match self {
            Placement::Free { .. } => PositionMode::World,
            Placement::Attached(_) => PositionMode::Local,
        }
    }

    pub fn world_position(&self) -> Vec3 {
        match self {
            Placement::Free { world } => *world,
            Placement::Attached(attachment) => attachment.world_position(),
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Placement::Free { .. } => None,
            Placement::Attached(attachment) => Some(attachment),
        }
    }

    /// Follow `target`, starting at zero offset from `transform`
    pub fn attach(&mut self, target: EntityRef, transform: Transform) {
        *self = Placement::Attached(Attachment {
            target,
            local_offset: Vec3::zero(),
            cached: transform,
        });
    }

    /// Stop following; stay at the last applied world position
    pub fn deattach(&mut self) -> bool {
        match *self {
            Placement::Free { .. } => false,
            Placement::Attached(attachment) => {
                *self = Placement::free(attachment.world_position());
                true
            }
        }
    }

    /// Local offset when attached, world position when free
    pub fn set_position(&mut self, position: Vec3) {
        match self {
            Placement::Free { world } => *world = position,
            Placement::Attached(attachment) => attachment.local_offset = position,
        }
    }

    /// Re-resolve an attachment. Returns true when the cached transform changed.
    pub fn sync(&mut self, directory: &dyn EntityDirectory) -> bool {
        let Placement::Attached(attachment) = self else {
            return false;
        };
        match directory.resolve(attachment.target) {
            Some(transform) if transform != attachment.cached => {
                attachment.cached = transform;
                true
            }
            Some(_) => false,
            None => {
                debug!("Attachment target {} not found, keeping last transform", attachment.target);
                false
            }
        }
    }
}
