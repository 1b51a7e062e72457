//! Scene graph: a tree of named nodes carrying transforms, meshes and door
//! triggers.
//!
//! [`SceneBackend`] is the seam between the building session and whatever
//! presents the building. [`SceneGraph`] is the built-in implementation,
//! storing every node as an entity in a `hecs::World`. Entity handles are
//! generational, so a handle to a destroyed node stays invalid even after
//! its slot is reused.

use hecs::World;
use std::fmt;
use thiserror::Error;

use manorgen_logic::compiler::{MeshTags, PanelKind};
use manorgen_logic::direction::rotate_yaw;
use manorgen_logic::doors::DoorTrigger;
use manorgen_logic::mesh::{MeshData, Vec3};

/// Handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(hecs::Entity);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0.id())
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene context is not available")]
    Unavailable,
    #[error("{0} no longer exists")]
    StaleNode(NodeId),
    #[error("scene rejected {what}: {reason}")]
    Rejected { what: String, reason: String },
}

// ── Components ──────────────────────────────────────────────────────────

/// Node name.
#[derive(Debug, Clone, PartialEq)]
pub struct Name(pub String);

/// Parent link; absent on roots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parent(pub NodeId);

/// Child links in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children(pub Vec<NodeId>);

/// Transform relative to the parent node. Rotation is yaw about +Y only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub yaw: f32,
}

impl LocalTransform {
    pub const IDENTITY: LocalTransform = LocalTransform {
        translation: Vec3::ZERO,
        yaw: 0.0,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            yaw: 0.0,
        }
    }

    /// `self` applied after `parent`.
    pub fn then(&self, parent: &LocalTransform) -> LocalTransform {
        LocalTransform {
            translation: parent.translation + rotate_yaw(self.translation, parent.yaw),
            yaw: parent.yaw + self.yaw,
        }
    }
}

/// Renderable panel attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    pub kind: PanelKind,
    pub mesh: MeshData,
    pub tags: MeshTags,
}

/// Inert door trigger attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerVolume(pub DoorTrigger);

// ── Backend seam ────────────────────────────────────────────────────────

/// Operations the building session needs from a scene.
pub trait SceneBackend {
    /// False when the scene cannot accept changes right now.
    fn is_ready(&self) -> bool;

    fn create_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        transform: LocalTransform,
    ) -> Result<NodeId, SceneError>;

    fn attach_mesh(&mut self, node: NodeId, mesh: SceneMesh) -> Result<(), SceneError>;

    fn attach_trigger(&mut self, node: NodeId, trigger: DoorTrigger) -> Result<(), SceneError>;

    /// Destroy `node` and all of its descendants; returns how many nodes
    /// were removed.
    fn destroy_recursive(&mut self, node: NodeId) -> Result<usize, SceneError>;

    fn contains(&self, node: NodeId) -> bool;
}

// ── hecs-backed scene ───────────────────────────────────────────────────

/// In-memory scene graph.
pub struct SceneGraph {
    world: World,
    suspended: bool,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            suspended: false,
        }
    }

    /// Stop accepting changes, as a scene does while it is being torn down
    /// or has not finished loading.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> Vec<NodeId> {
        self.world
            .query::<(&Name, Option<&Parent>)>()
            .iter()
            .filter(|(_, (_, parent))| parent.is_none())
            .map(|(e, _)| NodeId(e))
            .collect()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.world
            .get::<&Children>(node.0)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.world.get::<&Parent>(node.0).ok().map(|p| p.0)
    }

    pub fn name(&self, node: NodeId) -> Option<String> {
        self.world.get::<&Name>(node.0).ok().map(|n| n.0.clone())
    }

    /// First direct child called `name`.
    pub fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node)
            .into_iter()
            .find(|c| self.name(*c).as_deref() == Some(name))
    }

    pub fn local_transform(&self, node: NodeId) -> Option<LocalTransform> {
        self.world.get::<&LocalTransform>(node.0).ok().map(|t| *t)
    }

    /// Transform composed from the root down to `node`.
    pub fn world_transform(&self, node: NodeId) -> Option<LocalTransform> {
        let local = self.local_transform(node)?;
        match self.parent(node) {
            Some(p) => Some(local.then(&self.world_transform(p)?)),
            None => Some(local),
        }
    }

    pub fn mesh(&self, node: NodeId) -> Option<hecs::Ref<'_, SceneMesh>> {
        self.world.get::<&SceneMesh>(node.0).ok()
    }

    pub fn trigger(&self, node: NodeId) -> Option<DoorTrigger> {
        self.world
            .get::<&TriggerVolume>(node.0)
            .ok()
            .map(|t| t.0.clone())
    }

    /// Every node carrying a mesh, with its world transform.
    pub fn meshes(&self) -> Vec<(NodeId, LocalTransform)> {
        let ids: Vec<NodeId> = self
            .world
            .query::<&SceneMesh>()
            .iter()
            .map(|(e, _)| NodeId(e))
            .collect();
        ids.into_iter()
            .filter_map(|id| self.world_transform(id).map(|t| (id, t)))
            .collect()
    }

    pub fn count_live_meshes(&self) -> usize {
        self.world.query::<&SceneMesh>().iter().count()
    }

    pub fn count_triggers(&self) -> usize {
        self.world.query::<&TriggerVolume>().iter().count()
    }

    /// `node` and all of its descendants, parents before children.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if !self.world.contains(n.0) {
                continue;
            }
            out.push(n);
            stack.extend(self.children(n).into_iter().rev());
        }
        out
    }

    fn check_ready(&self) -> Result<(), SceneError> {
        if self.suspended {
            Err(SceneError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn check_live(&self, node: NodeId) -> Result<(), SceneError> {
        if self.world.contains(node.0) {
            Ok(())
        } else {
            Err(SceneError::StaleNode(node))
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBackend for SceneGraph {
    fn is_ready(&self) -> bool {
        !self.suspended
    }

    fn create_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        transform: LocalTransform,
    ) -> Result<NodeId, SceneError> {
        self.check_ready()?;
        let entity = match parent {
            Some(p) => {
                self.check_live(p)?;
                self.world
                    .spawn((Name(name.to_string()), transform, Children::default(), Parent(p)))
            }
            None => self
                .world
                .spawn((Name(name.to_string()), transform, Children::default())),
        };
        let id = NodeId(entity);
        if let Some(p) = parent {
            if let Ok(mut children) = self.world.get::<&mut Children>(p.0) {
                children.0.push(id);
            }
        }
        Ok(id)
    }

    fn attach_mesh(&mut self, node: NodeId, mesh: SceneMesh) -> Result<(), SceneError> {
        self.check_ready()?;
        self.world
            .insert_one(node.0, mesh)
            .map_err(|_| SceneError::StaleNode(node))
    }

    fn attach_trigger(&mut self, node: NodeId, trigger: DoorTrigger) -> Result<(), SceneError> {
        self.check_ready()?;
        self.world
            .insert_one(node.0, TriggerVolume(trigger))
            .map_err(|_| SceneError::StaleNode(node))
    }

    fn destroy_recursive(&mut self, node: NodeId) -> Result<usize, SceneError> {
        self.check_ready()?;
        self.check_live(node)?;

        if let Some(p) = self.parent(node) {
            if let Ok(mut siblings) = self.world.get::<&mut Children>(p.0) {
                siblings.0.retain(|c| *c != node);
            }
        }

        let doomed = self.descendants(node);
        for n in &doomed {
            // Every id came from `descendants`, which only yields live nodes.
            let _ = self.world.despawn(n.0);
        }
        Ok(doomed.len())
    }

    fn contains(&self, node: NodeId) -> bool {
        self.world.contains(node.0)
    }
}
