//! Building session: owns the one building alive in a scene.
//!
//! `generate` checks everything that can be checked up front, then tears
//! down the previous building and runs the pipeline
//! (grid → connectivity → geometry → doors → spawn) before publishing the
//! result under a single root node. A failed run removes whatever it
//! created and leaves the session idle.

use manorgen_logic::compiler::{BuildingGeometry, GeometryCompiler, PanelKind, RoomGeometry};
use manorgen_logic::connectivity;
use manorgen_logic::csg::{BoxCarver, Subtract};
use manorgen_logic::diagnostics::Diagnostic;
use manorgen_logic::doors::{self, DoorTrigger};
use manorgen_logic::grid::Grid;
use manorgen_logic::layout::{Layout, LayoutGrid};
use manorgen_logic::spawn::{self, SpawnPose};
use manorgen_logic::validation;

use crate::error::SessionError;
use crate::scene::{LocalTransform, NodeId, SceneBackend, SceneError, SceneMesh};

/// Name of the node every building hangs from.
pub const BUILDING_ROOT: &str = "building";
/// Name of the root's child that holds the door triggers.
pub const DOORS_NODE: &str = "doors";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Building,
    Ready,
}

/// Summary of a successful generate.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub rooms: usize,
    pub doorways: usize,
    pub openings: usize,
    pub triggers: usize,
    pub spawn: SpawnPose,
    /// Skipped cells, fallback walls and validation findings.
    pub diagnostics: Vec<Diagnostic>,
}

pub struct BuildingSession {
    state: SessionState,
    subtractor: Box<dyn Subtract + Send + Sync>,
    root: Option<NodeId>,
    grid: Option<Grid>,
    triggers: Vec<DoorTrigger>,
    spawn: Option<SpawnPose>,
    diagnostics: Vec<Diagnostic>,
}

impl BuildingSession {
    /// A session carving doorways with [`BoxCarver`].
    pub fn new() -> Self {
        Self::with_subtractor(Box::new(BoxCarver))
    }

    pub fn with_subtractor(subtractor: Box<dyn Subtract + Send + Sync>) -> Self {
        Self {
            state: SessionState::Idle,
            subtractor,
            root: None,
            grid: None,
            triggers: Vec::new(),
            spawn: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Root node of the published building.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Resolved grid of the published building.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn triggers(&self) -> &[DoorTrigger] {
        &self.triggers
    }

    pub fn spawn(&self) -> Option<SpawnPose> {
        self.spawn
    }

    pub fn room_count(&self) -> usize {
        self.grid.as_ref().map_or(0, Grid::room_count)
    }

    /// Diagnostics from the last successful generate.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Replace the current building with one built from `layout`.
    pub fn generate(
        &mut self,
        scene: &mut dyn SceneBackend,
        layout: &Layout,
    ) -> Result<BuildReport, SessionError> {
        if self.state == SessionState::Building {
            return Err(SessionError::Busy);
        }
        if !scene.is_ready() {
            return Err(SessionError::MissingContext);
        }
        layout.constants.validate()?;
        layout.validate()?;

        self.teardown(scene)?;
        self.state = SessionState::Building;
        log::info!("Generating building '{}'", layout.name);

        match self.build(scene, layout) {
            Ok(report) => {
                self.state = SessionState::Ready;
                log::info!(
                    "Building '{}' ready: {} rooms, {} doorways, {} diagnostics",
                    layout.name,
                    report.rooms,
                    report.doorways,
                    report.diagnostics.len()
                );
                Ok(report)
            }
            Err(e) => {
                log::warn!("Generating '{}' failed: {}", layout.name, e);
                self.discard(scene);
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Tear down the current building, if any, and return to idle. Also
    /// recovers a session left in `Building` by an interrupted generate.
    pub fn dispose(&mut self, scene: &mut dyn SceneBackend) -> Result<(), SessionError> {
        if !scene.is_ready() {
            return Err(SessionError::MissingContext);
        }
        self.teardown(scene)?;
        self.state = SessionState::Idle;
        Ok(())
    }

    fn build(
        &mut self,
        scene: &mut dyn SceneBackend,
        layout: &Layout,
    ) -> Result<BuildReport, SessionError> {
        let LayoutGrid {
            mut grid,
            mut diagnostics,
        } = layout.build_grid()?;
        let doorways = connectivity::resolve(&mut grid);

        let compiler = GeometryCompiler::new(layout.constants, &*self.subtractor)?;
        let geometry = compiler.compile(&grid);
        let triggers = doors::register(&grid, &layout.constants);
        let spawn = spawn::resolve(&grid, &layout.constants, &layout.start)?;

        diagnostics.extend(geometry.diagnostics.iter().cloned());
        for d in validation::validate_building(&grid, &triggers) {
            d.emit();
            diagnostics.push(d);
        }

        let rooms = geometry.rooms.len();
        let openings = geometry.opening_count();

        let root = scene.create_node(BUILDING_ROOT, None, LocalTransform::IDENTITY)?;
        self.root = Some(root);
        publish_rooms(scene, root, geometry)?;
        publish_triggers(scene, root, &triggers)?;

        let report = BuildReport {
            rooms,
            doorways,
            openings,
            triggers: triggers.len(),
            spawn,
            diagnostics: diagnostics.clone(),
        };
        self.grid = Some(grid);
        self.triggers = triggers;
        self.spawn = Some(spawn);
        self.diagnostics = diagnostics;
        Ok(report)
    }

    fn teardown(&mut self, scene: &mut dyn SceneBackend) -> Result<(), SessionError> {
        if let Some(root) = self.root.take() {
            match scene.destroy_recursive(root) {
                Ok(n) => log::debug!("Disposed previous building ({} nodes)", n),
                Err(SceneError::StaleNode(_)) => {
                    log::warn!("Previous building root {} was already gone", root)
                }
                Err(e) => {
                    self.root = Some(root);
                    return Err(e.into());
                }
            }
        }
        self.clear();
        Ok(())
    }

    /// Best-effort removal of a partial build.
    fn discard(&mut self, scene: &mut dyn SceneBackend) {
        if let Some(root) = self.root.take() {
            if let Err(e) = scene.destroy_recursive(root) {
                log::warn!("Could not remove partial building {}: {}", root, e);
            }
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.grid = None;
        self.triggers.clear();
        self.spawn = None;
        self.diagnostics.clear();
    }
}

impl Default for BuildingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Node name for a panel.
pub fn panel_name(kind: PanelKind) -> String {
    match kind {
        PanelKind::Floor => "floor".to_string(),
        PanelKind::Ceiling => "ceiling".to_string(),
        PanelKind::Wall(dir) => format!("wall_{}", dir),
    }
}

/// Room nodes at their world origins, one child per panel.
fn publish_rooms(
    scene: &mut dyn SceneBackend,
    root: NodeId,
    geometry: BuildingGeometry,
) -> Result<(), SceneError> {
    for room in geometry.rooms {
        let RoomGeometry {
            cell,
            template,
            origin,
            floor,
            ceiling,
            walls,
        } = room;
        let name = format!("{}_{}_{}", template, cell.col, cell.row);
        let node = scene.create_node(&name, Some(root), LocalTransform::from_translation(origin))?;

        for panel in [floor, ceiling].into_iter().chain(walls) {
            let child = scene.create_node(
                &panel_name(panel.kind),
                Some(node),
                LocalTransform::IDENTITY,
            )?;
            scene.attach_mesh(
                child,
                SceneMesh {
                    kind: panel.kind,
                    mesh: panel.mesh,
                    tags: panel.tags,
                },
            )?;
        }
    }
    Ok(())
}

fn publish_triggers(
    scene: &mut dyn SceneBackend,
    root: NodeId,
    triggers: &[DoorTrigger],
) -> Result<(), SceneError> {
    let doors = scene.create_node(DOORS_NODE, Some(root), LocalTransform::IDENTITY)?;
    for t in triggers {
        let node = scene.create_node(
            &t.id(),
            Some(doors),
            LocalTransform {
                translation: t.position,
                yaw: t.yaw,
            },
        )?;
        scene.attach_trigger(node, t.clone())?;
    }
    Ok(())
}
