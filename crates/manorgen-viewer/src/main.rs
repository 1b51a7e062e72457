//! ManorGen Viewer - walk through generated buildings with Bevy
//!
//! Controls:
//!   WASD        move
//!   Arrow keys  look around
//!   R           regenerate the current layout
//!   N           new random layout
//!   M           back to the built-in manor
//!   T           toggle door trigger outlines

mod camera;
mod rendering;

use bevy::prelude::*;
use manorgen_logic::layout::{random_walk, Layout};
use manorgen_scene::{BuildingSession, SceneGraph};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "ManorGen".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Building {
            scene: SceneGraph::new(),
            session: BuildingSession::new(),
        })
        .insert_resource(ViewerConfig::default())
        .insert_resource(MirrorState { dirty: false })
        .add_systems(Startup, (camera::setup_camera, initial_generate))
        .add_systems(
            Update,
            (
                generation_keys,
                rendering::mirror_building,
                camera::fly_camera,
                rendering::draw_triggers,
            )
                .chain(),
        )
        .run();
}

/// Scene graph and the session that owns the building inside it.
#[derive(Resource)]
pub struct Building {
    pub scene: SceneGraph,
    pub session: BuildingSession,
}

#[derive(Resource)]
pub struct ViewerConfig {
    pub layout: Layout,
    pub seed: u64,
    pub random_rooms: usize,
    pub show_triggers: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            layout: Layout::manor(),
            seed: 0,
            random_rooms: 18,
            show_triggers: true,
        }
    }
}

/// Set when the session published a new building that Bevy has not
/// mirrored yet.
#[derive(Resource)]
pub struct MirrorState {
    pub dirty: bool,
}

fn generate(building: &mut Building, layout: &Layout, mirror: &mut MirrorState) {
    let Building { scene, session } = building;
    match session.generate(scene, layout) {
        Ok(report) => {
            info!(
                "Generated '{}': {} rooms, {} doorways, {} diagnostics",
                layout.name,
                report.rooms,
                report.doorways,
                report.diagnostics.len()
            );
            for d in &report.diagnostics {
                warn!("{}", d);
            }
            mirror.dirty = true;
        }
        Err(e) => error!("Could not generate '{}': {}", layout.name, e),
    }
}

fn initial_generate(
    mut building: ResMut<Building>,
    config: Res<ViewerConfig>,
    mut mirror: ResMut<MirrorState>,
) {
    generate(&mut building, &config.layout, &mut mirror);
}

fn generation_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut building: ResMut<Building>,
    mut config: ResMut<ViewerConfig>,
    mut mirror: ResMut<MirrorState>,
) {
    if keyboard.just_pressed(KeyCode::KeyT) {
        config.show_triggers = !config.show_triggers;
    }

    let next = if keyboard.just_pressed(KeyCode::KeyR) {
        Some(config.layout.clone())
    } else if keyboard.just_pressed(KeyCode::KeyN) {
        config.seed += 1;
        Some(random_walk(config.seed, config.random_rooms, 12, 12))
    } else if keyboard.just_pressed(KeyCode::KeyM) {
        Some(Layout::manor())
    } else {
        None
    };

    if let Some(layout) = next {
        generate(&mut building, &layout, &mut mirror);
        config.layout = layout;
    }
}
