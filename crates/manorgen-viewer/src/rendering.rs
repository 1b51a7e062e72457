//! Mirrors the published scene graph into Bevy meshes.
//!
//! The scene graph is the source of truth. Whenever the session publishes a
//! new building, the previous Bevy hierarchy is despawned recursively and
//! rebuilt from the graph's mesh nodes.

use bevy::pbr::NotShadowReceiver;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use manorgen_logic::compiler::PanelKind;
use manorgen_logic::mesh::MeshData;
use manorgen_scene::scene::SceneMesh;

use crate::camera::{snap_to_spawn, FlyCamera};
use crate::{Building, MirrorState, ViewerConfig};

/// Root of the mirrored hierarchy.
#[derive(Component)]
pub struct BuildingRoot;

/// One mirrored panel.
#[derive(Component)]
pub struct PanelMesh {
    pub kind: PanelKind,
}

fn to_bevy_mesh(data: &MeshData) -> Mesh {
    let positions: Vec<[f32; 3]> = data.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = data.normals.iter().map(|n| n.to_array()).collect();
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_indices(Indices::U32(data.indices.clone()))
}

fn panel_material(base_color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color,
        perceptual_roughness: 0.8,
        metallic: 0.0,
        ..default()
    }
}

pub fn mirror_building(
    mut mirror: ResMut<MirrorState>,
    building: Res<Building>,
    mut commands: Commands,
    existing: Query<Entity, With<BuildingRoot>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut camera_q: Query<(&mut Transform, &mut FlyCamera)>,
) {
    if !mirror.dirty {
        return;
    }
    mirror.dirty = false;

    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let floor_mat = materials.add(panel_material(Color::srgb(0.42, 0.30, 0.20)));
    let ceiling_mat = materials.add(panel_material(Color::srgb(0.85, 0.83, 0.78)));
    let wall_mat = materials.add(panel_material(Color::srgb(0.62, 0.58, 0.50)));

    let scene = &building.scene;
    let mut spawned = 0;
    commands
        .spawn((
            Transform::default(),
            Visibility::default(),
            BuildingRoot,
        ))
        .with_children(|parent| {
            for (node, world) in scene.meshes() {
                let Some(panel) = scene.mesh(node) else {
                    continue;
                };
                let SceneMesh { kind, mesh, tags } = &*panel;
                let material = match kind {
                    PanelKind::Floor => floor_mat.clone(),
                    PanelKind::Ceiling => ceiling_mat.clone(),
                    PanelKind::Wall(_) => wall_mat.clone(),
                };
                let t = world.translation;
                let mut child = parent.spawn((
                    Mesh3d(meshes.add(to_bevy_mesh(mesh))),
                    MeshMaterial3d(material),
                    Transform::from_xyz(t.x, t.y, t.z)
                        .with_rotation(Quat::from_rotation_y(world.yaw)),
                    PanelMesh { kind: *kind },
                ));
                if !tags.receives_shadows {
                    child.insert(NotShadowReceiver);
                }
                spawned += 1;
            }
        });
    info!("Mirrored {} panels", spawned);

    if let (Some(pose), Ok((mut tf, mut cam))) =
        (building.session.spawn(), camera_q.get_single_mut())
    {
        snap_to_spawn(&pose, &mut tf, &mut cam);
    }
}

/// Outline every door trigger.
pub fn draw_triggers(building: Res<Building>, config: Res<ViewerConfig>, mut gizmos: Gizmos) {
    if !config.show_triggers {
        return;
    }
    for trigger in building.session.triggers() {
        let p = trigger.position;
        let s = trigger.size;
        gizmos.cuboid(
            Transform::from_xyz(p.x, p.y, p.z)
                .with_rotation(Quat::from_rotation_y(trigger.yaw))
                .with_scale(Vec3::new(s.x, s.y, s.z)),
            Color::srgb(0.2, 0.9, 0.4),
        );
    }
}
