//! First-person camera placed at the spawn pose.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use manorgen_logic::spawn::SpawnPose;

const MOVE_SPEED: f32 = 4.0;
const TURN_SPEED: f32 = 1.8;

/// Camera look angles, in the building's yaw convention (0 faces +Z).
#[derive(Component, Default)]
pub struct FlyCamera {
    pub yaw: f32,
    pub pitch: f32,
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::default(),
        FlyCamera::default(),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(1.0, 0.95, 0.85),
        brightness: 400.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Bevy cameras look down -Z; a yaw of 0 must look down +Z.
fn look_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_rotation_y(yaw + PI) * Quat::from_rotation_x(pitch)
}

/// Move the camera to `pose`.
pub fn snap_to_spawn(pose: &SpawnPose, transform: &mut Transform, cam: &mut FlyCamera) {
    cam.yaw = pose.yaw;
    cam.pitch = pose.pitch;
    transform.translation = Vec3::new(pose.position.x, pose.position.y, pose.position.z);
    transform.rotation = look_rotation(cam.yaw, cam.pitch);
}

pub fn fly_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera_q: Query<(&mut Transform, &mut FlyCamera)>,
) {
    let Ok((mut tf, mut cam)) = camera_q.get_single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    if keyboard.pressed(KeyCode::ArrowLeft) {
        cam.yaw += TURN_SPEED * dt;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        cam.yaw -= TURN_SPEED * dt;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        cam.pitch = (cam.pitch + TURN_SPEED * dt).min(FRAC_PI_2 - 0.05);
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        cam.pitch = (cam.pitch - TURN_SPEED * dt).max(-FRAC_PI_2 + 0.05);
    }

    // Walk on the XZ plane regardless of pitch.
    let forward = Vec3::new(cam.yaw.sin(), 0.0, cam.yaw.cos());
    let left = Vec3::new(forward.z, 0.0, -forward.x);
    let mut step = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        step += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        step -= forward;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        step += left;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        step -= left;
    }

    tf.translation += step.normalize_or_zero() * MOVE_SPEED * dt;
    tf.rotation = look_rotation(cam.yaw, cam.pitch);
}
