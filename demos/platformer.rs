//! Platformer Example
//!
//! A playable level for the charge jump controller:
//! - A floor with walls on both sides
//! - Stepped platforms to jump between
//! - An ice platform where walking is impossible
//! - A piston that lunges at the player
//! - Drifting clouds and a swinging weight on a tether
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Walk, or lean the jump while charging
//! - **Space** (hold, release): Charge and launch a jump
//! - **Tab**: Toggle the settings panel
//!
//! Tuning is read from `assets/controller.toml` at startup.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use bevy_rapier2d::prelude::*;
use charge_jump_controller::prelude::*;

// ==================== Constants ====================

const CONFIG_PATH: &str = "assets/controller.toml";

const PLAYER_HALF_SIZE: f32 = 0.5;
const LEVEL_HALF_WIDTH: f32 = 20.0;
const WALL_HEIGHT: f32 = 24.0;

const CAMERA_SCALE: f32 = 1.0 / 32.0;

/// Marker component for the player entity.
#[derive(Component)]
struct Player;

/// Whether the settings panel is shown.
#[derive(Resource)]
struct PanelState {
    visible: bool,
}

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer - Charge Jump Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(RapierDebugRenderPlugin::default())
        // Character controller
        .add_plugins(ChargeJumpPlugin::<Rapier2dBackend>::default())
        .add_plugins(ChargeJumpDebugPlugin)
        // Egui for settings UI
        .add_plugins(EguiPlugin::default())
        .insert_resource(PanelState { visible: true })
        .add_systems(Startup, setup)
        .add_systems(Update, (camera_follow, snap_camera_on_teleport))
        .add_systems(EguiPrimaryContextPass, settings_panel_ui)
        .run();
}

/// Load the player tuning, falling back to the built-in player preset.
fn load_config() -> ControllerConfig {
    let source = match std::fs::read_to_string(CONFIG_PATH) {
        Ok(source) => source,
        Err(err) => {
            warn!("Could not read {CONFIG_PATH}: {err}; using defaults");
            return ControllerConfig::player();
        }
    };

    match ControllerConfig::from_toml_str(&source) {
        Ok(config) => {
            info!("Loaded controller config from {CONFIG_PATH}");
            config
        }
        Err(err) => {
            warn!("{err}; using defaults");
            ControllerConfig::player()
        }
    }
}

// ==================== Setup ====================

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 4.0, 0.0),
    ));

    spawn_level(&mut commands);
    let player = spawn_player(&mut commands, Vec2::new(-15.0, 1.0));

    // Piston guarding the upper right platform
    commands.spawn((
        Sprite::from_color(Color::srgb(0.7, 0.3, 0.2), Vec2::new(2.0, 1.0)),
        Transform::from_xyz(17.0, 1.0, 0.0),
        RigidBody::KinematicPositionBased,
        Collider::cuboid(1.0, 0.5),
        Piston::new(player, PistonDirection::Left)
            .with_trigger_distance(6.0)
            .with_maximum_distance(8.0),
    ));

    // Scenery
    let cloud = Sprite::from_color(Color::srgba(1.0, 1.0, 1.0, 0.8), Vec2::new(3.0, 1.2));
    let small_cloud = Sprite::from_color(Color::srgba(1.0, 1.0, 1.0, 0.6), Vec2::new(1.8, 0.8));
    commands.spawn(CloudSpawner::new(
        vec![cloud, small_cloud],
        Rect::new(-LEVEL_HALF_WIDTH, 0.0, LEVEL_HALF_WIDTH, WALL_HEIGHT),
        42,
    ));
    commands.spawn((
        Sprite::from_color(Color::srgb(0.2, 0.2, 0.2), Vec2::splat(0.8)),
        Transform::from_xyz(-4.0, 14.0, 0.0),
        ArcMover::new(-4.0, 4.0, Vec2::new(0.0, 20.0)).with_height(14.0, 8.0),
    ));

    commands.spawn((
        Text::new("A/D: Walk | Hold Space: Charge | Release: Jump | A/D while charging: Lean"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        Pickable::IGNORE,
    ));
}

fn spawn_level(commands: &mut Commands) {
    let stone = Color::srgb(0.3, 0.3, 0.3);

    // Floor
    spawn_block(commands, Vec2::new(0.0, -0.5), Vec2::new(LEVEL_HALF_WIDTH, 0.5), stone);

    // Walls
    spawn_block(
        commands,
        Vec2::new(-LEVEL_HALF_WIDTH - 0.5, WALL_HEIGHT / 2.0),
        Vec2::new(0.5, WALL_HEIGHT / 2.0),
        stone,
    );
    spawn_block(
        commands,
        Vec2::new(LEVEL_HALF_WIDTH + 0.5, WALL_HEIGHT / 2.0),
        Vec2::new(0.5, WALL_HEIGHT / 2.0),
        stone,
    );

    // Stepped platforms
    let grass = Color::srgb(0.4, 0.5, 0.3);
    for (i, x) in [-8.0, -2.0, 4.0].into_iter().enumerate() {
        let y = 3.0 + 3.0 * i as f32;
        spawn_block(commands, Vec2::new(x, y), Vec2::new(2.0, 0.25), grass);
    }

    // Ice
    let ice = spawn_block(
        commands,
        Vec2::new(12.0, 5.0),
        Vec2::new(3.0, 0.25),
        Color::srgb(0.6, 0.85, 0.95),
    );
    commands.entity(ice).insert(SurfaceKind::Slippery);
}

fn spawn_block(commands: &mut Commands, position: Vec2, half_size: Vec2, color: Color) -> Entity {
    commands
        .spawn((
            Sprite::from_color(color, half_size * 2.0),
            Transform::from_translation(position.extend(0.0)),
            RigidBody::Fixed,
            Collider::cuboid(half_size.x, half_size.y),
        ))
        .id()
}

fn spawn_player(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Player,
            Sprite::from_color(Color::srgb(0.2, 0.6, 0.9), Vec2::splat(PLAYER_HALF_SIZE * 2.0)),
            Transform::from_translation(position.extend(1.0)),
        ))
        .insert((
            ChargeJumpController,
            load_config(),
            KeyboardControlled,
        ))
        .insert((
            Rapier2dActorBundle::rotation_locked(),
            Collider::cuboid(PLAYER_HALF_SIZE, PLAYER_HALF_SIZE),
            Friction::coefficient(0.0),
        ))
        .id()
}

// ==================== Camera ====================

/// Smoothly follows the player with the camera.
fn camera_follow(
    player_query: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(player_transform) = player_query.single() else {
        return;
    };

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let target = player_transform.translation.xy();
    let current = camera_transform.translation.xy();
    let smoothed = current.lerp(target, 0.1);
    camera_transform.translation.x = smoothed.x;
    camera_transform.translation.y = smoothed.y;
}

/// Jump the camera along with stuck-recovery teleports.
fn snap_camera_on_teleport(
    mut overrides: EventReader<PositionOverridden>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Some(event) = overrides.read().last() else {
        return;
    };
    if let Ok(mut camera_transform) = camera_query.single_mut() {
        camera_transform.translation.x = event.to.x;
        camera_transform.translation.y = event.to.y;
    }
}

// ==================== UI ====================

fn settings_panel_ui(
    mut contexts: EguiContexts,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut panel: ResMut<PanelState>,
    mut q_player: Query<
        (
            &mut ControllerConfig,
            &JumpCharge,
            &GroundSensor,
            &SurfaceContact,
            &StuckTracker,
            &Velocity,
        ),
        With<Player>,
    >,
    mut choices: EventWriter<ChoiceMade>,
    log: Res<ChoiceLog>,
) {
    if keyboard.just_pressed(KeyCode::Tab) {
        panel.visible = !panel.visible;
    }
    if !panel.visible {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let Ok((mut config, charge, sensor, surface, tracker, velocity)) = q_player.single_mut() else {
        return;
    };

    egui::Window::new("Controller Settings")
        .default_pos([10.0, 60.0])
        .default_width(300.0)
        .collapsible(true)
        .resizable(true)
        .show(ctx, |ui| {
            ui.collapsing("Movement", |ui| {
                drag(ui, "Move Speed:", &mut config.move_speed, 0.1, 0.0..=50.0);
            });

            ui.collapsing("Jump", |ui| {
                drag(ui, "Min Force:", &mut config.min_jump_force, 0.1, 0.0..=100.0);
                drag(ui, "Max Force:", &mut config.max_jump_force, 0.1, 0.0..=100.0);
                drag(ui, "Charge Rate:", &mut config.charge_rate, 0.1, 0.0..=100.0);
                drag(
                    ui,
                    "Horizontal Fraction:",
                    &mut config.horizontal_force_fraction,
                    0.01,
                    0.0..=2.0,
                );
                drag(ui, "Cooldown:", &mut config.jump_cooldown, 0.01, 0.0..=5.0);
                if config.min_jump_force > config.max_jump_force {
                    config.max_jump_force = config.min_jump_force;
                }
            });

            ui.collapsing("Stuck Recovery", |ui| {
                drag(ui, "Min Motion:", &mut config.min_motion, 0.001, 0.0..=1.0);
                drag(ui, "Threshold:", &mut config.stuck_threshold, 0.1, 0.1..=30.0);
            });

            ui.separator();
            ui.heading("Diagnostics");
            ui.label(format!("Grounded: {}", sensor.is_grounded()));
            ui.label(format!("Slippery: {}", surface.on_slippery_surface));
            ui.label(format!("Charge: {:?}", charge.state()));
            if let Some(force) = charge.force(&config) {
                ui.label(format!("Force: {force:.2}"));
            }
            ui.label(format!(
                "Velocity: ({:.2}, {:.2})",
                velocity.linvel.x, velocity.linvel.y
            ));
            ui.label(format!("Stuck for: {:.2}s", tracker.elapsed));

            ui.separator();
            ui.heading("Choices");
            ui.horizontal(|ui| {
                for choice in 0..3 {
                    if ui.button(format!("Choice {choice}")).clicked() {
                        choices.write(ChoiceMade { choice });
                    }
                }
            });
            ui.label(format!("Log: {:?}", log.choices()));
        });
}

fn drag(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f32,
    speed: f64,
    range: std::ops::RangeInclusive<f32>,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(value).speed(speed).range(range));
    });
}
