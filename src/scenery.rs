//! Background scenery: drifting clouds and arc movers.
//!
//! A [`CloudSpawner`] drops a random number of clouds just outside the left
//! or right edge of its view every interval. Each [`Cloud`] drifts across at
//! its own speed and despawns once it has left the view on the far side.
//!
//! An [`ArcMover`] swings back and forth between two x coordinates along a
//! parabolic dip, tethered to a fixed anchor point.

use std::time::Duration;

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Share of the view width clouds spawn and despawn beyond the edges.
const EDGE_MARGIN: f32 = 0.1;

/// Periodically spawns clouds around a view rectangle.
#[derive(Component, Debug, Clone)]
pub struct CloudSpawner {
    /// Sprites to pick from for each cloud.
    pub prefabs: Vec<Sprite>,
    /// World rectangle the clouds cross.
    pub view: Rect,
    pub timer: Timer,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Clouds per interval, inclusive on both ends.
    pub min_clouds: usize,
    pub max_clouds: usize,
    rng: StdRng,
}

/// A cloud to be spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudLaunch {
    pub position: Vec2,
    pub cloud: Cloud,
    /// Index into [`CloudSpawner::prefabs`].
    pub prefab: usize,
}

impl CloudSpawner {
    /// Create a spawner with default tuning and a seeded generator.
    pub fn new(prefabs: Vec<Sprite>, view: Rect, seed: u64) -> Self {
        Self {
            prefabs,
            view,
            timer: Timer::from_seconds(6.0, TimerMode::Repeating),
            min_speed: 1.0,
            max_speed: 3.0,
            min_clouds: 1,
            max_clouds: 3,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Builder: set the spawn interval.
    pub fn with_interval(mut self, seconds: f32) -> Self {
        self.timer = Timer::from_seconds(seconds, TimerMode::Repeating);
        self
    }

    /// Builder: set the speed range.
    pub fn with_speeds(mut self, min: f32, max: f32) -> Self {
        self.min_speed = min;
        self.max_speed = max;
        self
    }

    /// Builder: set how many clouds each interval spawns.
    pub fn with_cloud_count(mut self, min: usize, max: usize) -> Self {
        self.min_clouds = min;
        self.max_clouds = max;
        self
    }

    /// Horizontal distance beyond the view edges where clouds live.
    pub fn margin(&self) -> f32 {
        self.view.width() * EDGE_MARGIN
    }

    /// Advance the timer. Returns how many clouds to spawn this tick.
    pub fn tick(&mut self, delta: Duration) -> usize {
        self.timer.tick(delta);
        let intervals = self.timer.times_finished_this_tick() as usize;
        (0..intervals).map(|_| self.roll_count()).sum()
    }

    fn roll_count(&mut self) -> usize {
        let (lo, hi) = ordered(self.min_clouds, self.max_clouds);
        self.rng.random_range(lo..=hi)
    }

    /// Roll the side, height, speed and sprite of one cloud.
    ///
    /// Clouds start in the upper part of the view: from a quarter of its
    /// half height above the center up to the top edge.
    pub fn roll_cloud(&mut self) -> CloudLaunch {
        let margin = self.margin();
        let from_left = self.rng.random_bool(0.5);
        let x = if from_left {
            self.view.min.x - margin
        } else {
            self.view.max.x + margin
        };

        let low = self.view.center().y + self.view.half_size().y / 4.0;
        let y = self.rng.random_range(low..=self.view.max.y.max(low));

        let (slow, fast) = ordered(self.min_speed, self.max_speed);
        let speed = self.rng.random_range(slow..=fast);

        let exit_x = if from_left {
            self.view.max.x + margin
        } else {
            self.view.min.x - margin
        };
        let prefab = match self.prefabs.len() {
            0 => 0,
            n => self.rng.random_range(0..n),
        };

        CloudLaunch {
            position: Vec2::new(x, y),
            cloud: Cloud {
                speed,
                moving_right: from_left,
                exit_x,
            },
            prefab,
        }
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A cloud drifting horizontally across the view.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct Cloud {
    pub speed: f32,
    pub moving_right: bool,
    /// Past this x the cloud is gone.
    pub exit_x: f32,
}

impl Cloud {
    /// New x after drifting for `dt`.
    #[inline]
    pub fn step(&self, x: f32, dt: f32) -> f32 {
        let sign = if self.moving_right { 1.0 } else { -1.0 };
        x + sign * self.speed * dt
    }

    /// Check if a cloud at `x` has left the view.
    pub fn has_exited(&self, x: f32) -> bool {
        if self.moving_right {
            x > self.exit_x
        } else {
            x < self.exit_x
        }
    }
}

/// Spawn clouds from every spawner whose interval elapsed.
pub fn spawn_clouds(
    time: Res<Time>,
    mut commands: Commands,
    mut q_spawners: Query<(Entity, &mut CloudSpawner)>,
) {
    for (entity, mut spawner) in &mut q_spawners {
        let count = spawner.tick(time.delta());
        if count == 0 {
            continue;
        }
        if spawner.prefabs.is_empty() {
            warn!("Cloud spawner {entity} has no sprites to spawn");
            continue;
        }

        for _ in 0..count {
            let launch = spawner.roll_cloud();
            commands.spawn((
                spawner.prefabs[launch.prefab].clone(),
                Transform::from_translation(launch.position.extend(-1.0)),
                launch.cloud,
            ));
        }
    }
}

/// Drift clouds and despawn the ones that left the view.
pub fn drift_clouds(
    time: Res<Time>,
    mut commands: Commands,
    mut q_clouds: Query<(Entity, &Cloud, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, cloud, mut transform) in &mut q_clouds {
        transform.translation.x = cloud.step(transform.translation.x, dt);
        if cloud.has_exited(transform.translation.x) {
            commands.entity(entity).despawn();
        }
    }
}

/// Swings between `start_x` and `end_x` along a dip of depth `height / 4`,
/// tethered to `anchor`.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct ArcMover {
    pub start_x: f32,
    pub end_x: f32,
    /// Height at both ends of the swing.
    pub base_y: f32,
    pub height: f32,
    /// Horizontal travel per second.
    pub speed: f32,
    /// Fixed end of the tether.
    pub anchor: Vec2,
    pub moving_right: bool,
    /// Seconds into the current pass.
    pub elapsed: f32,
}

impl ArcMover {
    pub fn new(start_x: f32, end_x: f32, anchor: Vec2) -> Self {
        Self {
            start_x,
            end_x,
            base_y: 0.0,
            height: 8.0,
            speed: 3.0,
            anchor,
            moving_right: true,
            elapsed: 0.0,
        }
    }

    /// Builder: set the base height and dip scale.
    pub fn with_height(mut self, base_y: f32, height: f32) -> Self {
        self.base_y = base_y;
        self.height = height;
        self
    }

    /// Builder: set the horizontal speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Point on the arc above or below `x`.
    pub fn arc_point(&self, x: f32) -> Vec2 {
        let span = self.end_x - self.start_x;
        let t = if span.abs() <= f32::EPSILON {
            0.0
        } else {
            (x - self.start_x) / span
        };
        Vec2::new(x, self.base_y - self.height * t * (1.0 - t))
    }

    /// Advance one tick. Returns the new position.
    ///
    /// At the end of a pass the direction flips and the next pass starts.
    pub fn step(&mut self, dt: f32) -> Vec2 {
        self.elapsed += dt.max(0.0);

        let journey = (self.end_x - self.start_x).abs();
        let fraction = if journey <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed * self.speed / journey).clamp(0.0, 1.0)
        };

        let (from, to) = if self.moving_right {
            (self.start_x, self.end_x)
        } else {
            (self.end_x, self.start_x)
        };
        let point = self.arc_point(from + (to - from) * fraction);

        if fraction >= 1.0 {
            self.moving_right = !self.moving_right;
            self.elapsed = 0.0;
        }
        point
    }
}

/// Move every arc mover along its arc.
pub fn swing_arc_movers(time: Res<Time>, mut q_movers: Query<(&mut ArcMover, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut mover, mut transform) in &mut q_movers {
        let point = mover.step(dt);
        transform.translation.x = point.x;
        transform.translation.y = point.y;
    }
}

/// Draw the tether from each arc mover's anchor to its center.
pub fn draw_arc_tethers(mut gizmos: Gizmos, q_movers: Query<(&ArcMover, &GlobalTransform)>) {
    for (mover, transform) in &q_movers {
        gizmos.line_2d(mover.anchor, transform.translation().truncate(), Color::BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Rect {
        Rect::new(-10.0, -5.0, 10.0, 5.0)
    }

    fn spawner() -> CloudSpawner {
        CloudSpawner::new(vec![Sprite::default(), Sprite::default()], view(), 7)
            .with_interval(1.0)
            .with_speeds(1.0, 3.0)
            .with_cloud_count(1, 3)
    }

    // ==================== Cloud Tests ====================

    #[test]
    fn spawns_only_when_interval_elapses() {
        let mut spawner = spawner();

        assert_eq!(spawner.tick(Duration::from_secs_f32(0.5)), 0);
        let count = spawner.tick(Duration::from_secs_f32(0.6));
        assert!((1..=3).contains(&count), "count = {count}");
        assert_eq!(spawner.tick(Duration::from_secs_f32(0.1)), 0);
    }

    #[test]
    fn fixed_count_range() {
        let mut spawner = spawner().with_cloud_count(2, 2);
        assert_eq!(spawner.tick(Duration::from_secs(1)), 2);
    }

    #[test]
    fn clouds_start_off_screen_in_upper_band() {
        let mut spawner = spawner();

        for _ in 0..50 {
            let launch = spawner.roll_cloud();
            let CloudLaunch {
                position, cloud, ..
            } = launch;

            // Margin is 10% of the 20 wide view
            if cloud.moving_right {
                assert_eq!(position.x, -12.0);
                assert_eq!(cloud.exit_x, 12.0);
            } else {
                assert_eq!(position.x, 12.0);
                assert_eq!(cloud.exit_x, -12.0);
            }
            assert!((1.25..=5.0).contains(&position.y), "y = {}", position.y);
            assert!((1.0..=3.0).contains(&cloud.speed));
            assert!(launch.prefab < 2);
        }
    }

    #[test]
    fn same_seed_same_clouds() {
        let mut a = spawner();
        let mut b = spawner();
        for _ in 0..5 {
            assert_eq!(a.roll_cloud(), b.roll_cloud());
        }
    }

    #[test]
    fn cloud_drifts_and_exits() {
        let cloud = Cloud {
            speed: 2.0,
            moving_right: false,
            exit_x: -12.0,
        };

        assert_eq!(cloud.step(0.0, 0.5), -1.0);
        assert!(!cloud.has_exited(-11.9));
        assert!(cloud.has_exited(-12.1));
    }

    // ==================== Arc Mover Tests ====================

    #[test]
    fn arc_dips_between_ends() {
        let mover = ArcMover::new(-5.0, 5.0, Vec2::new(0.0, 10.0)).with_height(2.0, 8.0);

        assert_eq!(mover.arc_point(-5.0), Vec2::new(-5.0, 2.0));
        assert_eq!(mover.arc_point(5.0), Vec2::new(5.0, 2.0));
        // Deepest in the middle: 8 * 0.5 * 0.5 below the base
        assert_eq!(mover.arc_point(0.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn swings_and_reverses() {
        let mut mover = ArcMover::new(0.0, 6.0, Vec2::ZERO).with_speed(3.0);

        let point = mover.step(1.0);
        assert!((point.x - 3.0).abs() < 1e-5);
        assert!(mover.moving_right);

        // Pass complete: clamp to the end and turn around
        let point = mover.step(1.5);
        assert!((point.x - 6.0).abs() < 1e-5);
        assert!(!mover.moving_right);
        assert_eq!(mover.elapsed, 0.0);

        let point = mover.step(1.0);
        assert!((point.x - 3.0).abs() < 1e-5);
    }
}
