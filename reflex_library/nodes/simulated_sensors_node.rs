use crate::{LaserScan, Odometry, Pose2D, Twist, DEFAULT_SCAN_SAMPLES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reflex_core::core::TopicMetadata;
use reflex_core::{Hub, Node, NodeInfo, ReflexError, ReflexResult};
use std::f32::consts::PI;
use std::time::Instant;

/// Simulated Sensors Node - synthetic range finder and odometry source
///
/// Models a robot driving forward at constant speed towards a flat wall.
/// Each tick the wall moves closer by `speed * dt` (never closer than
/// `min_wall_distance`) and the node publishes a full-circle scan of it plus
/// matching odometry. An optional extra obstacle can be placed at a fixed
/// scan index to exercise lateral avoidance.
pub struct SimulatedSensorsNode {
    scan_publishers: Vec<Hub<LaserScan>>,
    odom_publisher: Hub<Odometry>,

    // Configuration
    samples: usize,
    speed: f64,
    min_wall_distance: f64,
    max_range: f32,
    noise: f32,
    side_obstacle: Option<(usize, f32)>,

    // State
    wall_distance: f64,
    travelled: f64,
    last_step: Option<Instant>,
    rng: StdRng,
}

impl SimulatedSensorsNode {
    /// Create a simulation publishing on "scan" and "diff_cont/odom"
    pub fn new() -> ReflexResult<Self> {
        Self::new_with_topics(&["scan"], "diff_cont/odom")
    }

    /// Create a simulation publishing the same scan on several topics
    pub fn new_with_topics(scan_topics: &[&str], odom_topic: &str) -> ReflexResult<Self> {
        if scan_topics.is_empty() {
            return Err(ReflexError::InvalidInput(
                "simulation needs at least one scan topic".to_string(),
            ));
        }

        Ok(Self {
            scan_publishers: scan_topics
                .iter()
                .map(|topic| Hub::new_publisher(topic))
                .collect::<ReflexResult<Vec<_>>>()?,
            odom_publisher: Hub::new_publisher(odom_topic)?,
            samples: DEFAULT_SCAN_SAMPLES,
            speed: 0.5,
            min_wall_distance: 0.3,
            max_range: 12.0,
            noise: 0.01,
            side_obstacle: None,
            wall_distance: 4.0,
            travelled: 0.0,
            last_step: None,
            rng: StdRng::seed_from_u64(42),
        })
    }

    /// Starting distance to the wall in meters
    pub fn with_wall_distance(mut self, distance: f64) -> Self {
        self.wall_distance = distance.max(self.min_wall_distance);
        self
    }

    /// Forward speed of the simulated robot in m/s
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Uniform range noise amplitude in meters (0 disables noise)
    pub fn with_noise(mut self, noise: f32, seed: u64) -> Self {
        self.noise = noise.abs();
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Extra point obstacle at a scan index
    pub fn with_side_obstacle(mut self, index: usize, distance: f32) -> Self {
        self.side_obstacle = Some((index, distance));
        self
    }

    pub fn wall_distance(&self) -> f64 {
        self.wall_distance
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f64) {
        let advance = (self.speed * dt).min(self.wall_distance - self.min_wall_distance);
        if advance > 0.0 {
            self.wall_distance -= advance;
            self.travelled += advance;
        }
    }

    /// Scan of the current scene stamped `timestamp`
    pub fn generate_scan(&mut self, timestamp: u64) -> LaserScan {
        let increment = 2.0 * PI / self.samples as f32;

        let mut ranges = Vec::with_capacity(self.samples);
        for i in 0..self.samples {
            let angle = -PI + i as f32 * increment;
            let cos = angle.cos();

            // Flat wall perpendicular to the heading
            let mut range = if cos > 1e-3 {
                self.wall_distance as f32 / cos
            } else {
                f32::INFINITY
            };
            if range.is_finite() && self.noise > 0.0 {
                range += self.rng.gen_range(-self.noise..=self.noise);
            }
            if range > self.max_range {
                range = f32::INFINITY;
            }
            ranges.push(range);
        }

        if let Some((index, distance)) = self.side_obstacle {
            if let Some(range) = ranges.get_mut(index) {
                *range = range.min(distance);
            }
        }

        LaserScan::full_circle(ranges)
            .with_range_limits(0.0, self.max_range)
            .with_timestamp(timestamp)
    }

    /// Odometry of the current state stamped `timestamp`
    pub fn generate_odometry(&self, timestamp: u64) -> Odometry {
        let mut odom = Odometry::new(
            Pose2D::new(self.travelled, 0.0, 0.0),
            Twist::new_2d(self.speed, 0.0, 0.0),
        );
        odom.timestamp = timestamp;
        odom
    }
}

impl Node for SimulatedSensorsNode {
    fn name(&self) -> &'static str {
        "SimulatedSensorsNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info(&format!(
            "Simulating wall at {:.2} m approaching at {:.2} m/s",
            self.wall_distance, self.speed
        ));
        self.last_step = Some(Instant::now());
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        let now = Instant::now();
        if let Some(last) = self.last_step.replace(now) {
            self.step((now - last).as_secs_f64());
        }

        let stamp = reflex_core::timestamp_now();
        let scan = self.generate_scan(stamp);
        for publisher in &self.scan_publishers {
            publisher.send(scan.clone(), ctx.as_deref_mut());
        }
        self.odom_publisher
            .send(self.generate_odometry(stamp), ctx.as_deref_mut());
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        let mut topics: Vec<TopicMetadata> = self
            .scan_publishers
            .iter()
            .map(|hub| TopicMetadata::new(hub.get_topic_name(), "LaserScan"))
            .collect();
        topics.push(TopicMetadata::new(
            self.odom_publisher.get_topic_name(),
            "Odometry",
        ));
        topics
    }
}
