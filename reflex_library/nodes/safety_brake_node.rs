use crate::algorithms::ttc::{self, BrakeState, TtcEstimate};
use crate::{CmdVel, LaserScan, Odometry};
use colored::Colorize;
use reflex_core::core::TopicMetadata;
use reflex_core::params::{DEFAULT_TTC_FINAL, TTC_FINAL_KEY};
use reflex_core::{Hub, Node, NodeInfo, ReflexResult, RuntimeParams};

pub const DEFAULT_SCAN_TOPIC: &str = "scan";
pub const DEFAULT_ODOM_TOPIC: &str = "diff_cont/odom";
pub const DEFAULT_BRAKE_TOPIC: &str = "brake";

/// Control period of the braking loop in Hz (100 ms)
pub const BRAKE_RATE_HZ: f64 = 10.0;

/// Latest linear velocity estimate of the base
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocitySnapshot {
    /// Forward velocity in m/s
    pub x: f64,
    /// Lateral velocity in m/s (kept for reference, unused by TTC)
    pub y: f64,
}

/// Safety Brake Node - time-to-collision emergency braking
///
/// Ingests range scans and odometry, evaluates the minimum time-to-collision
/// over the forward sector every cycle and, while that time is at or below the
/// `ttc_final` parameter, publishes a zero velocity command. Release is
/// signalled by silence.
pub struct SafetyBrakeNode {
    scan_subscriber: Hub<LaserScan>,
    odometry_subscriber: Hub<Odometry>,
    brake_publisher: Hub<CmdVel>,

    params: RuntimeParams,

    // Current state
    last_scan: Option<LaserScan>,
    velocity: VelocitySnapshot,
    brake_state: BrakeState,
    last_estimate: TtcEstimate,
}

impl SafetyBrakeNode {
    /// Create a new safety brake node with default topics
    pub fn new() -> ReflexResult<Self> {
        Self::new_with_topics(DEFAULT_SCAN_TOPIC, DEFAULT_ODOM_TOPIC, DEFAULT_BRAKE_TOPIC)
    }

    /// Create a new safety brake node with custom topics
    pub fn new_with_topics(scan_topic: &str, odom_topic: &str, brake_topic: &str) -> ReflexResult<Self> {
        Ok(Self {
            scan_subscriber: Hub::new(scan_topic)?,
            odometry_subscriber: Hub::new(odom_topic)?,
            brake_publisher: Hub::new_publisher(brake_topic)?,

            params: RuntimeParams::new(),

            last_scan: None,
            velocity: VelocitySnapshot::default(),
            brake_state: BrakeState::Released,
            last_estimate: TtcEstimate::clear(),
        })
    }

    /// Read the braking threshold from a shared parameter store
    ///
    /// The scheduler's store replaces this one when the node is initialized.
    pub fn with_params(mut self, params: RuntimeParams) -> Self {
        self.params = params;
        self
    }

    /// Store a scan as the current snapshot, replacing the previous one
    pub fn ingest_scan(&mut self, scan: LaserScan) {
        self.last_scan = Some(scan);
    }

    /// Store the velocity carried by an odometry message
    pub fn ingest_odometry(&mut self, odom: &Odometry) {
        self.velocity = VelocitySnapshot {
            x: odom.forward_velocity(),
            y: odom.lateral_velocity(),
        };
    }

    /// Current threshold in seconds, re-read on every call
    pub fn ttc_threshold(&self) -> f64 {
        self.params.get_f64(TTC_FINAL_KEY, DEFAULT_TTC_FINAL)
    }

    /// Re-evaluate the brake flag from the current snapshots
    ///
    /// Without a scan the flag keeps its previous value and `None` is returned.
    pub fn evaluate(&mut self) -> Option<TtcEstimate> {
        let scan = self.last_scan.as_ref()?;
        let estimate = ttc::min_time_to_collision(scan, self.velocity.x);

        self.brake_state =
            BrakeState::from_decision(ttc::should_brake(estimate.min_ttc, self.ttc_threshold()));
        self.last_estimate = estimate;
        Some(estimate)
    }

    /// Publish a zero command if braking; returns whether one was sent
    pub fn emit(&self, ctx: Option<&mut NodeInfo>) -> bool {
        if !self.brake_state.is_braking() {
            return false;
        }
        self.brake_publisher.send(CmdVel::zero(), ctx);
        true
    }

    /// One control cycle: evaluate, log transitions, emit
    pub fn control_cycle(&mut self, mut ctx: Option<&mut NodeInfo>) -> bool {
        let previous = self.brake_state;
        self.evaluate();
        self.log_state(previous, ctx.as_deref_mut());
        self.emit(ctx)
    }

    fn log_state(&self, previous: BrakeState, ctx: Option<&mut NodeInfo>) {
        let Some(ctx) = ctx else {
            return;
        };

        let label = match self.brake_state {
            BrakeState::Braking => self.brake_state.to_string().red(),
            BrakeState::Released => self.brake_state.to_string().green(),
        };
        ctx.log_debug(&label.to_string());

        if previous == self.brake_state {
            return;
        }
        let detail = format!(
            "{} (min TTC {:.3} s at index {:?}, threshold {:.3} s, v={:.3} m/s)",
            label,
            self.last_estimate.min_ttc,
            self.last_estimate.index,
            self.ttc_threshold(),
            self.velocity.x
        );
        match self.brake_state {
            BrakeState::Braking => ctx.log_warning(&detail),
            BrakeState::Released => ctx.log_info(&detail),
        }
    }

    pub fn brake_state(&self) -> BrakeState {
        self.brake_state
    }

    pub fn is_braking(&self) -> bool {
        self.brake_state.is_braking()
    }

    pub fn velocity(&self) -> VelocitySnapshot {
        self.velocity
    }

    pub fn last_estimate(&self) -> TtcEstimate {
        self.last_estimate
    }
}

impl Node for SafetyBrakeNode {
    fn name(&self) -> &'static str {
        "SafetyBrakeNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        self.params = ctx.params.clone();
        self.params.declare(TTC_FINAL_KEY, DEFAULT_TTC_FINAL)?;
        ctx.log_info(&format!(
            "Monitoring '{}' + '{}', braking on '{}' (ttc_final = {:.3} s)",
            self.scan_subscriber.get_topic_name(),
            self.odometry_subscriber.get_topic_name(),
            self.brake_publisher.get_topic_name(),
            self.ttc_threshold()
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        if let Some(scan) = self.scan_subscriber.recv_latest(ctx.as_deref_mut()) {
            self.ingest_scan(scan);
        }
        if let Some(odom) = self.odometry_subscriber.recv_latest(ctx.as_deref_mut()) {
            self.ingest_odometry(&odom);
        }

        self.control_cycle(ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info(&format!("Shutting down in state {}", self.brake_state));
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::new(
            self.brake_publisher.get_topic_name(),
            "CmdVel",
        )]
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        vec![
            TopicMetadata::new(self.scan_subscriber.get_topic_name(), "LaserScan"),
            TopicMetadata::new(self.odometry_subscriber.get_topic_name(), "Odometry"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pose2D, Twist};

    const INCREMENT: f32 = 1.0 / 64.0;

    fn scan_with_obstacle_ahead(distance: f32) -> LaserScan {
        let mut ranges = vec![f32::INFINITY; 360];
        ranges[180] = distance;
        LaserScan::new(ranges, -180.0 * INCREMENT, INCREMENT)
    }

    fn odom(vx: f64) -> Odometry {
        Odometry::new(Pose2D::origin(), Twist::new_2d(vx, 0.0, 0.0))
    }

    fn node(prefix: &str) -> SafetyBrakeNode {
        SafetyBrakeNode::new_with_topics(
            &format!("{}/scan", prefix),
            &format!("{}/odom", prefix),
            &format!("{}/brake", prefix),
        )
        .unwrap()
    }

    #[test]
    fn test_no_scan_keeps_flag() {
        let mut brake = node("brake_unit/no_scan");
        assert!(brake.evaluate().is_none());
        assert!(!brake.is_braking());
        assert!(!brake.control_cycle(None));
    }

    #[test]
    fn test_brakes_at_threshold() {
        let mut brake = node("brake_unit/threshold");
        brake.ingest_scan(scan_with_obstacle_ahead(1.0));
        brake.ingest_odometry(&odom(1.0));

        let estimate = brake.evaluate().unwrap();
        assert_eq!(estimate.min_ttc, 1.0);
        assert!(brake.is_braking());
    }

    #[test]
    fn test_threshold_reread_every_cycle() {
        let params = RuntimeParams::new();
        let mut brake = node("brake_unit/reread").with_params(params.clone());
        brake.ingest_scan(scan_with_obstacle_ahead(2.0));
        brake.ingest_odometry(&odom(1.0));

        brake.evaluate();
        assert!(!brake.is_braking());

        params.set(TTC_FINAL_KEY, 2.5).unwrap();
        brake.evaluate();
        assert!(brake.is_braking());
    }

    #[test]
    fn test_latest_odometry_wins() {
        let mut brake = node("brake_unit/odom");
        brake.ingest_odometry(&odom(0.3));
        brake.ingest_odometry(&odom(-0.2));
        assert_eq!(brake.velocity().x, -0.2);

        brake.ingest_scan(scan_with_obstacle_ahead(0.25));
        brake.evaluate();
        assert!(!brake.is_braking());
    }

    #[test]
    fn test_release_is_silent() {
        let mut brake = node("brake_unit/silent");
        let listener: Hub<CmdVel> = Hub::new("brake_unit/silent/brake").unwrap();

        brake.ingest_odometry(&odom(1.0));
        brake.ingest_scan(scan_with_obstacle_ahead(0.5));
        assert!(brake.control_cycle(None));
        assert!(brake.control_cycle(None));

        brake.ingest_scan(scan_with_obstacle_ahead(5.0));
        assert!(!brake.control_cycle(None));

        // Two zero commands while braking, nothing after release
        assert!(listener.recv(None).unwrap().is_zero());
        assert!(listener.recv(None).unwrap().is_zero());
        assert!(listener.recv(None).is_none());
    }

    #[test]
    fn test_topic_metadata() {
        let brake = node("brake_unit/meta");
        assert_eq!(brake.get_publishers()[0].topic_name, "brake_unit/meta/brake");
        assert_eq!(brake.get_subscribers().len(), 2);
    }
}
