use crate::algorithms::vff;
use crate::{CmdVel, LaserScan, MarkerArray};
use reflex_core::core::TopicMetadata;
use reflex_core::{Hub, Node, NodeInfo, ReflexResult};
use std::time::Duration;

pub const DEFAULT_INPUT_SCAN_TOPIC: &str = "input_scan";
pub const DEFAULT_OUTPUT_VEL_TOPIC: &str = "output_vel";
pub const DEFAULT_DEBUG_TOPIC: &str = "vff_debug";

/// Control period of the avoidance loop in Hz (50 ms)
pub const AVOIDANCE_RATE_HZ: f64 = 20.0;

/// Scans older than this are not acted on
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(1);

/// VFF Avoidance Node - reactive steering away from the nearest obstacle
///
/// Every cycle it turns the latest scan into attractive and repulsive force
/// vectors, publishes the clamped command, and publishes debug arrows when
/// somebody listens on the debug topic. Missing or stale scans skip the cycle.
pub struct VffAvoidanceNode {
    scan_subscriber: Hub<LaserScan>,
    vel_publisher: Hub<CmdVel>,
    debug_publisher: Hub<MarkerArray>,

    last_scan: Option<LaserScan>,
    stale_reported: bool,
}

impl VffAvoidanceNode {
    /// Create a new avoidance node with default topics
    pub fn new() -> ReflexResult<Self> {
        Self::new_with_topics(
            DEFAULT_INPUT_SCAN_TOPIC,
            DEFAULT_OUTPUT_VEL_TOPIC,
            DEFAULT_DEBUG_TOPIC,
        )
    }

    /// Create a new avoidance node with custom topics
    pub fn new_with_topics(scan_topic: &str, vel_topic: &str, debug_topic: &str) -> ReflexResult<Self> {
        Ok(Self {
            scan_subscriber: Hub::new(scan_topic)?,
            vel_publisher: Hub::new_publisher(vel_topic)?,
            debug_publisher: Hub::new_publisher(debug_topic)?,
            last_scan: None,
            stale_reported: false,
        })
    }

    /// Store a scan as the current snapshot, replacing the previous one
    pub fn ingest_scan(&mut self, scan: LaserScan) {
        self.last_scan = Some(scan);
    }

    /// True when the current scan exists and is at most [`SCAN_TIMEOUT`] old at `now_nanos`
    pub fn has_fresh_scan(&self, now_nanos: u64) -> bool {
        self.last_scan.as_ref().is_some_and(|scan| {
            now_nanos.saturating_sub(scan.timestamp) <= SCAN_TIMEOUT.as_nanos() as u64
        })
    }

    /// One control cycle evaluated at `now_nanos`
    ///
    /// Returns the published command, or `None` when the cycle was skipped.
    pub fn control_cycle_at(
        &mut self,
        now_nanos: u64,
        mut ctx: Option<&mut NodeInfo>,
    ) -> Option<CmdVel> {
        if !self.has_fresh_scan(now_nanos) {
            if !self.stale_reported {
                if let Some(ctx) = ctx.as_deref_mut() {
                    ctx.log_warning("No fresh scan, skipping avoidance");
                }
                self.stale_reported = true;
            }
            return None;
        }
        if self.stale_reported {
            if let Some(ctx) = ctx.as_deref_mut() {
                ctx.log_info("Scan stream resumed");
            }
            self.stale_reported = false;
        }

        let scan = self.last_scan.as_ref()?;
        let vectors = vff::compute_vff(scan);
        let cmd = vff::to_command(&vectors.result, now_nanos);
        self.vel_publisher.send(cmd, ctx.as_deref_mut());

        if self.debug_publisher.subscriber_count() > 0 {
            self.debug_publisher
                .send(vff::vff_debug_markers(&vectors, now_nanos), ctx);
        }

        Some(cmd)
    }
}

impl Node for VffAvoidanceNode {
    fn name(&self) -> &'static str {
        "VffAvoidanceNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info(&format!(
            "Steering from '{}' to '{}' (debug on '{}')",
            self.scan_subscriber.get_topic_name(),
            self.vel_publisher.get_topic_name(),
            self.debug_publisher.get_topic_name()
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        if let Some(scan) = self.scan_subscriber.recv_latest(ctx.as_deref_mut()) {
            self.ingest_scan(scan);
        }

        self.control_cycle_at(reflex_core::timestamp_now(), ctx);
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![
            TopicMetadata::new(self.vel_publisher.get_topic_name(), "CmdVel"),
            TopicMetadata::new(self.debug_publisher.get_topic_name(), "MarkerArray"),
        ]
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::new(
            self.scan_subscriber.get_topic_name(),
            "LaserScan",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NOW: u64 = 50_000_000_000;

    fn scan_at(stamp: u64, obstacle: Option<(usize, f32)>) -> LaserScan {
        let mut ranges = vec![f32::INFINITY; 360];
        if let Some((index, distance)) = obstacle {
            ranges[index] = distance;
        }
        LaserScan::full_circle(ranges).with_timestamp(stamp)
    }

    fn node(prefix: &str) -> VffAvoidanceNode {
        VffAvoidanceNode::new_with_topics(
            &format!("{}/scan", prefix),
            &format!("{}/vel", prefix),
            &format!("{}/debug", prefix),
        )
        .unwrap()
    }

    #[test]
    fn test_skips_without_scan() {
        let mut avoid = node("vff_unit/none");
        assert!(avoid.control_cycle_at(NOW, None).is_none());
        assert!(!avoid.has_fresh_scan(NOW));
    }

    #[test]
    fn test_stale_scan_is_skipped() {
        let mut avoid = node("vff_unit/stale");
        let listener: Hub<CmdVel> = Hub::new("vff_unit/stale/vel").unwrap();

        avoid.ingest_scan(scan_at(NOW - 1_500_000_000, None));
        assert!(avoid.control_cycle_at(NOW, None).is_none());
        assert!(listener.recv(None).is_none());
    }

    #[test]
    fn test_freshness_boundary() {
        let mut avoid = node("vff_unit/boundary");

        avoid.ingest_scan(scan_at(NOW - 1_000_000_000, None));
        assert!(avoid.has_fresh_scan(NOW));
        assert!(!avoid.has_fresh_scan(NOW + 1));

        // Stamped in the future counts as fresh
        avoid.ingest_scan(scan_at(NOW + 5_000_000_000, None));
        assert!(avoid.has_fresh_scan(NOW));
    }

    #[test]
    fn test_clear_path_drives_forward() {
        let mut avoid = node("vff_unit/clear");
        let listener: Hub<CmdVel> = Hub::new("vff_unit/clear/vel").unwrap();

        avoid.ingest_scan(scan_at(NOW, None));
        let cmd = avoid.control_cycle_at(NOW, None).unwrap();

        assert_relative_eq!(cmd.linear, 0.5);
        assert_relative_eq!(cmd.angular, 0.0);
        assert_eq!(listener.recv(None), Some(cmd));
    }

    #[test]
    fn test_obstacle_on_right_steers_left() {
        let mut avoid = node("vff_unit/right");

        avoid.ingest_scan(scan_at(NOW, Some((150, 0.5))));
        let cmd = avoid.control_cycle_at(NOW, None).unwrap();

        // atan2(1.0, 1.5) ~ 0.588 rad, |(1.5, 1.0)| clamps to 0.5
        assert_relative_eq!(cmd.angular, (1.0f64).atan2(1.5) as f32, epsilon = 1e-6);
        assert_relative_eq!(cmd.linear, 0.5);
    }

    #[test]
    fn test_debug_markers_only_with_subscriber() {
        let mut avoid = node("vff_unit/debug");
        avoid.ingest_scan(scan_at(NOW, Some((210, 0.7))));

        avoid.control_cycle_at(NOW, None);

        let viewer: Hub<MarkerArray> = Hub::new("vff_unit/debug/debug").unwrap();
        avoid.control_cycle_at(NOW, None);

        let markers = viewer.recv(None).unwrap();
        assert_eq!(markers.markers.len(), 3);
        assert!(viewer.recv(None).is_none());
    }
}
