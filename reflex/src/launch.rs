//! Wiring of the control loops into a scheduler
//!
//! The command-line binary turns its arguments into a [`LaunchConfig`] and
//! hands it to [`build_scheduler`]; embedders can do the same.

use crate::monitor::CommandMonitorNode;
use anyhow::{Context, Result};
use reflex_core::params::TTC_FINAL_KEY;
use reflex_core::{RuntimeParams, Scheduler};
use reflex_library::nodes::safety_brake_node::{
    DEFAULT_BRAKE_TOPIC, DEFAULT_ODOM_TOPIC, DEFAULT_SCAN_TOPIC,
};
use reflex_library::nodes::vff_avoidance_node::{
    DEFAULT_DEBUG_TOPIC, DEFAULT_INPUT_SCAN_TOPIC, DEFAULT_OUTPUT_VEL_TOPIC,
};
use reflex_library::nodes::{AVOIDANCE_RATE_HZ, BRAKE_RATE_HZ};
use reflex_library::{SafetyBrakeNode, SimulatedSensorsNode, VffAvoidanceNode};
use std::path::PathBuf;

/// Topics of the braking loop
#[derive(Debug, Clone, PartialEq)]
pub struct BrakeTopics {
    pub scan: String,
    pub odom: String,
    pub brake: String,
}

impl Default for BrakeTopics {
    fn default() -> Self {
        Self {
            scan: DEFAULT_SCAN_TOPIC.to_string(),
            odom: DEFAULT_ODOM_TOPIC.to_string(),
            brake: DEFAULT_BRAKE_TOPIC.to_string(),
        }
    }
}

/// Topics of the avoidance loop
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidTopics {
    pub input_scan: String,
    pub output_vel: String,
    pub debug: String,
}

impl Default for AvoidTopics {
    fn default() -> Self {
        Self {
            input_scan: DEFAULT_INPUT_SCAN_TOPIC.to_string(),
            output_vel: DEFAULT_OUTPUT_VEL_TOPIC.to_string(),
            debug: DEFAULT_DEBUG_TOPIC.to_string(),
        }
    }
}

/// Simulated wall scenario
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub wall_distance: f64,
    pub speed: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            wall_distance: 4.0,
            speed: 0.5,
        }
    }
}

/// Everything needed to assemble a Reflex process
#[derive(Debug, Clone, Default)]
pub struct LaunchConfig {
    pub brake: Option<BrakeTopics>,
    pub avoid: Option<AvoidTopics>,
    /// Overrides `ttc_final` after the parameter file is applied
    pub ttc_final: Option<f64>,
    pub params_file: Option<PathBuf>,
    pub simulation: Option<SimulationConfig>,
    pub verbose: bool,
}

/// Build the parameter store: defaults, then file, then explicit overrides
pub fn load_params(config: &LaunchConfig) -> Result<RuntimeParams> {
    let params = match &config.params_file {
        Some(path) => RuntimeParams::from_file(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => RuntimeParams::new(),
    };

    if let Some(ttc_final) = config.ttc_final {
        anyhow::ensure!(
            ttc_final.is_finite() && ttc_final >= 0.0,
            "ttc_final must be a non-negative number, got {}",
            ttc_final
        );
        params.set(TTC_FINAL_KEY, ttc_final)?;
    }
    Ok(params)
}

/// Assemble a scheduler running the configured loops
pub fn build_scheduler(config: &LaunchConfig) -> Result<Scheduler> {
    anyhow::ensure!(
        config.brake.is_some() || config.avoid.is_some(),
        "nothing to run: enable the brake loop, the avoidance loop, or both"
    );

    let params = load_params(config)?;
    let mut scheduler = Scheduler::new().with_name("reflex").with_params(params);
    let mut monitored = Vec::new();

    if let Some(sim) = &config.simulation {
        let mut scan_topics = Vec::new();
        let odom_topic = config
            .brake
            .as_ref()
            .map_or(DEFAULT_ODOM_TOPIC, |topics| topics.odom.as_str());
        if let Some(brake) = &config.brake {
            scan_topics.push(brake.scan.as_str());
        }
        if let Some(avoid) = &config.avoid {
            scan_topics.push(avoid.input_scan.as_str());
        }

        let node = SimulatedSensorsNode::new_with_topics(&scan_topics, odom_topic)
            .context("failed to create simulated sensors")?
            .with_wall_distance(sim.wall_distance)
            .with_speed(sim.speed);
        scheduler.add(Box::new(node), 0, Some(config.verbose));
    }

    if let Some(topics) = &config.brake {
        let node = SafetyBrakeNode::new_with_topics(&topics.scan, &topics.odom, &topics.brake)
            .context("failed to create the safety brake node")?;
        scheduler
            .add(Box::new(node), 10, Some(true))
            .set_node_rate("SafetyBrakeNode", BRAKE_RATE_HZ);
        monitored.push(topics.brake.clone());
    }

    if let Some(topics) = &config.avoid {
        let node = VffAvoidanceNode::new_with_topics(
            &topics.input_scan,
            &topics.output_vel,
            &topics.debug,
        )
        .context("failed to create the VFF avoidance node")?;
        scheduler
            .add(Box::new(node), 20, Some(true))
            .set_node_rate("VffAvoidanceNode", AVOIDANCE_RATE_HZ);
        monitored.push(topics.output_vel.clone());
    }

    if config.verbose {
        let monitor = CommandMonitorNode::new_with_topics(&monitored)
            .context("failed to create the command monitor")?;
        scheduler.add(Box::new(monitor), 100, Some(true));
    }

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_loop_topics() {
        let brake = BrakeTopics::default();
        assert_eq!(brake.scan, "scan");
        assert_eq!(brake.odom, "diff_cont/odom");
        assert_eq!(brake.brake, "brake");

        let avoid = AvoidTopics::default();
        assert_eq!(avoid.input_scan, "input_scan");
        assert_eq!(avoid.output_vel, "output_vel");
        assert_eq!(avoid.debug, "vff_debug");
    }

    #[test]
    fn test_nothing_to_run_is_rejected() {
        assert!(build_scheduler(&LaunchConfig::default()).is_err());
    }

    #[test]
    fn test_ttc_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "ttc_final: 2.0\n").unwrap();

        let mut config = LaunchConfig {
            params_file: Some(path),
            ..Default::default()
        };
        assert_eq!(load_params(&config).unwrap().get_f64(TTC_FINAL_KEY, 0.0), 2.0);

        config.ttc_final = Some(0.5);
        assert_eq!(load_params(&config).unwrap().get_f64(TTC_FINAL_KEY, 0.0), 0.5);

        config.ttc_final = Some(-1.0);
        assert!(load_params(&config).is_err());
    }

    #[test]
    fn test_missing_params_file_has_context() {
        let config = LaunchConfig {
            params_file: Some(PathBuf::from("/nonexistent/reflex.yaml")),
            ..Default::default()
        };
        let err = load_params(&config).unwrap_err();
        assert!(err.to_string().contains("failed to load parameters"));
    }

    #[test]
    fn test_all_loops_with_simulation() {
        let config = LaunchConfig {
            brake: Some(BrakeTopics {
                scan: "launch_test/scan".into(),
                odom: "launch_test/odom".into(),
                brake: "launch_test/brake".into(),
            }),
            avoid: Some(AvoidTopics {
                input_scan: "launch_test/input_scan".into(),
                output_vel: "launch_test/output_vel".into(),
                debug: "launch_test/debug".into(),
            }),
            simulation: Some(SimulationConfig::default()),
            verbose: true,
            ..Default::default()
        };

        let scheduler = build_scheduler(&config).unwrap();
        assert_eq!(
            scheduler.get_node_list(),
            vec![
                "SimulatedSensorsNode",
                "SafetyBrakeNode",
                "VffAvoidanceNode",
                "CommandMonitorNode"
            ]
        );
        assert_eq!(
            scheduler.node_settings("SafetyBrakeNode"),
            Some((10, true, Some(BRAKE_RATE_HZ)))
        );
    }
}
