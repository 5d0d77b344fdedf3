// End-to-end runs of both control loops through hubs and the scheduler
use approx::assert_relative_eq;
use reflex_core::params::TTC_FINAL_KEY;
use reflex_core::{Hub, RuntimeParams, Scheduler};
use reflex_library::algorithms::vff::MAX_LINEAR_SPEED;
use reflex_library::{
    CmdVel, LaserScan, MarkerArray, SafetyBrakeNode, SimulatedSensorsNode, VffAvoidanceNode,
};

fn drain<T: Clone + Send + 'static + reflex_library::LogSummary>(hub: &Hub<T>) -> Vec<T> {
    std::iter::from_fn(|| hub.recv(None)).collect()
}

fn run_passes(scheduler: &mut Scheduler, passes: usize) {
    for _ in 0..passes {
        scheduler.tick_once();
    }
}

// Nodes run without a rate so every pass is one control cycle
fn brake_scheduler(prefix: &str, wall: f64, speed: f64, params: RuntimeParams) -> Scheduler {
    let scan = format!("{}/scan", prefix);
    let odom = format!("{}/odom", prefix);
    let brake = format!("{}/brake", prefix);

    let sim = SimulatedSensorsNode::new_with_topics(&[scan.as_str()], &odom)
        .unwrap()
        .with_wall_distance(wall)
        .with_speed(speed);
    let node = SafetyBrakeNode::new_with_topics(&scan, &odom, &brake).unwrap();

    let mut scheduler = Scheduler::new().with_params(params);
    scheduler
        .add(Box::new(sim), 0, None)
        .add(Box::new(node), 1, Some(true));
    scheduler
}

#[test]
fn test_brake_loop_emits_zero_while_unsafe() {
    let listener: Hub<CmdVel> = Hub::new("loops/unsafe/brake").unwrap();
    let mut scheduler = brake_scheduler("loops/unsafe", 0.4, 0.5, RuntimeParams::new());

    run_passes(&mut scheduler, 3);

    let commands = drain(&listener);
    assert_eq!(commands.len(), 3);
    assert!(commands.iter().all(CmdVel::is_zero));
}

#[test]
fn test_brake_loop_silent_when_safe() {
    let listener: Hub<CmdVel> = Hub::new("loops/safe/brake").unwrap();
    let mut scheduler = brake_scheduler("loops/safe", 3.0, 0.5, RuntimeParams::new());

    run_passes(&mut scheduler, 3);

    assert!(drain(&listener).is_empty());
    let metrics = scheduler.node_metrics("SafetyBrakeNode").unwrap();
    assert_eq!(metrics.successful_ticks, 3);
    assert_eq!(metrics.messages_sent, 0);
}

#[test]
fn test_threshold_reconfigured_at_runtime() {
    let params = RuntimeParams::new();
    let listener: Hub<CmdVel> = Hub::new("loops/reconfigure/brake").unwrap();
    let mut scheduler = brake_scheduler("loops/reconfigure", 2.0, 0.5, params.clone());

    // TTC is about 4 s, above the default 1 s threshold
    run_passes(&mut scheduler, 2);
    assert!(drain(&listener).is_empty());

    params.set(TTC_FINAL_KEY, 5.0).unwrap();
    run_passes(&mut scheduler, 1);
    assert_eq!(drain(&listener).len(), 1);
}

#[test]
fn test_avoidance_loop_steers_away_from_right_obstacle() {
    let sim = SimulatedSensorsNode::new_with_topics(&["loops/vff/input_scan"], "loops/vff/odom")
        .unwrap()
        .with_wall_distance(6.0)
        .with_speed(0.0)
        .with_noise(0.0, 0)
        .with_side_obstacle(150, 0.5);
    let node = VffAvoidanceNode::new_with_topics(
        "loops/vff/input_scan",
        "loops/vff/output_vel",
        "loops/vff/debug",
    )
    .unwrap();

    let commands: Hub<CmdVel> = Hub::new("loops/vff/output_vel").unwrap();
    let viewer: Hub<MarkerArray> = Hub::new("loops/vff/debug").unwrap();

    let mut scheduler = Scheduler::new();
    scheduler
        .add(Box::new(sim), 0, None)
        .add(Box::new(node), 1, None);
    run_passes(&mut scheduler, 4);

    let received = drain(&commands);
    assert_eq!(received.len(), 4);
    for cmd in &received {
        assert_eq!(cmd.linear, MAX_LINEAR_SPEED);
        assert_relative_eq!(cmd.angular, (1.0f64).atan2(1.5) as f32, epsilon = 1e-5);
    }

    let markers = drain(&viewer);
    assert_eq!(markers.len(), received.len());
    assert!(markers.iter().all(|array| array.markers.len() == 3));
}

#[test]
fn test_avoidance_loop_ignores_stale_scan() {
    let feed: Hub<LaserScan> = Hub::new_publisher("loops/stale/input_scan").unwrap();
    let commands: Hub<CmdVel> = Hub::new("loops/stale/output_vel").unwrap();
    let node = VffAvoidanceNode::new_with_topics(
        "loops/stale/input_scan",
        "loops/stale/output_vel",
        "loops/stale/debug",
    )
    .unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add(Box::new(node), 0, Some(true));

    feed.send(LaserScan::default().with_timestamp(0), None);
    scheduler.tick_once();
    assert!(commands.recv(None).is_none());

    feed.send(
        LaserScan::default().with_timestamp(reflex_core::timestamp_now()),
        None,
    );
    scheduler.tick_once();
    let cmd = commands.recv(None).unwrap();
    assert_relative_eq!(cmd.linear, 0.5);
    assert_relative_eq!(cmd.angular, 0.0);
}
