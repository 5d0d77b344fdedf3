use crate::core::{Node, NodeInfo, NodeMetrics, NodeState};
use crate::error::{ReflexError, ReflexResult};
use crate::params::RuntimeParams;
use colored::Colorize;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Base loop rate used when no node asks for anything faster
pub const DEFAULT_TICK_RATE_HZ: f64 = 100.0;

/// Set once Ctrl+C has been received; every scheduler in the process honours it
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static SIGNAL_HANDLER: OnceCell<()> = OnceCell::new();

fn install_signal_handler() {
    SIGNAL_HANDLER.get_or_init(|| {
        if let Err(e) = ctrlc::set_handler(|| {
            eprintln!("{}", "\nCtrl+C received! Shutting down Reflex scheduler...".red());
            SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
            std::thread::spawn(|| {
                std::thread::sleep(Duration::from_secs(2));
                eprintln!("{}", "Force terminating application...".red());
                std::process::exit(0);
            });
        }) {
            log::warn!("Failed to set signal handler: {}", e);
        }
    });
}

/// Node registration info with lifecycle tracking and per-node rate control
struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    logging_enabled: bool,
    initialized: bool,
    context: Option<NodeInfo>,
    rate_hz: Option<f64>, // None = tick on every scheduler pass
    next_tick: Option<Instant>,
}

impl RegisteredNode {
    fn period(&self) -> Option<Duration> {
        self.rate_hz.map(|rate_hz| Duration::from_secs_f64(1.0 / rate_hz))
    }

    fn is_due(&self, now: Instant) -> bool {
        self.next_tick.map_or(true, |next_tick| now >= next_tick)
    }

    /// Advance the deadline by exactly one period so late passes do not
    /// accumulate; restart from `now` once a whole period has been missed.
    fn schedule_next(&mut self, now: Instant) {
        let Some(period) = self.period() else {
            return;
        };
        let next = match self.next_tick {
            Some(due) => due + period,
            None => now + period,
        };
        self.next_tick = Some(if next <= now { now + period } else { next });
    }
}

/// Central orchestrator: holds nodes, drives the tick loop.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    scheduler_name: String,
    tick_period: Duration,
    params: RuntimeParams,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            scheduler_name: "DefaultScheduler".to_string(),
            tick_period: Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE_HZ),
            params: RuntimeParams::new(),
        }
    }

    /// Set scheduler name (for debugging/logging)
    pub fn with_name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Set the base loop rate in Hz
    ///
    /// Per-node rates above the base rate are effectively capped by it.
    pub fn with_tick_rate(mut self, rate_hz: f64) -> Self {
        if rate_hz.is_finite() && rate_hz > 0.0 {
            self.tick_period = Duration::from_secs_f64(1.0 / rate_hz);
        } else {
            log::warn!("Ignoring invalid scheduler rate {} Hz", rate_hz);
        }
        self
    }

    /// Share a parameter store with every node added afterwards
    pub fn with_params(mut self, params: RuntimeParams) -> Self {
        self.params = params;
        self
    }

    /// Parameter store handed to the nodes
    pub fn params(&self) -> &RuntimeParams {
        &self.params
    }

    /// Add a node with given priority (lower number = higher priority)
    ///
    /// Logging defaults to off when `logging_enabled` is `None`.
    ///
    /// # Example
    /// ```rust,ignore
    /// scheduler.add(Box::new(brake), 0, Some(true));
    /// scheduler.add(Box::new(avoidance), 10, None);
    /// ```
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);

        if self.nodes.iter().any(|r| r.node.name() == node_name) {
            log::warn!(
                "Node '{}' is already registered; rate and logging settings will target the first one",
                node_name
            );
        }

        let context =
            NodeInfo::new_with_params(node_name.clone(), logging_enabled, self.params.clone());

        self.nodes.push(RegisteredNode {
            node,
            priority,
            logging_enabled,
            initialized: false,
            context: Some(context),
            rate_hz: None,
            next_tick: None,
        });
        // Stable: equal priorities keep insertion order
        self.nodes.sort_by_key(|r| r.priority);

        log::info!(
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );
        self
    }

    /// Set per-node rate control (chainable)
    ///
    /// A node without a rate ticks on every scheduler pass.
    pub fn set_node_rate(&mut self, name: &str, rate_hz: f64) -> &mut Self {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            log::warn!("Ignoring invalid rate {} Hz for node '{}'", rate_hz, name);
            return self;
        }

        match self.nodes.iter_mut().find(|r| r.node.name() == name) {
            Some(registered) => {
                registered.rate_hz = Some(rate_hz);
                registered.next_tick = None;
                log::info!("Set node '{}' rate to {:.1} Hz", name, rate_hz);
            }
            None => log::warn!("Node '{}' not found for rate configuration", name),
        }
        self
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
    }

    /// Stop the scheduler
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Main loop with automatic signal handling and cleanup
    pub fn run(&mut self) -> ReflexResult<()> {
        self.run_with_duration(None)
    }

    /// Run all nodes for a specified duration, then shutdown gracefully
    pub fn run_for(&mut self, duration: Duration) -> ReflexResult<()> {
        self.run_with_duration(Some(duration))
    }

    fn run_with_duration(&mut self, duration: Option<Duration>) -> ReflexResult<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| ReflexError::Internal(format!("Failed to create tokio runtime: {}", e)))?;

        install_signal_handler();
        log::info!(
            "Scheduler '{}' starting with {} node(s)",
            self.scheduler_name,
            self.nodes.len()
        );

        rt.block_on(async {
            let start_time = Instant::now();

            while self.is_running() {
                if let Some(max_duration) = duration {
                    if start_time.elapsed() >= max_duration {
                        log::info!("Scheduler reached time limit of {:?}", max_duration);
                        break;
                    }
                }

                self.tick_once();
                tokio::time::sleep_until(self.next_wakeup().into()).await;
            }
        });

        self.shutdown_nodes();
        log::info!("Scheduler '{}' shutdown complete", self.scheduler_name);
        Ok(())
    }

    /// Run a single scheduling pass
    ///
    /// Initializes nodes that have not been initialized yet, then ticks every
    /// node whose rate period has elapsed, in priority order.
    pub fn tick_once(&mut self) {
        self.initialize_nodes();

        for idx in 0..self.nodes.len() {
            let now = Instant::now();
            let registered = &self.nodes[idx];
            if !registered.initialized || !registered.is_due(now) {
                continue;
            }
            self.nodes[idx].schedule_next(now);
            self.execute_single_node(idx);
        }
    }

    /// Earliest rate deadline, capped by the base loop period
    fn next_wakeup(&self) -> Instant {
        let base = Instant::now() + self.tick_period;
        self.nodes
            .iter()
            .filter(|r| r.initialized)
            .filter_map(|r| r.next_tick)
            .fold(base, Instant::min)
    }

    fn initialize_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| !r.initialized) {
            let Some(ref mut ctx) = registered.context else {
                continue;
            };
            if matches!(ctx.state(), NodeState::Error(_)) {
                continue;
            }

            let node_name = registered.node.name();
            ctx.set_state(NodeState::Initializing);
            match registered.node.init(ctx) {
                Ok(()) => {
                    registered.initialized = true;
                    ctx.set_state(NodeState::Running);
                    log::info!("Initialized node '{}'", node_name);
                }
                Err(e) => {
                    log::error!("Failed to initialize node '{}': {}", node_name, e);
                    ctx.transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn execute_single_node(&mut self, idx: usize) {
        let registered = &mut self.nodes[idx];
        let node_name = registered.node.name();
        let Some(ref mut context) = registered.context else {
            return;
        };

        context.start_tick();
        let tick_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registered.node.tick(Some(&mut *context));
        }));

        match tick_result {
            Ok(()) => context.record_tick(),
            Err(panic_err) => {
                let error_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Node panicked: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Node panicked: {}", s)
                } else {
                    "Node panicked with unknown error".to_string()
                };
                eprintln!("{} {} failed: {}", "[ERROR]".red(), node_name, error_msg);
                context.record_tick_failure(error_msg);
            }
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| r.initialized) {
            let node_name = registered.node.name();
            if let Some(ref mut ctx) = registered.context {
                ctx.set_state(NodeState::Stopping);
                match registered.node.shutdown(ctx) {
                    Ok(()) => {
                        ctx.set_state(NodeState::Stopped);
                        log::info!("Shutdown node '{}' successfully", node_name);
                    }
                    Err(e) => {
                        ctx.transition_to_error(format!("Shutdown failed: {}", e));
                        log::error!("Error shutting down node '{}': {}", node_name, e);
                    }
                }
            }
            registered.initialized = false;
        }
    }

    /// Get information about all registered nodes
    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    /// Metrics of a registered node
    pub fn node_metrics(&self, name: &str) -> Option<NodeMetrics> {
        self.find(name)?.context.as_ref().map(|ctx| ctx.metrics().clone())
    }

    /// Lifecycle state of a registered node
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        self.find(name)?.context.as_ref().map(|ctx| ctx.state().clone())
    }

    /// Priority, logging flag and rate of a registered node
    pub fn node_settings(&self, name: &str) -> Option<(u32, bool, Option<f64>)> {
        self.find(name)
            .map(|r| (r.priority, r.logging_enabled, r.rate_hz))
    }

    fn find(&self, name: &str) -> Option<&RegisteredNode> {
        self.nodes.iter().find(|r| r.node.name() == name)
    }
}
