use crate::error::ReflexResult;
use crate::params::RuntimeParams;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Trait for providing lightweight logging summaries of message types
///
/// Large messages (range frames, marker arrays) provide a compact description
/// instead of their full Debug output.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Configuration parameters for node behavior
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub enable_logging: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            enable_logging: true,
        }
    }
}

/// Runtime context handed to a node on every callback
pub struct NodeInfo {
    name: String,

    state: NodeState,

    config: NodeConfig,
    metrics: NodeMetrics,

    tick_start_time: Option<Instant>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,

    /// Runtime parameters shared with the rest of the process
    pub params: RuntimeParams,
}

impl NodeInfo {
    /// Create a new NodeInfo with its own parameter store
    pub fn new(node_name: String, logging_enabled: bool) -> Self {
        Self::new_with_params(node_name, logging_enabled, RuntimeParams::new())
    }

    /// Create a NodeInfo that shares the given parameter store
    pub fn new_with_params(node_name: String, logging_enabled: bool, params: RuntimeParams) -> Self {
        let config = NodeConfig {
            enable_logging: logging_enabled,
        };

        Self {
            name: node_name,
            state: NodeState::Uninitialized,
            config,
            metrics: NodeMetrics::default(),
            tick_start_time: None,
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
            params,
        }
    }

    // State Management Methods
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        self.state = new_state;
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.successful_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let total_duration =
                self.metrics.avg_tick_duration_ms * (self.metrics.successful_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total_duration + duration_ms) / self.metrics.successful_ticks as f64;
        }
    }

    pub fn record_tick_failure(&mut self, error_msg: String) {
        self.metrics.total_ticks += 1;
        self.metrics.failed_ticks += 1;
        if let Some(start_time) = self.tick_start_time.take() {
            self.metrics.last_tick_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        }

        self.log_error(&error_msg);
    }

    /// Record an outgoing message; used by `Hub::send`
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        if self.config.enable_logging {
            log::debug!(target: "reflex::pubsub", "{} --PUB--> '{}' = {}", self.name, topic, summary);
        }

        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    /// Record an incoming message; used by `Hub::recv`
    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        if self.config.enable_logging {
            log::debug!(target: "reflex::pubsub", "{} <--SUB-- '{}' = {}", self.name, topic, summary);
        }

        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
    }

    pub fn log_info(&self, message: &str) {
        if self.config.enable_logging {
            log::info!("[{}] {}", self.name, message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.config.enable_logging {
            log::warn!("[{}] {}", self.name, message);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        if self.config.enable_logging {
            log::error!("[{}] {}", self.name, message);
        }
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&self, message: &str) {
        if self.config.enable_logging {
            log::debug!("[{}] {}", self.name, message);
        }
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
}

/// Topic metadata for monitoring and introspection
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMetadata {
    pub topic_name: String,
    pub type_name: String,
}

impl TopicMetadata {
    pub fn new(topic_name: &str, type_name: &str) -> Self {
        Self {
            topic_name: topic_name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// Trait for Reflex nodes with lifecycle support
pub trait Node: Send {
    /// Get the node's name (must be unique within a scheduler)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once at startup)
    fn init(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step (called at the node's rate)
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }

    /// Get list of publishers (topic metadata)
    fn get_publishers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    /// Get list of subscribers (topic metadata)
    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f32 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for u64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_metrics() {
        let mut info = NodeInfo::new("metrics_node".to_string(), false);
        info.start_tick();
        info.record_tick();
        info.start_tick();
        info.record_tick_failure("boom".to_string());

        let metrics = info.metrics();
        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.successful_ticks, 1);
        assert_eq!(metrics.failed_ticks, 1);
        assert_eq!(metrics.errors_count, 1);
    }

    #[test]
    fn test_pubsub_counters() {
        let mut info = NodeInfo::new("counter_node".to_string(), false);
        info.log_pub_summary("brake", "CmdVel(0.000, 0.000)");
        info.log_pub_summary("brake", "CmdVel(0.000, 0.000)");
        info.log_sub_summary("scan", "LaserScan(360)");

        assert_eq!(info.published_topics().get("brake"), Some(&2));
        assert_eq!(info.subscribed_topics().get("scan"), Some(&1));
        assert_eq!(info.metrics().messages_sent, 2);
        assert_eq!(info.metrics().messages_received, 1);
    }

    #[test]
    fn test_error_transition() {
        let mut info = NodeInfo::new("faulty".to_string(), false);
        info.transition_to_error("sensor missing".to_string());
        assert_eq!(info.state(), &NodeState::Error("sensor missing".to_string()));
        assert_eq!(info.state().to_string(), "Error: sensor missing");
    }

    #[test]
    fn test_logging_flag_and_name() {
        let quiet = NodeInfo::new("quiet".to_string(), false);
        assert!(!quiet.config().enable_logging);
        assert_eq!(quiet.name(), "quiet");
        assert!(NodeInfo::new("loud".to_string(), true).config().enable_logging);
        assert!(NodeConfig::default().enable_logging);
    }
}
