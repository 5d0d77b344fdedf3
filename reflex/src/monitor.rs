use reflex_core::core::TopicMetadata;
use reflex_core::{Hub, Node, NodeInfo, ReflexResult};
use reflex_library::CmdVel;

/// Command Monitor Node - logs every velocity command the loops publish
///
/// Only added in verbose runs, so the output of a standalone process can be
/// followed without an external consumer.
pub struct CommandMonitorNode {
    subscribers: Vec<Hub<CmdVel>>,
    received: u64,
}

impl CommandMonitorNode {
    pub fn new_with_topics<S: AsRef<str>>(topics: &[S]) -> ReflexResult<Self> {
        Ok(Self {
            subscribers: topics
                .iter()
                .map(|topic| Hub::new(topic.as_ref()))
                .collect::<ReflexResult<Vec<_>>>()?,
            received: 0,
        })
    }

    /// Number of commands seen so far
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl Node for CommandMonitorNode {
    fn name(&self) -> &'static str {
        "CommandMonitorNode"
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        for hub in &self.subscribers {
            while let Some(cmd) = hub.recv(ctx.as_deref_mut()) {
                self.received += 1;
                if let Some(ctx) = ctx.as_deref_mut() {
                    ctx.log_info(&format!(
                        "'{}' <- lin={:.3} ang={:.3}",
                        hub.get_topic_name(),
                        cmd.linear,
                        cmd.angular
                    ));
                }
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> ReflexResult<()> {
        ctx.log_info(&format!("Observed {} commands", self.received));
        Ok(())
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        self.subscribers
            .iter()
            .map(|hub| TopicMetadata::new(hub.get_topic_name(), "CmdVel"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_commands_from_all_topics() {
        let mut monitor =
            CommandMonitorNode::new_with_topics(&["monitor_unit/brake", "monitor_unit/vel"])
                .unwrap();
        let brake: Hub<CmdVel> = Hub::new_publisher("monitor_unit/brake").unwrap();
        let vel: Hub<CmdVel> = Hub::new_publisher("monitor_unit/vel").unwrap();

        brake.send(CmdVel::zero(), None);
        vel.send(CmdVel::new(0.5, 0.1), None);
        vel.send(CmdVel::new(0.4, -0.1), None);

        let mut ctx = NodeInfo::new("CommandMonitorNode".to_string(), false);
        monitor.tick(Some(&mut ctx));

        assert_eq!(monitor.received(), 3);
        assert_eq!(ctx.metrics().messages_received, 3);
        assert_eq!(monitor.get_subscribers().len(), 2);
    }
}
