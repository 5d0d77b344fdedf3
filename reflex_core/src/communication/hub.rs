use crate::core::{LogSummary, NodeInfo};
use crate::error::{ReflexError, ReflexResult};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Default per-subscriber queue depth
pub const DEFAULT_CAPACITY: usize = 1024;

type Inbox<T> = Arc<Mutex<VecDeque<T>>>;

/// Shared state of one named topic
struct Topic<T> {
    capacity: usize,
    subscribers: Mutex<Vec<Weak<Mutex<VecDeque<T>>>>>,
}

impl<T> Topic<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

/// Process-wide topic table, keyed by topic name
static TOPICS: Lazy<Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn open_topic<T: Send + 'static>(name: &str, capacity: usize) -> ReflexResult<Arc<Topic<T>>> {
    let mut topics = TOPICS.lock();
    let entry = topics
        .entry(name.to_string())
        .or_insert_with(|| Arc::new(Topic::<T>::new(capacity)) as Arc<dyn Any + Send + Sync>);

    entry.clone().downcast::<Topic<T>>().map_err(|_| {
        ReflexError::Communication(format!(
            "topic '{}' already carries a different message type than {}",
            name,
            std::any::type_name::<T>()
        ))
    })
}

/// Lock-free atomic metrics for Hub monitoring
#[derive(Debug, Default)]
pub struct AtomicHubMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub messages_dropped: AtomicU64,
}

impl AtomicHubMetrics {
    /// Get current metrics snapshot (for monitoring/debugging)
    pub fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Plain metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_dropped: u64,
}

/// In-process publish/subscribe handle for one topic
///
/// Every `Hub` created with [`Hub::new`] owns a bounded inbox and receives a copy
/// of each message published on the topic by *other* handles. Handles created
/// with [`Hub::new_publisher`] have no inbox and are invisible to
/// [`Hub::subscriber_count`]. When an inbox is full the oldest message is dropped.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
    topic_name: String,
    inbox: Option<Inbox<T>>,
    metrics: Arc<AtomicHubMetrics>,
}

// Manual Clone: clones share the same inbox and metrics
impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            topic_name: self.topic_name.clone(),
            inbox: self.inbox.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("subscribed", &self.inbox.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> Hub<T> {
    /// Open a topic for publishing and subscribing
    pub fn new(topic_name: &str) -> ReflexResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    /// Open a topic with a custom queue depth
    ///
    /// The capacity is fixed by the first handle that opens the topic.
    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> ReflexResult<Self> {
        let topic = open_topic::<T>(topic_name, capacity)?;
        let inbox: Inbox<T> = Arc::new(Mutex::new(VecDeque::new()));
        topic.subscribers.lock().push(Arc::downgrade(&inbox));

        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
            inbox: Some(inbox),
            metrics: Arc::new(AtomicHubMetrics::default()),
        })
    }

    /// Open a topic for publishing only
    pub fn new_publisher(topic_name: &str) -> ReflexResult<Self> {
        let topic = open_topic::<T>(topic_name, DEFAULT_CAPACITY)?;

        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
            inbox: None,
            metrics: Arc::new(AtomicHubMetrics::default()),
        })
    }

    /// Publish a message to every other subscriber of the topic
    ///
    /// Returns the number of inboxes the message was delivered to.
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>) -> usize
    where
        T: LogSummary,
    {
        if let Some(ctx) = ctx {
            ctx.log_pub_summary(&self.topic_name, &msg.log_summary());
        }

        let mut delivered = 0;
        let mut subscribers = self.topic.subscribers.lock();
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            let Some(inbox) = weak.upgrade() else {
                continue;
            };
            if self.owns(&inbox) {
                continue;
            }

            let mut queue = inbox.lock();
            if queue.len() >= self.topic.capacity {
                queue.pop_front();
                self.metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
            }
            queue.push_back(msg.clone());
            delivered += 1;
        }

        self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
        delivered
    }

    /// Receive the oldest pending message
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let msg = self.inbox.as_ref()?.lock().pop_front()?;
        self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);

        if let Some(ctx) = ctx {
            ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
        }
        Some(msg)
    }

    /// Drain the inbox and return only the newest message
    ///
    /// Older pending messages are discarded.
    pub fn recv_latest(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let (latest, drained) = {
            let mut queue = self.inbox.as_ref()?.lock();
            let drained = queue.len() as u64;
            let latest = queue.pop_back();
            queue.clear();
            (latest, drained)
        };
        let msg = latest?;
        self.metrics
            .messages_received
            .fetch_add(drained, Ordering::Relaxed);

        if let Some(ctx) = ctx {
            ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
        }
        Some(msg)
    }

    /// Number of other live subscribers on this topic
    pub fn subscriber_count(&self) -> usize {
        let subscribers = self.topic.subscribers.lock();
        subscribers
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|inbox| !self.owns(inbox))
            .count()
    }

    /// Number of messages waiting in this handle's inbox
    pub fn pending(&self) -> usize {
        self.inbox.as_ref().map_or(0, |inbox| inbox.lock().len())
    }

    /// Get current metrics snapshot
    pub fn get_metrics(&self) -> HubMetrics {
        self.metrics.snapshot()
    }

    /// Get the topic name for this Hub
    pub fn get_topic_name(&self) -> &str {
        &self.topic_name
    }

    fn owns(&self, inbox: &Inbox<T>) -> bool {
        self.inbox
            .as_ref()
            .is_some_and(|own| Arc::ptr_eq(own, inbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_to_all_subscribers() {
        let publisher: Hub<u64> = Hub::new_publisher("test_hub/broadcast").unwrap();
        let a: Hub<u64> = Hub::new("test_hub/broadcast").unwrap();
        let b: Hub<u64> = Hub::new("test_hub/broadcast").unwrap();

        assert_eq!(publisher.send(7, None), 2);
        assert_eq!(a.recv(None), Some(7));
        assert_eq!(b.recv(None), Some(7));
        assert_eq!(a.recv(None), None);
    }

    #[test]
    fn test_no_echo_to_sender() {
        let hub: Hub<u64> = Hub::new("test_hub/echo").unwrap();
        let other: Hub<u64> = Hub::new("test_hub/echo").unwrap();

        assert_eq!(hub.send(1, None), 1);
        assert_eq!(hub.recv(None), None);
        assert_eq!(other.recv(None), Some(1));
    }

    #[test]
    fn test_recv_latest_discards_older() {
        let publisher: Hub<u64> = Hub::new_publisher("test_hub/latest").unwrap();
        let sub: Hub<u64> = Hub::new("test_hub/latest").unwrap();

        for i in 0..5 {
            publisher.send(i, None);
        }
        assert_eq!(sub.recv_latest(None), Some(4));
        assert_eq!(sub.pending(), 0);
        assert_eq!(sub.get_metrics().messages_received, 5);
    }

    #[test]
    fn test_bounded_inbox_drops_oldest() {
        let sub: Hub<u64> = Hub::new_with_capacity("test_hub/bounded", 2).unwrap();
        let publisher: Hub<u64> = Hub::new_publisher("test_hub/bounded").unwrap();

        publisher.send(1, None);
        publisher.send(2, None);
        publisher.send(3, None);

        assert_eq!(sub.recv(None), Some(2));
        assert_eq!(sub.recv(None), Some(3));
        assert_eq!(publisher.get_metrics().messages_dropped, 1);
    }

    #[test]
    fn test_subscriber_count_tracks_drops() {
        let publisher: Hub<u64> = Hub::new_publisher("test_hub/count").unwrap();
        assert_eq!(publisher.subscriber_count(), 0);

        let sub: Hub<u64> = Hub::new("test_hub/count").unwrap();
        let clone = sub.clone();
        assert_eq!(publisher.subscriber_count(), 1);

        drop(sub);
        assert_eq!(publisher.subscriber_count(), 1);
        drop(clone);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let _first: Hub<u64> = Hub::new("test_hub/typed").unwrap();
        let second = Hub::<String>::new("test_hub/typed");
        assert!(matches!(second, Err(ReflexError::Communication(_))));
    }

    #[test]
    fn test_context_logging_counts_messages() {
        let publisher: Hub<u64> = Hub::new_publisher("test_hub/ctx").unwrap();
        let sub: Hub<u64> = Hub::new("test_hub/ctx").unwrap();
        let mut ctx = NodeInfo::new("ctx_node".to_string(), false);

        publisher.send(3, Some(&mut ctx));
        sub.recv(Some(&mut ctx));

        assert_eq!(ctx.metrics().messages_sent, 1);
        assert_eq!(ctx.metrics().messages_received, 1);
    }
}
