//! Subscribable Notifier
//!
//! One-to-many event fan-out scoped to a single owner (a command registry,
//! a translation store). Dispatch is synchronous and follows subscription
//! order.

use std::fmt;

use crate::core::CoreResult;

/// Callback invoked with the payload of a matching event
pub type SubscriberCallback<P> = Box<dyn Fn(&P) -> CoreResult<()> + Send + Sync>;

/// Token identifying one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Subscriber<E, P> {
    id: SubscriptionId,
    filter: Vec<E>,
    callback: SubscriberCallback<P>,
}

/// Event notifier owned by exactly one component
pub struct Subscribable<E, P> {
    subscribers: Vec<Subscriber<E, P>>,
    next_id: u64,
}

impl<E, P> Subscribable<E, P>
where
    E: Copy + PartialEq + fmt::Debug,
{
    /// Creates a notifier without subscribers
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Subscribes `callback` to every event in `filter`
    pub fn subscribe<I>(&mut self, filter: I, callback: SubscriberCallback<P>) -> SubscriptionId
    where
        I: IntoIterator<Item = E>,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let filter: Vec<E> = filter.into_iter().collect();
        tracing::trace!("Subscribed {} to {:?}", id, filter);

        self.subscribers.push(Subscriber {
            id,
            filter,
            callback,
        });
        id
    }

    /// Removes exactly one subscription.
    ///
    /// Returns `false` when the id was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        before != self.subscribers.len()
    }

    /// Invokes every subscriber listening to `event`, in subscription order.
    ///
    /// Stops at the first failing callback and returns its error; later
    /// subscribers are not invoked.
    pub fn notify(&self, event: E, payload: &P) -> CoreResult<()> {
        for subscriber in &self.subscribers {
            if subscriber.filter.contains(&event) {
                (subscriber.callback)(payload)?;
            }
        }
        Ok(())
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E, P> Default for Subscribable<E, P>
where
    E: Copy + PartialEq + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> fmt::Debug for Subscribable<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribable")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreError;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEvent {
        Register,
        Unregister,
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> SubscriberCallback<String> {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        Box::new(move |payload: &String| {
            log.lock().unwrap().push(format!("{}:{}", tag, payload));
            Ok(())
        })
    }

    #[test]
    fn test_notify_invokes_in_subscription_order() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        notifier.subscribe([TestEvent::Register], recorder(&log, "a"));
        notifier.subscribe([TestEvent::Register], recorder(&log, "b"));
        notifier.subscribe([TestEvent::Register], recorder(&log, "c"));

        let payload = "x".to_string();
        notifier.notify(TestEvent::Register, &payload).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:x", "b:x", "c:x"]);
    }

    #[test]
    fn test_notify_respects_filter() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        notifier.subscribe([TestEvent::Register], recorder(&log, "reg"));
        notifier.subscribe([TestEvent::Unregister], recorder(&log, "unreg"));
        notifier.subscribe(
            [TestEvent::Register, TestEvent::Unregister],
            recorder(&log, "both"),
        );

        let payload = "cmd".to_string();
        notifier.notify(TestEvent::Unregister, &payload).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["unreg:cmd", "both:cmd"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_subscription() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = notifier.subscribe([TestEvent::Register], recorder(&log, "a"));
        notifier.subscribe([TestEvent::Register], recorder(&log, "b"));

        notifier.notify(TestEvent::Register, &"1".into()).unwrap();
        assert!(notifier.unsubscribe(first));
        notifier.notify(TestEvent::Register, &"2".into()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "b:2"]);
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let id = notifier.subscribe([TestEvent::Register], Box::new(|_| Ok(())));

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_failing_subscriber_stops_fan_out() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        notifier.subscribe([TestEvent::Register], recorder(&log, "before"));
        notifier.subscribe(
            [TestEvent::Register],
            Box::new(|_| Err(CoreError::SubscriberFailed("boom".into()))),
        );
        notifier.subscribe([TestEvent::Register], recorder(&log, "after"));

        let result = notifier.notify(TestEvent::Register, &"x".to_string());

        assert!(matches!(result, Err(CoreError::SubscriberFailed(_))));
        assert_eq!(*log.lock().unwrap(), vec!["before:x"]);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let mut notifier = Subscribable::<TestEvent, String>::new();
        let a = notifier.subscribe([TestEvent::Register], Box::new(|_| Ok(())));
        notifier.unsubscribe(a);
        let b = notifier.subscribe([TestEvent::Register], Box::new(|_| Ok(())));

        assert_ne!(a, b);
    }
}
