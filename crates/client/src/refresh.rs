//! Cross-view invalidation and stale-response fencing.
//!
//! `RefreshBus` is published to after a mutation (an upload); dependent
//! views subscribe and refetch. `Fence` hands out tickets per fetch so that
//! a slow response overtaken by a newer request is dropped instead of
//! overwriting fresher state.

use tokio::sync::watch;
use tracing::debug;

/// Publish/subscribe channel carrying a monotonically increasing generation.
#[derive(Debug)]
pub struct RefreshBus {
    tx: watch::Sender<u64>,
}

impl RefreshBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Signal that backend data changed. Returns the new generation.
    pub fn publish(&self) -> u64 {
        self.tx.send_modify(|generation| *generation += 1);
        let generation = *self.tx.borrow();
        debug!(generation, "Refresh published");
        generation
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> RefreshSubscription {
        RefreshSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A view's handle on the refresh bus.
#[derive(Debug, Clone)]
pub struct RefreshSubscription {
    rx: watch::Receiver<u64>,
}

impl RefreshSubscription {
    /// Wait for the next publish. `None` once the bus is gone.
    pub async fn changed(&mut self) -> Option<u64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Non-blocking check: the new generation if one was published since the
    /// last observation.
    pub fn poll_changed(&mut self) -> Option<u64> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        *self.rx.borrow()
    }
}

/// Identifies one fetch issued through a `Fence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Latest-request-wins guard for a single view's fetches.
#[derive(Debug, Default)]
pub struct Fence {
    latest: u64,
}

impl Fence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch; every earlier ticket becomes stale.
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_latest_wins() {
        let mut fence = Fence::new();
        let first = fence.issue();
        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(first < second);
    }

    #[test]
    fn test_publish_bumps_generation() {
        let bus = RefreshBus::new();
        assert_eq!(bus.generation(), 0);
        assert_eq!(bus.publish(), 1);
        assert_eq!(bus.publish(), 2);
        assert_eq!(bus.generation(), 2);
    }

    #[test]
    fn test_poll_changed_sees_each_publish_once() {
        let bus = RefreshBus::new();
        let mut sub = bus.subscribe();
        assert_eq!(sub.poll_changed(), None);
        bus.publish();
        bus.publish();
        assert_eq!(sub.poll_changed(), Some(2));
        assert_eq!(sub.poll_changed(), None);
    }

    #[tokio::test]
    async fn test_changed_wakes_subscriber() {
        let bus = RefreshBus::new();
        let mut sub = bus.subscribe();
        let waiter = tokio::spawn(async move { sub.changed().await });
        tokio::task::yield_now().await;
        bus.publish();
        assert_eq!(waiter.await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_changed_ends_when_bus_dropped() {
        let bus = RefreshBus::new();
        let mut sub = bus.subscribe();
        drop(bus);
        assert_eq!(sub.changed().await, None);
    }
}
