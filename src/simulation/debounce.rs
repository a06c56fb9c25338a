//! Trailing-edge debounce
//!
//! Each `schedule()` aborts the pending timer task and spawns a new one; when
//! a timer survives its quiet period it sends a `Fired` delivery on the
//! scheduler's channel. Deliveries carry a ticket, and only the ticket of the
//! currently armed timer is honored by `take_fired()`, so a timer that elapsed
//! just before a `schedule()`/`cancel()` can never leak an old event.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// A timer that survived its quiet period
#[derive(Debug)]
pub struct Fired<T> {
    pub ticket: u64,
    pub event: T,
}

struct Armed {
    ticket: u64,
    handle: JoinHandle<()>,
}

pub struct DebounceScheduler<T> {
    tx: mpsc::UnboundedSender<Fired<T>>,
    armed: Option<Armed>,
    next_ticket: u64,
}

impl<T: Send + 'static> DebounceScheduler<T> {
    /// Create a scheduler and the receiver its deliveries arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            armed: None,
            next_ticket: 0,
        };
        (scheduler, rx)
    }

    /// Replace any pending event with `event`, delivered after `quiet_period`
    ///
    /// Must be called inside a tokio runtime. A zero quiet period still
    /// delivers on a later scheduling turn, never synchronously.
    pub fn schedule(&mut self, event: T, quiet_period: Duration) -> u64 {
        self.abort_pending();

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let tx = self.tx.clone();
        let deadline = Instant::now() + quiet_period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // receiver gone means the session is over
            let _ = tx.send(Fired { ticket, event });
        });

        self.armed = Some(Armed { ticket, handle });
        ticket
    }

    /// Drop the pending event, if any; nothing is delivered afterwards
    pub fn cancel(&mut self) {
        if self.abort_pending() {
            log::debug!("Debounce cancelled");
        }
    }

    /// Accept a delivery from the channel
    ///
    /// Returns the event only if `fired` belongs to the armed timer; the
    /// scheduler is disarmed afterwards.
    pub fn take_fired(&mut self, fired: Fired<T>) -> Option<T> {
        let armed_ticket = self.armed.as_ref().map(|armed| armed.ticket);
        if armed_ticket == Some(fired.ticket) {
            self.armed = None;
            Some(fired.event)
        } else {
            log::debug!("Ignoring superseded debounce delivery (ticket {})", fired.ticket);
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    fn abort_pending(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<T> Drop for DebounceScheduler<T> {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_only_last_event() {
        let (mut debounce, mut rx) = DebounceScheduler::new();
        let quiet = Duration::from_millis(50);

        for value in [0u32, 10, 20, 30] {
            debounce.schedule(value, quiet);
            advance(Duration::from_millis(10)).await;
        }

        let fired = rx.recv().await.unwrap();
        assert_eq!(debounce.take_fired(fired), Some(30));
        assert!(!debounce.is_pending());

        advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (mut debounce, mut rx) = DebounceScheduler::new();

        debounce.schedule("pending", Duration::from_millis(50));
        advance(Duration::from_millis(20)).await;
        debounce.cancel();

        advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        assert!(!debounce.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_delivery_is_ignored_after_cancel() {
        let (mut debounce, mut rx) = DebounceScheduler::new();

        debounce.schedule("late", Duration::from_millis(5));
        let fired = rx.recv().await.unwrap();

        // timer already sent, but the owner cancelled before consuming it
        debounce.cancel();
        assert_eq!(debounce.take_fired(fired), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_quiet_period_is_never_synchronous() {
        let (mut debounce, mut rx) = DebounceScheduler::new();

        debounce.schedule(7, Duration::ZERO);
        assert!(rx.try_recv().is_err());

        let fired = rx.recv().await.unwrap();
        assert_eq!(debounce.take_fired(fired), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_deliver() {
        let (mut debounce, mut rx) = DebounceScheduler::new();
        let quiet = Duration::from_millis(50);

        debounce.schedule(1, quiet);
        let first = rx.recv().await.unwrap();
        assert_eq!(debounce.take_fired(first), Some(1));

        debounce.schedule(2, quiet);
        let second = rx.recv().await.unwrap();
        assert_eq!(debounce.take_fired(second), Some(2));
    }
}
