//! # Search Supersession
//!
//! Last-query-wins coordination for in-flight searches.
//!
//! ## Supersede Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Supersede-by-Newer-Request                           │
//! │                                                                         │
//! │  keystroke "co"   ──► ticket #1 ──► request A  ─────────┐              │
//! │  keystroke "col"  ──► ticket #2 ──► request B  ───┐     │              │
//! │                                                    │     ▼              │
//! │                                                    │  A loses the race  │
//! │                                                    │  the moment #2 is  │
//! │                                                    │  issued: Superseded│
//! │                                                    ▼                    │
//! │                                     B's response applied only if #2     │
//! │                                     is still the latest ticket          │
//! │                                                                         │
//! │  Stale responses can never overwrite fresher ones out of order.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`SearchTicket`] is a generation number backed by a watch channel;
//! [`SearchTicket::run`] races the request against supersession and refuses
//! to yield a result for a stale ticket. [`crate::error::ClientError::Superseded`]
//! is classified as an intentionally-ignorable cancellation.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Coordinator
// =============================================================================

/// Issues monotonically numbered search tickets; the newest ticket is the
/// only one whose response may be applied.
#[derive(Debug)]
pub struct SearchCoordinator {
    latest: watch::Sender<u64>,
    counter: AtomicU64,
}

impl SearchCoordinator {
    /// Creates a coordinator with no tickets issued.
    pub fn new() -> Self {
        let (latest, _) = watch::channel(0);
        SearchCoordinator {
            latest,
            counter: AtomicU64::new(0),
        }
    }

    /// Issues a new ticket, superseding every ticket issued before it.
    pub fn issue(&self) -> SearchTicket {
        let generation = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.send_replace(generation);
        debug!(generation, "Issued search ticket");

        SearchTicket {
            generation,
            latest: self.latest.subscribe(),
        }
    }
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A single query's claim to being the latest.
#[derive(Debug)]
pub struct SearchTicket {
    generation: u64,
    latest: watch::Receiver<u64>,
}

impl SearchTicket {
    /// Whether this ticket is still the latest issued.
    pub fn is_current(&self) -> bool {
        *self.latest.borrow() == self.generation
    }

    /// Runs a request under this ticket.
    ///
    /// Resolves to the request's result only while the ticket is current;
    /// a newer ticket cancels the request mid-flight, and a response that
    /// lands after supersession is discarded. Either way the caller sees
    /// [`ClientError::Superseded`].
    pub async fn run<T, F>(self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let generation = self.generation;
        let mut rx = self.latest.clone();
        let superseded = async move {
            loop {
                if *rx.borrow() != generation {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Coordinator gone: nothing can supersede us anymore
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = superseded => {
                debug!(generation, "Search superseded mid-flight");
                Err(ClientError::Superseded)
            }
            result = request => {
                if self.is_current() {
                    result
                } else {
                    debug!(generation, "Discarding stale search response");
                    Err(ClientError::Superseded)
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_ticket_resolves() {
        let coordinator = SearchCoordinator::new();
        let ticket = coordinator.issue();

        let result = ticket.run(async { Ok::<_, ClientError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_stale_ticket_is_superseded() {
        let coordinator = SearchCoordinator::new();
        let first = coordinator.issue();
        let _second = coordinator.issue();

        assert!(!first.is_current());
        let result = first.run(async { Ok::<_, ClientError>(1) }).await;
        assert!(matches!(result, Err(ClientError::Superseded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_mid_flight_cancels() {
        let coordinator = SearchCoordinator::new();
        let first = coordinator.issue();

        let slow = first.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ClientError>("slow answer")
        });

        let race = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            coordinator.issue()
        };

        let (result, _ticket) = tokio::join!(slow, race);
        assert!(matches!(result, Err(ClientError::Superseded)));
    }

    #[tokio::test]
    async fn test_latest_ticket_wins() {
        let coordinator = SearchCoordinator::new();
        let _first = coordinator.issue();
        let second = coordinator.issue();

        assert!(second.is_current());
        let result = second.run(async { Ok::<_, ClientError>("fresh") }).await;
        assert_eq!(result.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_error_classified_as_cancellation() {
        let coordinator = SearchCoordinator::new();
        let first = coordinator.issue();
        let _second = coordinator.issue();

        let err = first.run(async { Ok::<_, ClientError>(()) }).await.unwrap_err();
        assert!(err.is_cancellation());
    }
}
