// Realtime module - fan-out of ticket state to connected viewers

pub mod ws;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};

use crate::models::Ticket;

/// Event pushed to every connected viewer.
///
/// Serialized as `{"event": "...", "data": {...}}`; ticket-carrying events
/// hold the full canonical ticket representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TicketEvent {
    /// Greeting sent once per connection.
    Status { msg: String },
    NewTicket(Ticket),
    TicketUpdated(Ticket),
}

impl TicketEvent {
    pub fn greeting() -> Self {
        TicketEvent::Status {
            msg: "Connected to ticket system".to_string(),
        }
    }
}

/// Registry of connected viewers.
///
/// Connections are added on websocket connect and removed on disconnect;
/// each broadcast iterates the registry and pushes a clone of the event to
/// every live connection. Delivery is best-effort: a viewer whose channel is
/// gone is pruned during the sweep and simply misses the event.
pub struct Broadcaster {
    next_id: AtomicU64,
    connections: RwLock<HashMap<u64, mpsc::UnboundedSender<TicketEvent>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a viewer connection. Returns its id and the receiving half the
    /// connection drains events from.
    pub async fn register(&self) -> (u64, mpsc::UnboundedReceiver<TicketEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(id, tx);
        (id, rx)
    }

    /// Remove a viewer connection.
    pub async fn unregister(&self, id: u64) {
        self.connections.write().await.remove(&id);
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn broadcast_created(&self, ticket: &Ticket) {
        self.send_all(TicketEvent::NewTicket(ticket.clone())).await;
    }

    pub async fn broadcast_updated(&self, ticket: &Ticket) {
        self.send_all(TicketEvent::TicketUpdated(ticket.clone())).await;
    }

    async fn send_all(&self, event: TicketEvent) {
        let stale: Vec<u64> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .filter(|(_, tx)| tx.send(event.clone()).is_err())
                .map(|(id, _)| *id)
                .collect()
        };

        if !stale.is_empty() {
            let mut connections = self.connections.write().await;
            for id in stale {
                connections.remove(&id);
            }
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;
    use chrono::Utc;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: 1,
            user_id: "john".to_string(),
            pdf_link: "http://x/a.pdf".to_string(),
            product_id: String::new(),
            other_ids: String::new(),
            status: TicketStatus::Open,
            description: String::new(),
            comments: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn every_registered_viewer_receives_the_event() {
        let broadcaster = Broadcaster::new();
        let (_, mut rx1) = broadcaster.register().await;
        let (_, mut rx2) = broadcaster.register().await;

        broadcaster.broadcast_created(&sample_ticket()).await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.expect("event delivered") {
                TicketEvent::NewTicket(ticket) => assert_eq!(ticket.id, 1),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn broadcast_with_no_viewers_does_not_panic() {
        let broadcaster = Broadcaster::new();
        broadcaster.broadcast_updated(&sample_ticket()).await;
    }

    #[tokio::test]
    async fn unregistered_viewer_stops_receiving() {
        let broadcaster = Broadcaster::new();
        let (id, mut rx) = broadcaster.register().await;

        broadcaster.unregister(id).await;
        broadcaster.broadcast_updated(&sample_ticket()).await;

        assert!(rx.recv().await.is_none());
        assert_eq!(broadcaster.connection_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned_on_broadcast() {
        let broadcaster = Broadcaster::new();
        let (_, rx) = broadcaster.register().await;
        let (_, mut live_rx) = broadcaster.register().await;
        drop(rx);

        broadcaster.broadcast_updated(&sample_ticket()).await;

        assert_eq!(broadcaster.connection_count().await, 1);
        assert!(matches!(
            live_rx.recv().await,
            Some(TicketEvent::TicketUpdated(_))
        ));
    }

    #[test]
    fn wire_format_uses_event_and_data_tags() {
        let greeting = serde_json::to_value(TicketEvent::greeting()).expect("serialize");
        assert_eq!(greeting["event"], "status");
        assert_eq!(greeting["data"]["msg"], "Connected to ticket system");

        let created = serde_json::to_value(TicketEvent::NewTicket(sample_ticket()))
            .expect("serialize");
        assert_eq!(created["event"], "new_ticket");
        assert_eq!(created["data"]["id"], 1);
        assert_eq!(created["data"]["status"], "Open");
        assert_eq!(created["data"]["user_id"], "john");

        let updated = serde_json::to_value(TicketEvent::TicketUpdated(sample_ticket()))
            .expect("serialize");
        assert_eq!(updated["event"], "ticket_updated");
        assert_eq!(updated["data"]["pdf_link"], "http://x/a.pdf");
    }
}
