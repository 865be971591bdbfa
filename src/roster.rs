//! The salon's client roster with each client's AI-recommendation history.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::CollectionsConfig;
use crate::models::{ClientRecord, Document, RecommendationRecord};
use crate::store::{Direction, DocumentStore, Query, StoreError};
use crate::subscription::{subscribe, Subscription};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(flatten)]
    pub client: ClientRecord,
    /// Newest first.
    pub recommendations: Vec<RecommendationRecord>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RosterTotals {
    pub clients: usize,
    pub recommendations: usize,
    pub products_suggested: usize,
    pub products_sold: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub salon_id: String,
    pub clients: Vec<RosterEntry>,
    pub totals: RosterTotals,
}

impl RosterView {
    /// Joins the two snapshots. Client order and per-client recommendation
    /// order are kept exactly as the store delivered them.
    pub fn build(salon_id: &str, clients: &[Document], recommendations: &[Document]) -> Self {
        let recommendations: Vec<RecommendationRecord> = recommendations
            .iter()
            .map(RecommendationRecord::from_document)
            .collect();

        let mut totals = RosterTotals {
            clients: clients.len(),
            ..RosterTotals::default()
        };

        let entries = clients
            .iter()
            .map(|doc| {
                let client = ClientRecord::from_document(doc);
                let history: Vec<RecommendationRecord> = recommendations
                    .iter()
                    .filter(|rec| rec.client_id.as_deref() == Some(client.id.as_str()))
                    .cloned()
                    .collect();
                for rec in &history {
                    totals.recommendations += 1;
                    totals.products_suggested += rec.products.len();
                    totals.products_sold += rec.sold_count();
                }
                RosterEntry {
                    client,
                    recommendations: history,
                }
            })
            .collect();

        RosterView {
            salon_id: salon_id.to_string(),
            clients: entries,
            totals,
        }
    }
}

pub struct RosterService {
    store: Arc<dyn DocumentStore>,
    collections: CollectionsConfig,
}

impl RosterService {
    pub fn new(store: Arc<dyn DocumentStore>, collections: CollectionsConfig) -> Self {
        RosterService { store, collections }
    }

    pub fn clients_query(&self, salon_id: &str) -> Query {
        Query::group(&self.collections.clients)
            .where_eq("salonId", salon_id)
            .order_by("name", Direction::Ascending)
    }

    pub fn recommendations_query(&self, salon_id: &str) -> Query {
        Query::group(&self.collections.recommendations)
            .where_eq("salonId", salon_id)
            .order_by("createdAt", Direction::Descending)
    }

    /// One-shot read of the roster.
    pub async fn snapshot(&self, salon_id: &str) -> Result<RosterView, StoreError> {
        let clients = self.store.query(&self.clients_query(salon_id)).await?;
        let recommendations = self
            .store
            .query(&self.recommendations_query(salon_id))
            .await?;
        Ok(RosterView::build(salon_id, &clients, &recommendations))
    }

    /// Live roster: a new view after every change to either collection.
    pub fn live(&self, salon_id: &str) -> LiveRoster {
        let (clients_tx, clients_rx) = mpsc::unbounded_channel();
        let (recommendations_tx, recommendations_rx) = mpsc::unbounded_channel();

        // Each sender lives in its subscription's callback, so a channel
        // closes as soon as that subscription stops delivering.
        let clients = subscribe(
            self.store.as_ref(),
            self.clients_query(salon_id),
            move |docs| {
                let _ = clients_tx.send(docs);
            },
        );
        let recommendations = subscribe(
            self.store.as_ref(),
            self.recommendations_query(salon_id),
            move |docs| {
                let _ = recommendations_tx.send(docs);
            },
        );

        LiveRoster {
            salon_id: salon_id.to_string(),
            _subscriptions: [clients, recommendations],
            clients_rx,
            recommendations_rx,
            clients: None,
            recommendations: None,
        }
    }
}

/// Stream of roster views. Emits once both collections have delivered their
/// first snapshot, then on every change. Ends as soon as either collection
/// stops delivering. Dropping it unsubscribes both.
pub struct LiveRoster {
    salon_id: String,
    _subscriptions: [Subscription; 2],
    clients_rx: mpsc::UnboundedReceiver<Vec<Document>>,
    recommendations_rx: mpsc::UnboundedReceiver<Vec<Document>>,
    clients: Option<Vec<Document>>,
    recommendations: Option<Vec<Document>>,
}

/// Latest pending snapshot of one side. `Err(())` once its channel is closed.
fn drain(
    rx: &mut mpsc::UnboundedReceiver<Vec<Document>>,
    cx: &mut Context<'_>,
) -> Result<Option<Vec<Document>>, ()> {
    let mut latest = None;
    loop {
        match rx.poll_recv(cx) {
            Poll::Ready(Some(docs)) => latest = Some(docs),
            Poll::Ready(None) => return Err(()),
            Poll::Pending => return Ok(latest),
        }
    }
}

impl Stream for LiveRoster {
    type Item = RosterView;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<RosterView>> {
        let this = self.get_mut();

        let clients = drain(&mut this.clients_rx, cx);
        let recommendations = drain(&mut this.recommendations_rx, cx);
        let (clients, recommendations) = match (clients, recommendations) {
            (Ok(clients), Ok(recommendations)) => (clients, recommendations),
            _ => return Poll::Ready(None),
        };

        let changed = clients.is_some() || recommendations.is_some();
        if let Some(docs) = clients {
            this.clients = Some(docs);
        }
        if let Some(docs) = recommendations {
            this.recommendations = Some(docs);
        }

        match (&this.clients, &this.recommendations) {
            (Some(clients), Some(recommendations)) if changed => Poll::Ready(Some(
                RosterView::build(&this.salon_id, clients, recommendations),
            )),
            _ => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            "salons/s1/clients",
            Document::from_json("c1", json!({"name": "Bea", "salonId": "s1", "visitCount": 2})),
        );
        store.insert(
            "salons/s1/clients",
            Document::from_json("c2", json!({"name": "Ana", "salonId": "s1"})),
        );
        store.insert(
            "salons/s2/clients",
            Document::from_json("c3", json!({"name": "Cy", "salonId": "s2"})),
        );
        store.insert(
            "salons/s1/recommendations",
            Document::from_json(
                "r1",
                json!({
                    "clientId": "c1", "salonId": "s1", "createdAt": "2026-09-01T10:00:00Z",
                    "products": [{"name": "Shampoo", "sold": true}, {"name": "Mask"}]
                }),
            ),
        );
        store.insert(
            "salons/s1/recommendations",
            Document::from_json(
                "r2",
                json!({
                    "clientId": "c1", "salonId": "s1", "createdAt": "2026-10-01T10:00:00Z",
                    "products": [{"name": "Oil", "sold": false}]
                }),
            ),
        );
        store
    }

    fn service(store: MemoryStore) -> RosterService {
        RosterService::new(Arc::new(store), CollectionsConfig::default())
    }

    #[tokio::test]
    async fn test_snapshot_is_tenant_scoped_and_sorted() {
        let roster = service(seeded()).snapshot("s1").await.unwrap();
        let names: Vec<Option<&str>> = roster
            .clients
            .iter()
            .map(|e| e.client.name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("Ana"), Some("Bea")]);
        assert_eq!(roster.totals.clients, 2);
    }

    #[tokio::test]
    async fn test_snapshot_joins_recommendations_newest_first() {
        let roster = service(seeded()).snapshot("s1").await.unwrap();
        let bea = roster.clients.iter().find(|e| e.client.id == "c1").unwrap();
        let ids: Vec<&str> = bea.recommendations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1"]);
        assert_eq!(roster.totals.recommendations, 2);
        assert_eq!(roster.totals.products_suggested, 3);
        assert_eq!(roster.totals.products_sold, 1);
    }

    #[test]
    fn test_orphan_recommendations_are_not_counted() {
        let clients = vec![Document::from_json("c1", json!({"name": "Ana"}))];
        let recs = vec![Document::from_json("r1", json!({"clientId": "gone"}))];
        let view = RosterView::build("s1", &clients, &recs);
        assert!(view.clients[0].recommendations.is_empty());
        assert_eq!(view.totals.recommendations, 0);
    }

    #[tokio::test]
    async fn test_live_roster_follows_changes() {
        let store = seeded();
        let roster = service(store.clone());
        let mut live = roster.live("s1");

        let first = timeout(Duration::from_secs(1), live.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.totals.clients, 2);

        store.insert(
            "salons/s1/clients",
            Document::from_json("c4", json!({"name": "Dee", "salonId": "s1"})),
        );

        // Keep reading until the change shows up; the first view may be
        // followed by one built from the other collection's first snapshot.
        let mut latest = first;
        while latest.totals.clients != 3 {
            latest = timeout(Duration::from_secs(1), live.next())
                .await
                .expect("roster update should arrive")
                .unwrap();
        }
        assert_eq!(latest.clients.last().unwrap().client.id, "c4");
    }

    /// Serves clients from memory but fails every recommendations watch.
    struct RecommendationsDown {
        clients: MemoryStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for RecommendationsDown {
        fn get_name(&self) -> &str {
            "recommendations-down"
        }

        async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
            self.clients.query(query).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            fields: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<(), StoreError> {
            self.clients.update(collection, id, fields).await
        }

        fn watch(&self, query: Query) -> crate::store::SnapshotStream {
            if query.scope.name() == "recommendations" {
                futures::stream::iter(vec![Err(StoreError::Backend(
                    "index missing".to_string(),
                ))])
                .boxed()
            } else {
                self.clients.watch(query)
            }
        }
    }

    #[tokio::test]
    async fn test_live_roster_ends_when_one_side_fails() {
        let store = RecommendationsDown { clients: seeded() };
        let roster = RosterService::new(Arc::new(store), CollectionsConfig::default());
        let mut live = roster.live("s1");

        let next = timeout(Duration::from_secs(2), live.next())
            .await
            .expect("stream should end instead of hanging");
        assert!(next.is_none());
    }
}
