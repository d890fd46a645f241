//! In-memory sidecar for fast, deterministic gateway tests.
//!
//! [`RecordingSidecar`] keeps one map per store, so reads see what earlier
//! writes stored, and it records every call it receives as a [`SidecarCall`].

#![allow(clippy::unwrap_used)] // Lock poisoning only happens after a test already panicked
#![allow(clippy::missing_panics_doc)]

use order_gateway_core::{
    PublishEvent, Record, Sidecar, SidecarError, SidecarFuture, SidecarReply,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// One call received by a [`RecordingSidecar`].
#[derive(Debug, Clone, PartialEq)]
pub enum SidecarCall {
    /// `publish`
    Publish(PublishEvent),
    /// `save_state`
    SaveState {
        /// Target store
        store_id: String,
        /// Records written
        records: Vec<Record>,
    },
    /// `get_state`
    GetState {
        /// Store read from
        store_id: String,
        /// Key read
        key: String,
    },
    /// `list_state`
    ListState {
        /// Store listed
        store_id: String,
    },
    /// `delete_state`
    DeleteState {
        /// Store deleted from
        store_id: String,
        /// Key deleted
        key: String,
    },
    /// `health`
    Health,
}

type Stores = HashMap<String, BTreeMap<String, Value>>;

/// In-memory [`Sidecar`] that records its calls.
///
/// Clones share state, so a test can hand one clone to the router and keep
/// another for assertions.
///
/// # Example
///
/// ```
/// use order_gateway_core::{Record, Sidecar};
/// use order_gateway_testing::RecordingSidecar;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), order_gateway_core::SidecarError> {
/// let sidecar = RecordingSidecar::new();
/// sidecar
///     .save_state("orders", &[Record::new("1", json!({ "orderId": 1 }))])
///     .await?;
///
/// assert_eq!(sidecar.stored("orders", "1"), Some(json!({ "orderId": 1 })));
/// assert_eq!(sidecar.calls().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RecordingSidecar {
    stores: Arc<RwLock<Stores>>,
    calls: Arc<RwLock<Vec<SidecarCall>>>,
    failures: Arc<RwLock<VecDeque<SidecarError>>>,
    healthy: Arc<AtomicBool>,
}

impl Default for RecordingSidecar {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSidecar {
    /// Create an empty, healthy sidecar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stores: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(VecDeque::new())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Seed a record without recording a call.
    pub fn insert(&self, store_id: &str, key: &str, value: Value) {
        self.stores
            .write()
            .unwrap()
            .entry(store_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Value currently stored under `store_id`/`key`.
    #[must_use]
    pub fn stored(&self, store_id: &str, key: &str) -> Option<Value> {
        self.stores
            .read()
            .unwrap()
            .get(store_id)
            .and_then(|store| store.get(key))
            .cloned()
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SidecarCall> {
        self.calls.read().unwrap().clone()
    }

    /// Events passed to `publish`, in order.
    #[must_use]
    pub fn published(&self) -> Vec<PublishEvent> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                SidecarCall::Publish(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    /// Fail the next call (of any kind) with `error`.
    ///
    /// Queued failures are consumed one per call, oldest first.
    pub fn fail_next(&self, error: SidecarError) {
        self.failures.write().unwrap().push_back(error);
    }

    /// Make `health` succeed or fail.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Record `call` and pop the next injected failure, if any.
    fn begin(&self, call: SidecarCall) -> Result<(), SidecarError> {
        self.calls.write().unwrap().push(call);
        self.failures
            .write()
            .unwrap()
            .pop_front()
            .map_or(Ok(()), Err)
    }

    fn json_reply(status: u16, body: &Value) -> SidecarReply {
        SidecarReply::new(status, body.to_string().into_bytes())
    }
}

impl Sidecar for RecordingSidecar {
    fn publish<'a>(&'a self, event: &'a PublishEvent) -> SidecarFuture<'a, ()> {
        Box::pin(async move { self.begin(SidecarCall::Publish(event.clone())) })
    }

    fn save_state<'a>(&'a self, store_id: &'a str, records: &'a [Record]) -> SidecarFuture<'a, ()> {
        Box::pin(async move {
            self.begin(SidecarCall::SaveState {
                store_id: store_id.to_string(),
                records: records.to_vec(),
            })?;

            let mut stores = self.stores.write().unwrap();
            let store = stores.entry(store_id.to_string()).or_default();
            for record in records {
                store.insert(record.key.clone(), record.value.clone());
            }
            Ok(())
        })
    }

    fn get_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, SidecarReply> {
        Box::pin(async move {
            self.begin(SidecarCall::GetState {
                store_id: store_id.to_string(),
                key: key.to_string(),
            })?;

            Ok(match self.stored(store_id, key) {
                Some(value) => Self::json_reply(200, &json!([{ "key": key, "value": value }])),
                None => SidecarReply::new(404, b"there is no such record".to_vec()),
            })
        })
    }

    fn list_state<'a>(&'a self, store_id: &'a str) -> SidecarFuture<'a, SidecarReply> {
        Box::pin(async move {
            self.begin(SidecarCall::ListState {
                store_id: store_id.to_string(),
            })?;

            let records: Vec<Value> = self
                .stores
                .read()
                .unwrap()
                .get(store_id)
                .map(|store| {
                    store
                        .iter()
                        .map(|(key, value)| json!({ "key": key, "value": value }))
                        .collect()
                })
                .unwrap_or_default();

            Ok(Self::json_reply(200, &Value::Array(records)))
        })
    }

    fn delete_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, ()> {
        Box::pin(async move {
            self.begin(SidecarCall::DeleteState {
                store_id: store_id.to_string(),
                key: key.to_string(),
            })?;

            if let Some(store) = self.stores.write().unwrap().get_mut(store_id) {
                store.remove(key);
            }
            Ok(())
        })
    }

    fn health(&self) -> SidecarFuture<'_, ()> {
        Box::pin(async move {
            self.begin(SidecarCall::Health)?;

            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(SidecarError::Rejected {
                    status: 500,
                    body: "sidecar is unhealthy".to_string(),
                })
            }
        })
    }
}
