//! In-memory stand-ins for the data store and the admin gate.

use crate::auth::{AdminContext, AdminGate};
use crate::datastore::{Direction, FilterOp, RowQuery, RowSource};
use async_trait::async_trait;
use serde_json::Value;
use shared::{Result, SharedError};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct State {
    rows: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    queries: Vec<RowQuery>,
}

/// `RowSource` over fixed rows per collection.
///
/// Applies equality filters, ordering, limit and projection the way the
/// REST store does, records every query, and can be told to fail or stall
/// reads of a collection.
#[derive(Clone, Default)]
pub struct MemoryRowSource {
    state: Arc<Mutex<State>>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, collection: &str, rows: Vec<Value>) -> Self {
        self.lock().rows.insert(collection.to_string(), rows);
        self
    }

    /// Every read of `collection` fails with a query error.
    pub fn failing(self, collection: &str) -> Self {
        self.lock().failing.insert(collection.to_string());
        self
    }

    /// Every read of `collection` waits `delay` before answering.
    pub fn with_delay(self, collection: &str, delay: Duration) -> Self {
        self.lock().delays.insert(collection.to_string(), delay);
        self
    }

    /// Queries received so far, in arrival order.
    pub fn queries(&self) -> Vec<RowQuery> {
        self.lock().queries.clone()
    }

    pub fn queries_for(&self, collection: &str) -> usize {
        self.lock()
            .queries
            .iter()
            .filter(|q| q.collection == collection)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn answer(&self, query: &RowQuery) -> Result<Vec<Value>> {
        let state = self.lock();
        if state.failing.contains(&query.collection) {
            return Err(SharedError::Query(format!(
                "{} unavailable",
                query.collection
            )));
        }

        let mut rows: Vec<Value> = state
            .rows
            .get(&query.collection)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| {
                query.filters.iter().all(|filter| match filter.op {
                    FilterOp::Eq => row
                        .get(&filter.field)
                        .map(|value| same_value(value, &filter.value))
                        .unwrap_or(false),
                })
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if !query.fields.is_empty() {
            let keys: Vec<&str> = query
                .fields
                .iter()
                .map(|field| field.split('(').next().unwrap_or(field.as_str()))
                .collect();
            rows = rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(map) => Value::Object(
                        map.into_iter()
                            .filter(|(key, _)| keys.contains(&key.as_str()))
                            .collect(),
                    ),
                    other => other,
                })
                .collect();
        }

        Ok(rows)
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn read_rows(&self, query: &RowQuery) -> Result<Vec<Value>> {
        let delay = {
            let mut state = self.lock();
            state.queries.push(query.clone());
            state.delays.get(&query.collection).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(query)
    }
}

/// Filter values arrive as strings for ids stored as integers.
fn same_value(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => stored == wanted,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Admin gate with a fixed session table: session id -> (email, is_admin).
#[derive(Clone, Default)]
pub struct StaticAdminGate {
    sessions: HashMap<String, (String, bool)>,
}

impl StaticAdminGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session_id: &str, email: &str, is_admin: bool) -> Self {
        self.sessions
            .insert(session_id.to_string(), (email.to_string(), is_admin));
        self
    }
}

#[async_trait]
impl AdminGate for StaticAdminGate {
    async fn authorize(&self, session_id: &str) -> Result<AdminContext> {
        match self.sessions.get(session_id) {
            Some((email, true)) => Ok(AdminContext::new(email)),
            Some((email, false)) => Err(SharedError::Forbidden(format!(
                "{} is not an administrator",
                email
            ))),
            None => Err(SharedError::Unauthorized("Invalid session".to_string())),
        }
    }
}
