use super::query::{FilterOp, RowQuery, RowSource};
use crate::config::DataStoreConfig;
use crate::metrics;
use async_trait::async_trait;
use serde_json::Value;
use shared::{Result, SharedError};
use std::time::{Duration, Instant};

/// Longest slice of an error body carried into the error message.
const ERROR_BODY_LIMIT: usize = 200;

/// `RowSource` backed by the hosted store's REST interface (PostgREST dialect).
#[derive(Clone)]
pub struct RestRowSource {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestRowSource {
    pub fn new(config: &DataStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SharedError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Value>> {
        let url = self.endpoint(&query.collection);
        let params = query_params(query);
        log::debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SharedError::query(&format!("Request to {} failed", query.collection), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(SharedError::Query(format!(
                "{} returned {}: {}",
                query.collection, status, snippet
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            SharedError::query(&format!("Invalid JSON from {}", query.collection), e)
        })?;

        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(SharedError::Query(format!(
                "Expected an array of rows from {}, got {}",
                query.collection,
                kind_of(&other)
            ))),
        }
    }
}

#[async_trait]
impl RowSource for RestRowSource {
    async fn read_rows(&self, query: &RowQuery) -> Result<Vec<Value>> {
        let started = Instant::now();
        let result = self.fetch(query).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::record_datastore_query(&query.collection, outcome, started.elapsed());

        match &result {
            Ok(rows) => log::debug!("Read {} rows from {}", rows.len(), query.collection),
            Err(e) => log::error!("Read from {} failed: {}", query.collection, e),
        }
        result
    }
}

/// Renders a query as PostgREST query-string parameters.
pub fn query_params(query: &RowQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let select = if query.fields.is_empty() {
        "*".to_string()
    } else {
        query.fields.join(",")
    };
    params.push(("select".to_string(), select));

    for filter in &query.filters {
        let op = match filter.op {
            FilterOp::Eq => "eq",
        };
        params.push((filter.field.clone(), format!("{}.{}", op, render_value(&filter.value))));
    }

    if let Some(order) = &query.order {
        params.push((
            "order".to_string(),
            format!("{}.{}", order.field, order.direction.as_str()),
        ));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
