use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{Result, SharedError};

/// Sort direction for a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// A single read against one collection of the data store.
///
/// Filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    pub collection: String,
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl RowQuery {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            fields: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op: FilterOp::Eq,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read access to the hosted data store.
///
/// Rows come back loosely typed; [`read_typed`] turns them into records.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn read_rows(&self, query: &RowQuery) -> Result<Vec<Value>>;
}

/// Decodes raw rows into `T`, failing the whole read on the first row that
/// does not fit.
pub fn decode_rows<T: DeserializeOwned>(collection: &str, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|e| {
                SharedError::query(&format!("Malformed row {} in {}", index, collection), e)
            })
        })
        .collect()
}

/// Runs `query` and decodes the result into records.
pub async fn read_typed<T: DeserializeOwned>(
    source: &dyn RowSource,
    query: &RowQuery,
) -> Result<Vec<T>> {
    let rows = source.read_rows(query).await?;
    decode_rows(&query.collection, rows)
}
