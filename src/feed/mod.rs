mod error;
mod file;
mod http;

pub use error::FeedError;
pub use file::FileFeed;
pub use http::HttpFeed;

use async_trait::async_trait;
use serde_json::Value;

use crate::tracking::{TelemetryRecord, TrackingError};

/// One entry of a batch. Entries that fail to decode are kept so the table
/// can count them as rejected.
pub type FeedItem = Result<TelemetryRecord, TrackingError>;

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError>;

    fn describe(&self) -> String;
}

pub fn parse_batch(content: &str) -> Result<Vec<FeedItem>, FeedError> {
    let document: Value = serde_json::from_str(content)?;
    parse_document(document)
}

/// Accepts `{"acList": [...]}` or a bare array of records.
pub fn parse_document(document: Value) -> Result<Vec<FeedItem>, FeedError> {
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("acList") {
            Some(Value::Array(records)) => records,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(FeedError::UnexpectedShape("acList is not an array")),
            None => return Err(FeedError::UnexpectedShape("missing acList")),
        },
        _ => return Err(FeedError::UnexpectedShape("expected object or array")),
    };

    Ok(records
        .into_iter()
        .map(|v| serde_json::from_value::<TelemetryRecord>(v).map_err(TrackingError::from))
        .collect())
}
