use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{parse_document, FeedError, FeedItem, FeedSource};

pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
        let document: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_document(document)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn serve() -> String {
        let app = Router::new()
            .route(
                "/aircraft",
                get(|| async { r#"{"acList": [{"Id": 8008, "Call": "VIV100"}, {"Id": ""}]}"# }),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetches_aclist() {
        let base = serve().await;
        let feed = HttpFeed::new(format!("{}/aircraft", base), Duration::from_secs(5)).unwrap();

        let items = feed.fetch().await.unwrap();
        assert_eq!(items.len(), 2);
        let first = items[0].as_ref().unwrap();
        assert_eq!(first.callsign.as_deref(), Some("VIV100"));
        assert!(items[1].as_ref().unwrap().aircraft_id().is_none());
        assert!(feed.describe().ends_with("/aircraft"));
    }

    #[tokio::test]
    async fn test_server_error_is_http_error() {
        let base = serve().await;
        let feed = HttpFeed::new(format!("{}/broken", base), Duration::from_secs(5)).unwrap();

        match feed.fetch().await {
            Err(FeedError::Http(e)) => assert_eq!(e.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
            other => panic!("expected an HTTP error, got {:?}", other.map(|items| items.len())),
        }
    }
}
