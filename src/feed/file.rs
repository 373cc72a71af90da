use async_trait::async_trait;
use std::path::PathBuf;

use super::{parse_batch, FeedError, FeedItem, FeedSource};

pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_batch(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
