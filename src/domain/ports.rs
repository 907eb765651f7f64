use crate::domain::model::{Post, RunReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A chat model that answers a prompt with a JSON document.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn complete_json(&self, prompt: &str) -> Result<serde_json::Value>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Unit of work selected during extraction, e.g. one feed entry or episode.
    type Candidate: Send;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Vec<Self::Candidate>>;
    async fn transform(&self, candidates: Vec<Self::Candidate>) -> Result<Vec<Post>>;
    async fn load(&self, posts: Vec<Post>) -> Result<RunReport>;
}
