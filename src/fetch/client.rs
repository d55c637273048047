use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. The seam tests replace with a canned responder.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
