mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::debug;

use crate::error::FetchError;

/// Issues a GET for `url` and returns the body of a 2xx response.
///
/// Non-success statuses become [`FetchError::Status`]; the body is not read.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(status = status.as_u16(), "Response received");

    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(resp.bytes().await?.to_vec())
}


#[cfg(test)]
mod tests {
    use super::testing::{Canned, FakeClient};
    use super::*;

    #[tokio::test]
    async fn test_fetch_bytes_returns_body_on_success() {
        let client = FakeClient::default().route("ok", Canned::Body(200, "[1]".into()));
        let bytes = fetch_bytes(&client, "http://example.test/ok").await.unwrap();
        assert_eq!(bytes, b"[1]");
    }

    #[tokio::test]
    async fn test_fetch_bytes_maps_status() {
        let client = FakeClient::default().route("gone", Canned::Body(404, "nope".into()));
        let err = fetch_bytes(&client, "http://example.test/gone").await.unwrap_err();
        assert_eq!(err, FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_fetch_bytes_maps_transport_failure() {
        let client = FakeClient::default();
        let err = fetch_bytes(&client, "http://example.test/down").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_bad_url() {
        let client = FakeClient::default();
        let err = fetch_bytes(&client, "::not-a-url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
