mod basic;
pub mod auth;

pub use basic::BasicClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// Executes one prepared request. API clients are generic over this so the
/// `appid` wrapper can sit in front of the network client, and tests can
/// answer without a network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

/// Issues a GET for `url` with `query` appended and decodes a JSON body.
///
/// Any status outside 2xx is a [`FetchError::Status`].
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn fetch_json<C, T>(client: &C, url: &str, query: &[(&str, String)]) -> Result<T, FetchError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let mut parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !query.is_empty() {
        parsed
            .query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }

    let req = reqwest::Request::new(reqwest::Method::GET, parsed);
    let resp = client
        .execute(req)
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = resp.bytes().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;
    debug!(bytes = bytes.len(), "Response body received");

    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::CannedClient;
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_fetch_json_appends_query() {
        let client = CannedClient::new(200, "[]");
        let _: Value = fetch_json(
            &client,
            "https://example.test/v1/data",
            &[("q", "Batu Pahat, Johor".to_string()), ("limit", "1".to_string())],
        )
        .await
        .unwrap();

        let url = client.last_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Batu Pahat, Johor".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_json_non_success_status() {
        let client = CannedClient::new(429, "slow down");
        let result: Result<Value, _> = fetch_json(&client, "https://example.test/", &[]).await;
        match result {
            Err(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 429),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_json_decode_error() {
        let client = CannedClient::new(200, "<html>");
        let result: Result<Value, _> = fetch_json(&client, "https://example.test/", &[]).await;
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_url() {
        let client = CannedClient::new(200, "{}");
        let result: Result<Value, _> = fetch_json(&client, "not a url", &[]).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
