use crate::fetch::HttpClient;
use async_trait::async_trait;

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
///
/// The OpenWeather geocoding API expects its key as `appid=<key>`.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    pub fn appid(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "appid".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::CannedClient;

    #[tokio::test]
    async fn test_appid_appended() {
        let client = UrlParam::appid(CannedClient::new(200, "[]"), "secret".to_string());
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            reqwest::Url::parse("http://example.test/geo?q=x").unwrap(),
        );
        client.execute(req).await.unwrap();

        let url = client.inner.last_url();
        assert_eq!(url.query(), Some("q=x&appid=secret"));
    }
}
