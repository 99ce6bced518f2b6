use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiKey;
use crate::error::SubdlError;
use crate::query::{encode_params, SearchRequest};
use crate::response;

pub const SEARCH_ENDPOINT: &str = "https://api.subdl.com/api/v1/subtitles";
pub const DOWNLOAD_BASE: &str = "https://dl.subdl.com";

/// Transport seam: one call in, one body out. Parsing stays on the caller's
/// side so fakes only have to hand back JSON.
#[async_trait]
pub trait SubdlApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<String, SubdlError>;
    async fn fetch_file(&self, relative_url: &str) -> Result<Vec<u8>, SubdlError>;
    /// Request URL without the credential, for messages and logs.
    fn describe(&self, request: &SearchRequest) -> String;
}

#[derive(Debug, Clone)]
pub struct SubdlClient {
    client: Client,
    api_key: ApiKey,
}

impl SubdlClient {
    pub fn new(api_key: ApiKey) -> Result<Self, SubdlError> {
        let user_agent = format!("subgrab/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .user_agent(user_agent)
            .build()
            .map_err(|source| SubdlError::Transport {
                url: SEARCH_ENDPOINT.to_string(),
                source,
            })?;
        Ok(Self { client, api_key })
    }

    pub fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{SEARCH_ENDPOINT}?{}",
            request.to_query_string(&self.api_key)
        )
    }

    async fn send(&self, url: &str, shown_url: &str) -> Result<reqwest::Response, SubdlError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| SubdlError::Transport {
                url: shown_url.to_string(),
                source,
            })
    }
}

pub fn download_url(relative_url: &str) -> String {
    format!("{DOWNLOAD_BASE}/{}", relative_url.trim_start_matches('/'))
}

/// Same parameters as the real request, with the key masked.
pub fn redacted_url(request: &SearchRequest) -> String {
    let params = request.to_params(&ApiKey::new(""));
    let rest = encode_params(&params[1..]);
    if rest.is_empty() {
        format!("{SEARCH_ENDPOINT}?api_key=***")
    } else {
        format!("{SEARCH_ENDPOINT}?api_key=***&{rest}")
    }
}

#[async_trait]
impl SubdlApi for SubdlClient {
    async fn search(&self, request: &SearchRequest) -> Result<String, SubdlError> {
        let shown = redacted_url(request);
        debug!("GET {}", shown);
        let res = self.send(&self.search_url(request), &shown).await?;
        let status = res.status();
        let text = res.text().await.map_err(|source| SubdlError::Transport {
            url: shown.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(response::api_failure(&text)
                .unwrap_or_else(|| SubdlError::http(status.as_u16(), &text)));
        }
        Ok(text)
    }

    async fn fetch_file(&self, relative_url: &str) -> Result<Vec<u8>, SubdlError> {
        let url = download_url(relative_url);
        debug!("GET {}", url);
        let res = self.send(&url, &url).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .map_err(|source| SubdlError::Transport {
                    url: url.clone(),
                    source,
                })?;
            return Err(SubdlError::http(status.as_u16(), &body));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|source| SubdlError::Transport { url, source })?;
        Ok(bytes.to_vec())
    }

    fn describe(&self, request: &SearchRequest) -> String {
        redacted_url(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{CatalogId, MediaKind};

    #[test]
    fn search_url_puts_key_first() {
        let client = SubdlClient::new(ApiKey::new("k3y")).unwrap();
        let url = client.search_url(&SearchRequest::releases("The.Matrix.1999.mkv", MediaKind::Movie));
        assert_eq!(
            url,
            "https://api.subdl.com/api/v1/subtitles?api_key=k3y&file_name=The.Matrix.1999.mkv&type=movie&languages=EN&subs_per_page=0&hi=0"
        );
    }

    #[test]
    fn redacted_url_masks_the_key() {
        let url = redacted_url(&SearchRequest::movie_subtitles(CatalogId(5)));
        assert!(url.starts_with("https://api.subdl.com/api/v1/subtitles?api_key=***&sd_id=5"));
    }

    #[test]
    fn download_url_joins_without_double_slash() {
        assert_eq!(
            download_url("/subtitle/1-2.zip"),
            "https://dl.subdl.com/subtitle/1-2.zip"
        );
        assert_eq!(
            download_url("subtitle/1-2.zip"),
            "https://dl.subdl.com/subtitle/1-2.zip"
        );
    }
}
