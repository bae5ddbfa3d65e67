use serde::de::DeserializeOwned;

use crate::Config;

mod data;
pub use data::{
    AvatarThumbnails, Collectible, CollectiblesResponse, PagedResponse, StatusData, Thumbnail,
    UserInfo, UserStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Sending request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Non success status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Deserializing response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("'{0}' cannot be used as a base URL")]
    CannotBeABase(String),
    #[error("'{0}' is not a usable path segment")]
    InvalidSegment(String),
}

/// Ids the upstream URLs can be built from. `.` and `..` would be collapsed
/// into a different endpoint.
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty() && user_id != "." && user_id != ".."
}

/// What came back from a relayed request, passed through as-is.
#[derive(Debug)]
pub struct RelayResponse {
    pub status: reqwest::StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub struct Client {
    req_client: reqwest::Client,
    /// Never follows redirects, the relay only checks the host it was asked for
    relay_client: reqwest::Client,
    api_base: url::Url,
    proxy: Option<String>,
    collectibles_limit: u32,
    max_pages: usize,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let api_base = url::Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(config.api_base.clone()));
        }

        let req_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("rapview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let relay_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("rapview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            req_client,
            relay_client,
            api_base,
            proxy: config.proxy.clone(),
            collectibles_limit: config.collectibles_limit,
            max_pages: config.max_pages.max(1),
        })
    }

    /// Builds an upstream URL below the api base, every segment and query value is
    /// percent-encoded.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<url::Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| !is_valid_user_id(s)) {
            return Err(ApiError::InvalidSegment(bad.to_string()));
        }

        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::CannotBeABase(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// The URL that actually gets requested, wrapped into the relay if one is
    /// configured.
    pub fn request_url(&self, upstream: &url::Url) -> String {
        match self.proxy.as_deref() {
            Some(proxy) => {
                let mut wrapped = proxy.to_string();
                wrapped.extend(url::form_urlencoded::byte_serialize(
                    upstream.as_str().as_bytes(),
                ));
                wrapped
            }
            None => upstream.to_string(),
        }
    }

    async fn get_json<T>(&self, upstream: url::Url) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let target = self.request_url(&upstream);
        tracing::debug!(%upstream, "Sending Request");

        let resp = self
            .req_client
            .get(&target)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%upstream, ?status, "Non Success Response");
            return Err(ApiError::Status(status));
        }

        let raw_content = resp.bytes().await?;
        let content = serde_json::from_slice(&raw_content)?;

        Ok(content)
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_user(&self, user_id: &str) -> Result<UserInfo, ApiError> {
        let url = self.endpoint(&["users", "v1", "users", user_id], &[])?;
        self.get_json(url).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_status(&self, user_id: &str) -> Result<UserStatus, ApiError> {
        let url = self.endpoint(&["users", "v1", "users", user_id, "status"], &[])?;
        self.get_json(url).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_avatar(&self, user_id: &str) -> Result<AvatarThumbnails, ApiError> {
        let url = self.endpoint(
            &["thumbnails", "v1", "users", "avatar"],
            &[("userIds", user_id), ("size", "420x420"), ("format", "png")],
        )?;
        self.get_json(url).await
    }

    /// Loads every collectible of the user, following the page cursor until it runs
    /// out or `max_pages` pages have been loaded.
    #[tracing::instrument(skip(self))]
    pub async fn load_collectibles(&self, user_id: &str) -> Result<Vec<Collectible>, ApiError> {
        let limit = self.collectibles_limit.to_string();
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        for page_num in 0..self.max_pages {
            let url = {
                let mut query = vec![("limit", limit.as_str())];
                if let Some(cursor) = cursor.as_deref() {
                    query.push(("cursor", cursor));
                }

                self.endpoint(
                    &["inventory", "v1", "users", user_id, "assets", "collectibles"],
                    &query,
                )?
            };

            let page: CollectiblesResponse = self.get_json(url).await?;
            let data = page.data.unwrap_or_default();
            tracing::debug!(page_num, entries = data.len(), "Loaded Page");
            items.extend(data);

            match page.next_page_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(items),
            }
        }

        tracing::warn!(
            max_pages = self.max_pages,
            loaded = items.len(),
            "Stopped following Collectible pages"
        );
        Ok(items)
    }

    /// Fetches an arbitrary URL for the relay endpoint, non success statuses are not
    /// an error here. Redirects come back as they are instead of being followed.
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    pub async fn relay(&self, url: &url::Url) -> Result<RelayResponse, ApiError> {
        let resp = self.relay_client.get(url.as_str()).send().await?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();

        tracing::debug!(?status, len = body.len(), "Relayed");

        Ok(RelayResponse {
            status,
            content_type,
            body,
        })
    }
}
