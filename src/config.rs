use std::{net::SocketAddr, path::Path, time::Duration};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parsing config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid URL for '{field}': {source}")]
    Url {
        field: &'static str,
        source: url::ParseError,
    },
    #[error("'{0}' has no host")]
    MissingHost(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen: SocketAddr,
    pub api_base: String,
    pub asset_base: String,
    pub profile_base: String,
    /// Prefix of a CORS relay, the percent-encoded upstream URL is appended to it
    pub proxy: Option<String>,
    pub relay_hosts: Vec<String>,
    pub collectibles_limit: u32,
    pub max_pages: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_base: "https://cartii.fit/apisite".to_string(),
            asset_base: "https://cartii.fit".to_string(),
            profile_base: "https://qnet.zip".to_string(),
            proxy: None,
            relay_hosts: Vec::new(),
            collectibles_limit: 100,
            max_pages: 50,
            timeout_secs: 15,
        }
    }
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to null, which should just mean "all defaults"
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("api_base", self.api_base.as_str()),
            ("asset_base", self.asset_base.as_str()),
            ("profile_base", self.profile_base.as_str()),
        ];
        for (field, raw) in fields {
            let parsed = url::Url::parse(raw).map_err(|source| ConfigError::Url { field, source })?;
            if parsed.host_str().is_none() {
                return Err(ConfigError::MissingHost(field));
            }
        }

        if let Some(proxy) = self.proxy.as_deref() {
            url::Url::parse(proxy).map_err(|source| ConfigError::Url {
                field: "proxy",
                source,
            })?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The hosts the relay endpoint is allowed to fetch from.
    pub fn allowed_relay_hosts(&self) -> Vec<String> {
        if !self.relay_hosts.is_empty() {
            return self.relay_hosts.clone();
        }

        url::Url::parse(&self.api_base)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .into_iter()
            .collect()
    }

    pub fn profile_link(&self, user_id: &str) -> String {
        let mut link = trim_base(&self.profile_base).to_string();
        link.push_str("/users/");
        link.extend(url::form_urlencoded::byte_serialize(user_id.as_bytes()));
        link.push_str("/profile");
        link
    }

    /// Resolves a possibly host-relative asset URL against the asset host.
    pub fn absolute_asset_url(&self, raw: &str) -> String {
        if raw.starts_with('/') {
            format!("{}{}", trim_base(&self.asset_base), raw)
        } else {
            raw.to_string()
        }
    }
}

pub(crate) fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
