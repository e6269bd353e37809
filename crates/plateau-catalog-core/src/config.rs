//! Engine configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// City year label assumed when a city record has none.
pub const DEFAULT_CITY_YEAR: &str = "令和5年度";

/// Spec label assumed when a city record has none.
pub const DEFAULT_SPEC: &str = "第3.2版";

/// Location of the CMS that owns the records, used to build admin links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the CMS web UI
    pub url: String,
    /// Workspace id
    pub workspace: String,
}

impl CmsConfig {
    /// Builds the item link prefix of one model:
    /// `<url>/workspace/<ws>/project/<project>/content/<model>/details/`.
    #[must_use]
    pub fn item_url_prefix(&self, project: &str, model: &str) -> Option<String> {
        if project.is_empty() || model.is_empty() {
            return None;
        }
        Some(format!(
            "{}/workspace/{}/project/{project}/content/{model}/details/",
            self.url.trim_end_matches('/'),
            self.workspace
        ))
    }
}

/// Configuration shared by every tenant.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Minimum time between two successful refreshes of a tenant.
    pub min_update_interval: Duration,
    pub cms: Option<CmsConfig>,
    pub default_city_year: String,
    pub default_spec: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            min_update_interval: Duration::from_secs(10),
            cms: None,
            default_city_year: DEFAULT_CITY_YEAR.to_string(),
            default_spec: DEFAULT_SPEC.to_string(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn with_min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }

    #[must_use]
    pub fn with_cms(mut self, cms: CmsConfig) -> Self {
        self.cms = Some(cms);
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the CMS URL is not an absolute URL, the CMS
    /// workspace is empty, or a default label is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cms) = &self.cms {
            if cms.url.is_empty() {
                return Err(ConfigError::MissingRequired {
                    option: "cms.url".to_string(),
                });
            }
            Url::parse(&cms.url).map_err(|e| ConfigError::InvalidOption {
                option: "cms.url".to_string(),
                message: e.to_string(),
            })?;
            if cms.workspace.is_empty() {
                return Err(ConfigError::MissingRequired {
                    option: "cms.workspace".to_string(),
                });
            }
        }

        if self.default_city_year.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "default_city_year".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.default_spec.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "default_spec".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
