//! Loading raw records of a tenant.
//!
//! The engine does not talk to the CMS itself. A [`Fetcher`] hands out the
//! JSON items of one model and [`fetch_all`] loads every model a snapshot
//! needs.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::feature_types::FeatureTypes;
use crate::record::{
    CITY_MODEL, GENERIC_MODEL, GEOSPATIALJP_DATA_MODEL, RELATED_MODEL, RawRecords, SAMPLE_MODEL,
    model_key,
};

/// Source of raw CMS records.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns every item of a model (`plateau-city`, `plateau-bldg`...).
    async fn fetch_items(&self, project: &str, model: &str) -> Result<Vec<Value>, FetchError>;
}

/// Model keys loaded for a snapshot, city records first.
#[must_use]
pub fn model_keys(feature_types: &FeatureTypes) -> Vec<String> {
    [CITY_MODEL]
        .into_iter()
        .chain(feature_types.plateau_codes())
        .chain([RELATED_MODEL, GENERIC_MODEL, SAMPLE_MODEL, GEOSPATIALJP_DATA_MODEL])
        .map(model_key)
        .collect()
}

/// Fetches every model of a tenant concurrently.
///
/// # Errors
///
/// Fails with the first [`FetchError`]; nothing is returned for the other models.
pub async fn fetch_all(
    fetcher: &dyn Fetcher,
    project: &str,
    feature_types: &FeatureTypes,
) -> Result<RawRecords, FetchError> {
    let keys = model_keys(feature_types);
    let items = try_join_all(keys.iter().map(|key| fetcher.fetch_items(project, key))).await?;

    let records: RawRecords = keys.into_iter().zip(items).collect();
    debug!(
        "fetched {project}: {} items in {} models",
        records.values().map(Vec::len).sum::<usize>(),
        records.len()
    );
    Ok(records)
}

/// A record dump of one tenant.
///
/// ```json
/// { "project": "prj", "year": 2023, "models": { "plateau-city": [ ... ] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dump {
    pub project: String,
    pub year: i32,
    #[serde(default)]
    pub models: RawRecords,
}

/// A [`Fetcher`] serving records held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    projects: HashMap<String, RawRecords>,
}

impl StaticFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the records of a project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>, records: RawRecords) -> Self {
        self.projects.insert(project.into(), records);
        self
    }

    /// Adds the records of a dump.
    #[must_use]
    pub fn with_dump(self, dump: Dump) -> Self {
        self.with_project(dump.project, dump.models)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_items(&self, project: &str, model: &str) -> Result<Vec<Value>, FetchError> {
        let records = self
            .projects
            .get(project)
            .ok_or_else(|| FetchError::UnknownProject {
                project: project.to_string(),
            })?;
        Ok(records.get(model).cloned().unwrap_or_default())
    }
}
