//! Per-tenant repositories with throttled refresh.
//!
//! Every tenant owns its refresh lock and the timestamp of its last
//! successful refresh. Readers load the published state without locking;
//! a refresh builds a complete snapshot first and swaps it in at once.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::{debug, info, warn};
use parking_lot::RwLock;
use plateau_catalog_common::Repo;
use tokio::sync::Mutex;

use crate::config::CatalogConfig;
use crate::convert::convert;
use crate::error::{Result, TenantError};
use crate::feature_types::{get_feature_types, get_plateau_specs};
use crate::fetch::{Fetcher, fetch_all};
use crate::inmemory::InMemoryRepo;
use crate::merge::Merger;
use crate::record::AllData;

/// State published by a successful refresh.
#[derive(Debug)]
pub struct TenantState {
    pub repo: Arc<InMemoryRepo>,
    /// Conversion warnings, sorted.
    pub warnings: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// One project and its current snapshot.
pub struct Tenant {
    project: String,
    year: i32,
    fetcher: Arc<dyn Fetcher>,
    state: ArcSwapOption<TenantState>,
    lock: Mutex<()>,
}

impl Tenant {
    #[must_use]
    pub fn new(project: impl Into<String>, year: i32, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            project: project.into(),
            year,
            fetcher,
            state: ArcSwapOption::empty(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The published state, if any refresh succeeded yet.
    #[must_use]
    pub fn state(&self) -> Option<Arc<TenantState>> {
        self.state.load_full()
    }

    /// Refreshes the snapshot.
    ///
    /// Returns `Ok(false)` when the last successful refresh is more recent than
    /// the minimum update interval. Concurrent calls are serialized.
    ///
    /// # Errors
    ///
    /// Returns a fetch error; the previous snapshot stays published.
    pub async fn update(&self, config: &CatalogConfig) -> Result<bool> {
        let _guard = self.lock.lock().await;

        if let Some(state) = self.state.load_full() {
            let elapsed = Utc::now() - state.updated_at;
            if elapsed
                .to_std()
                .is_ok_and(|elapsed| elapsed < config.min_update_interval)
            {
                debug!("{}: updated {}s ago, skipping", self.project, elapsed.num_seconds());
                return Ok(false);
            }
        }

        info!("{}: updating snapshot of {}", self.project, self.year);

        let feature_types = get_feature_types();
        let raw = fetch_all(self.fetcher.as_ref(), &self.project, &feature_types).await?;
        let all = AllData::new(&self.project, self.year, feature_types, get_plateau_specs())
            .decode(&raw, config);
        let (snapshot, mut warnings) = convert(&all, config.cms.as_ref());
        warnings.sort();

        if !warnings.is_empty() {
            warn!("{}: {} warnings", self.project, warnings.len());
        }
        info!(
            "{}: {} areas, {} datasets",
            self.project,
            snapshot.areas.len(),
            snapshot.datasets.len()
        );

        self.state.store(Some(Arc::new(TenantState {
            repo: Arc::new(InMemoryRepo::new(snapshot)),
            warnings,
            updated_at: Utc::now(),
        })));
        Ok(true)
    }
}

impl std::fmt::Debug for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenant")
            .field("project", &self.project)
            .field("year", &self.year)
            .field("loaded", &self.state.load().is_some())
            .finish_non_exhaustive()
    }
}

/// The tenant registry.
#[derive(Debug)]
pub struct Repos {
    config: CatalogConfig,
    tenants: RwLock<HashMap<String, Arc<Tenant>>>,
}

impl Repos {
    /// Creates an empty registry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tenants: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Registers a project and loads its first snapshot.
    /// A project that is already registered is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the error of the first load. The project stays registered
    /// without a snapshot and can be updated later.
    pub async fn prepare(&self, project: &str, year: i32, fetcher: Arc<dyn Fetcher>) -> Result<()> {
        let tenant = {
            let mut tenants = self.tenants.write();
            if tenants.contains_key(project) {
                debug!("{project}: already prepared");
                return Ok(());
            }
            let tenant = Arc::new(Tenant::new(project, year, fetcher));
            tenants.insert(project.to_string(), Arc::clone(&tenant));
            tenant
        };

        tenant.update(&self.config).await?;
        Ok(())
    }

    fn tenant(&self, project: &str) -> Result<Arc<Tenant>> {
        self.tenants
            .read()
            .get(project)
            .cloned()
            .ok_or_else(|| {
                TenantError::NotFound {
                    project: project.to_string(),
                }
                .into()
            })
    }

    /// Refreshes one project. See [`Tenant::update`].
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::NotFound`] for unknown projects, or the refresh error.
    pub async fn update(&self, project: &str) -> Result<bool> {
        self.tenant(project)?.update(&self.config).await
    }

    /// Refreshes every project concurrently and stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first refresh error.
    pub async fn update_all(&self) -> Result<()> {
        let tenants: Vec<Arc<Tenant>> = self.tenants.read().values().cloned().collect();
        try_join_all(tenants.iter().map(|t| t.update(&self.config))).await?;
        Ok(())
    }

    /// Registered projects, sorted.
    #[must_use]
    pub fn projects(&self) -> Vec<String> {
        let mut projects: Vec<String> = self.tenants.read().keys().cloned().collect();
        projects.sort();
        projects
    }

    fn state(&self, project: &str) -> Option<Arc<TenantState>> {
        self.tenants.read().get(project)?.state()
    }

    /// Sorted warnings of the last successful refresh.
    #[must_use]
    pub fn warnings(&self, project: &str) -> Vec<String> {
        self.state(project)
            .map(|s| s.warnings.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn updated_at(&self, project: &str) -> Option<DateTime<Utc>> {
        self.state(project).map(|s| s.updated_at)
    }

    #[must_use]
    pub fn repo(&self, project: &str) -> Option<Arc<InMemoryRepo>> {
        self.state(project).map(|s| Arc::clone(&s.repo))
    }

    /// A repository answering for several projects.
    ///
    /// No projects give `None` and a single project gives its own repository.
    /// Several projects are fronted by an initialized [`Merger`].
    ///
    /// # Errors
    ///
    /// Returns a tenant error if a project is unknown or has no snapshot yet,
    /// or the error of [`Merger::init`].
    pub async fn merged(&self, projects: &[&str]) -> Result<Option<Arc<dyn Repo>>> {
        let mut repos: Vec<Arc<dyn Repo>> = Vec::with_capacity(projects.len());
        for project in projects {
            self.tenant(project)?;
            let repo = self.repo(project).ok_or_else(|| TenantError::NotLoaded {
                project: (*project).to_string(),
            })?;
            repos.push(repo);
        }

        match repos.len() {
            0 => Ok(None),
            1 => Ok(repos.pop()),
            _ => {
                let merger = Merger::new(repos);
                merger.init().await?;
                Ok(Some(Arc::new(merger)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use plateau_catalog_common::{AreasInput, DatasetsInput, QueryContext};
    use tokio::sync::Notify;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use crate::error::{CatalogError, FetchError};
    use crate::fetch::StaticFetcher;
    use crate::record::RawRecords;

    fn records(city_code: &str) -> RawRecords {
        let mut raw = RawRecords::new();
        raw.insert(
            "plateau-city".to_string(),
            vec![json!({
                "id": "city1",
                "prefecture": "PREF",
                "city_name": "CITY",
                "city_code": city_code,
                "city_public": true,
                "bldg_public": true
            })],
        );
        raw
    }

    fn fetcher() -> Arc<dyn Fetcher> {
        Arc::new(
            StaticFetcher::new()
                .with_project("a", records("00001"))
                .with_project("b", records("00002")),
        )
    }

    struct Broken;

    #[async_trait]
    impl Fetcher for Broken {
        async fn fetch_items(&self, project: &str, model: &str) -> std::result::Result<Vec<Value>, FetchError> {
            Err(FetchError::Model {
                project: project.to_string(),
                model: model.to_string(),
                message: "down".to_string(),
            })
        }
    }

    /// Serves project `a`, counting city fetches. Can be switched to fail,
    /// or to hold the city fetch until released.
    struct Scripted {
        inner: StaticFetcher,
        city_fetches: AtomicUsize,
        fail: AtomicBool,
        hold: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl Scripted {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: StaticFetcher::new().with_project("a", records("00001")),
                city_fetches: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                hold: AtomicBool::new(false),
                entered: Notify::new(),
                release: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl Fetcher for Scripted {
        async fn fetch_items(&self, project: &str, model: &str) -> std::result::Result<Vec<Value>, FetchError> {
            if model == "plateau-city" {
                self.city_fetches.fetch_add(1, Ordering::SeqCst);
                if self.hold.load(Ordering::SeqCst) {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::Model {
                    project: project.to_string(),
                    model: model.to_string(),
                    message: "down".to_string(),
                });
            }
            self.inner.fetch_items(project, model).await
        }
    }

    async fn area_count(state: &TenantState) -> anyhow::Result<usize> {
        let areas = state
            .repo
            .areas(&QueryContext::public(), &AreasInput::default())
            .await?;
        Ok(areas.len())
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() -> anyhow::Result<()> {
        let config = CatalogConfig::default();
        let fetcher = Scripted::new();
        let tenant = Tenant::new("a", 2023, fetcher.clone());

        let (first, second) = tokio::join!(tenant.update(&config), tenant.update(&config));
        assert!(first?);
        assert!(!second?);
        assert_eq!(fetcher.city_fetches.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() -> anyhow::Result<()> {
        let config = CatalogConfig::default().with_min_update_interval(Duration::ZERO);
        let fetcher = Scripted::new();
        let tenant = Tenant::new("a", 2023, fetcher.clone());
        assert!(tenant.update(&config).await?);
        let Some(before) = tenant.state() else {
            anyhow::bail!("no state after first update");
        };
        let areas = area_count(&before).await?;
        assert!(areas > 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        fetcher.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            tenant.update(&config).await,
            Err(CatalogError::Fetch(FetchError::Model { .. }))
        ));

        let Some(after) = tenant.state() else {
            anyhow::bail!("state dropped by failed refresh");
        };
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(area_count(&after).await?, areas);
        Ok(())
    }

    #[tokio::test]
    async fn test_readers_see_old_state_during_refresh() -> anyhow::Result<()> {
        let config = CatalogConfig::default().with_min_update_interval(Duration::ZERO);
        let fetcher = Scripted::new();
        let tenant = Tenant::new("a", 2023, fetcher.clone());
        assert!(tenant.update(&config).await?);
        let Some(before) = tenant.state() else {
            anyhow::bail!("no state after first update");
        };

        tokio::time::sleep(Duration::from_millis(5)).await;
        fetcher.hold.store(true, Ordering::SeqCst);
        let reader = async {
            fetcher.entered.notified().await;
            let during = tenant.state();
            fetcher.release.notify_one();
            during
        };
        let (updated, during) = tokio::join!(tenant.update(&config), reader);

        assert!(updated?);
        assert!(during.is_some_and(|s| Arc::ptr_eq(&s, &before)));
        let Some(after) = tenant.state() else {
            anyhow::bail!("no state after refresh");
        };
        assert!(!Arc::ptr_eq(&after, &before));
        assert!(after.updated_at > before.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_and_throttle() -> anyhow::Result<()> {
        let repos = Repos::new(CatalogConfig::default())?;
        repos.prepare("a", 2023, fetcher()).await?;

        assert_eq!(repos.projects(), vec!["a"]);
        assert!(repos.warnings("a").is_empty());
        let first = repos.updated_at("a");
        assert!(first.is_some());

        // within the default interval
        assert!(!repos.update("a").await?);
        assert_eq!(repos.updated_at("a"), first);

        let Some(repo) = repos.repo("a") else {
            anyhow::bail!("no repo");
        };
        assert_eq!(repo.name(), "inmemory(a)");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_after_interval() -> anyhow::Result<()> {
        let config = CatalogConfig::default().with_min_update_interval(Duration::ZERO);
        let repos = Repos::new(config)?;
        repos.prepare("a", 2023, fetcher()).await?;
        let first = repos.updated_at("a");

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(repos.update("a").await?);
        assert!(repos.updated_at("a") > first);

        repos.update_all().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_and_failing_tenants() -> anyhow::Result<()> {
        let repos = Repos::new(CatalogConfig::default())?;
        assert!(matches!(
            repos.update("nope").await,
            Err(CatalogError::Tenant(TenantError::NotFound { .. }))
        ));

        let err = repos.prepare("x", 2023, Arc::new(Broken)).await;
        assert!(matches!(err, Err(CatalogError::Fetch(FetchError::Model { .. }))));
        assert_eq!(repos.projects(), vec!["x"]);
        assert!(repos.repo("x").is_none());
        assert!(matches!(
            repos.merged(&["x"]).await,
            Err(CatalogError::Tenant(TenantError::NotLoaded { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_merged() -> anyhow::Result<()> {
        let repos = Repos::new(CatalogConfig::default())?;
        let fetcher = fetcher();
        repos.prepare("a", 2023, Arc::clone(&fetcher)).await?;
        repos.prepare("b", 2023, fetcher).await?;

        assert!(repos.merged(&[]).await?.is_none());

        let Some(single) = repos.merged(&["a"]).await? else {
            anyhow::bail!("no repo");
        };
        assert_eq!(single.name(), "inmemory(a)");

        let Some(merged) = repos.merged(&["a", "b"]).await? else {
            anyhow::bail!("no repo");
        };
        assert_eq!(merged.name(), "merger(inmemory(a),inmemory(b))");
        let datasets = merged
            .datasets(&QueryContext::public(), &DatasetsInput::default())
            .await?;
        assert!(datasets.is_empty());
        Ok(())
    }
}
