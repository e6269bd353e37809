//! In-memory repository over one converted snapshot.
//!
//! A [`Snapshot`] is immutable once built. Refreshing a tenant builds a new
//! snapshot and swaps the repository pointer, so queries never observe a
//! partially converted catalog.

mod filter;

use async_trait::async_trait;
use plateau_catalog_common::{
    Area, AreaCode, AreasInput, Areas, CityGmlDataset, Dataset, DatasetType, DatasetTypes,
    DatasetTypesInput, Datasets, DatasetsInput, Id, IdType, Node, PlateauSpec, QueryContext, Repo,
    RepoResult, is_stage_allowed,
};

pub use filter::{filter_areas, filter_dataset_types, filter_datasets, spec_matches};

/// The converted catalog of one tenant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Tenant name.
    pub name: String,
    pub areas: Areas,
    pub dataset_types: DatasetTypes,
    pub datasets: Datasets,
    pub plateau_specs: Vec<PlateauSpec>,
    /// Sorted distinct data years.
    pub years: Vec<i32>,
    pub citygml: Vec<CityGmlDataset>,
}

/// A [`Repo`] answering from a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepo {
    snapshot: Snapshot,
}

impl InMemoryRepo {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn dataset(&self, ctx: &QueryContext, id: &Id) -> Option<Dataset> {
        self.snapshot
            .datasets
            .get(id)
            .filter(|d| is_stage_allowed(d.admin(), &ctx.allowed_stages))
            .map(|d| redact(ctx, d.clone()))
    }

    fn citygml(&self, ctx: &QueryContext, id: &Id) -> Option<CityGmlDataset> {
        self.snapshot
            .citygml
            .iter()
            .find(|c| &c.id == id)
            .filter(|c| is_stage_allowed(c.admin.as_ref(), &ctx.allowed_stages))
            .map(|c| {
                if ctx.bypass_admin_removal {
                    c.clone()
                } else {
                    c.clone().without_admin()
                }
            })
    }

    fn plateau_spec(&self, id: &Id) -> Option<Node> {
        let specs = &self.snapshot.plateau_specs;
        if let Some(spec) = specs.iter().find(|s| &s.id == id) {
            return Some(Node::PlateauSpec(spec.clone()));
        }
        specs
            .iter()
            .flat_map(|s| &s.minor_versions)
            .find(|m| &m.id == id)
            .map(|m| Node::PlateauSpecMinor(m.clone()))
    }
}

/// Strips the admin blob unless the caller bypasses redaction.
pub(crate) fn redact(ctx: &QueryContext, dataset: Dataset) -> Dataset {
    if ctx.bypass_admin_removal {
        dataset
    } else {
        dataset.without_admin()
    }
}

#[async_trait]
impl Repo for InMemoryRepo {
    fn name(&self) -> String {
        if self.snapshot.name.is_empty() {
            "inmemory".to_string()
        } else {
            format!("inmemory({})", self.snapshot.name)
        }
    }

    async fn node(&self, ctx: &QueryContext, id: &Id) -> RepoResult<Option<Node>> {
        let Some(ty) = id.id_type() else {
            return Ok(None);
        };

        let node = match ty {
            IdType::Prefecture | IdType::City | IdType::Ward => {
                self.snapshot.areas.get(id).cloned().map(Node::Area)
            },
            IdType::DatasetType => self
                .snapshot
                .dataset_types
                .get(id)
                .cloned()
                .map(Node::DatasetType),
            IdType::Dataset => self.dataset(ctx, id).map(Node::Dataset),
            IdType::DatasetItem => self
                .snapshot
                .datasets
                .all()
                .filter(|d| is_stage_allowed(d.admin(), &ctx.allowed_stages))
                .find_map(|d| d.item(id))
                .map(Node::DatasetItem),
            IdType::PlateauSpec => self.plateau_spec(id),
            IdType::CityGml => self.citygml(ctx, id).map(Node::CityGml),
        };

        Ok(node)
    }

    async fn area(&self, _ctx: &QueryContext, code: &AreaCode) -> RepoResult<Option<Area>> {
        Ok(self.snapshot.areas.find_by_code(code).cloned())
    }

    async fn areas(&self, ctx: &QueryContext, input: &AreasInput) -> RepoResult<Vec<Area>> {
        Ok(filter_areas(&self.snapshot, ctx, input))
    }

    async fn dataset_types(
        &self,
        _ctx: &QueryContext,
        input: &DatasetTypesInput,
    ) -> RepoResult<Vec<DatasetType>> {
        Ok(filter_dataset_types(&self.snapshot.dataset_types, input))
    }

    async fn datasets(&self, ctx: &QueryContext, input: &DatasetsInput) -> RepoResult<Vec<Dataset>> {
        Ok(filter_datasets(&self.snapshot.datasets, ctx, input))
    }

    async fn plateau_specs(&self, _ctx: &QueryContext) -> RepoResult<Vec<PlateauSpec>> {
        Ok(self.snapshot.plateau_specs.clone())
    }

    async fn years(&self, _ctx: &QueryContext) -> RepoResult<Vec<i32>> {
        Ok(self.snapshot.years.clone())
    }
}
