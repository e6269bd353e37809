//! The read-only repository contract.

use async_trait::async_trait;

use crate::area::{Area, AreaCode};
use crate::dataset::Dataset;
use crate::dataset_type::DatasetType;
use crate::error::RepoResult;
use crate::id::Id;
use crate::node::Node;
use crate::query::{AreasInput, DatasetTypesInput, DatasetsInput, QueryContext};
use crate::spec::PlateauSpec;

/// Trait implemented by every catalog repository.
///
/// Implementations are queried concurrently and must not block. Visibility is
/// controlled by the [`QueryContext`] passed to each call.
#[async_trait]
pub trait Repo: Send + Sync {
    /// Human-readable name used in logs and wrapped errors.
    fn name(&self) -> String;

    /// Resolves any node by id. Unknown ids resolve to `None`.
    async fn node(&self, ctx: &QueryContext, id: &Id) -> RepoResult<Option<Node>>;

    /// Resolves several ids; the result has one entry per id, in order.
    async fn nodes(&self, ctx: &QueryContext, ids: &[Id]) -> RepoResult<Vec<Option<Node>>> {
        let mut res = Vec::with_capacity(ids.len());
        for id in ids {
            res.push(self.node(ctx, id).await?);
        }
        Ok(res)
    }

    async fn area(&self, ctx: &QueryContext, code: &AreaCode) -> RepoResult<Option<Area>>;

    async fn areas(&self, ctx: &QueryContext, input: &AreasInput) -> RepoResult<Vec<Area>>;

    async fn dataset_types(
        &self,
        ctx: &QueryContext,
        input: &DatasetTypesInput,
    ) -> RepoResult<Vec<DatasetType>>;

    async fn datasets(&self, ctx: &QueryContext, input: &DatasetsInput) -> RepoResult<Vec<Dataset>>;

    async fn plateau_specs(&self, ctx: &QueryContext) -> RepoResult<Vec<PlateauSpec>>;

    /// Sorted distinct data years.
    async fn years(&self, ctx: &QueryContext) -> RepoResult<Vec<i32>>;
}
