//! Merged view over several repositories.
//!
//! Each tenant snapshot covers one registration year. The [`Merger`] answers
//! every query from all of them and keeps, per logical entity, the most
//! recent vintage.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use log::debug;
use plateau_catalog_common::{
    Area, AreaCode, AreasInput, Dataset, DatasetType, DatasetTypesInput, DatasetsInput, Id, Node,
    PlateauSpec, QueryContext, Repo, RepoResult,
};

/// An entity that can be reconciled across repositories.
trait Mergeable {
    /// Identity shared by every vintage of the entity.
    fn merge_key(&self) -> String;
    fn merge_id(&self) -> &Id;
    fn merge_year(&self) -> i32;
}

impl Mergeable for Area {
    fn merge_key(&self) -> String {
        self.id().to_string()
    }
    fn merge_id(&self) -> &Id {
        self.id()
    }
    fn merge_year(&self) -> i32 {
        0
    }
}

impl Mergeable for Dataset {
    fn merge_key(&self) -> String {
        self.vague_id().unwrap_or_else(|| self.id().to_string())
    }
    fn merge_id(&self) -> &Id {
        self.id()
    }
    fn merge_year(&self) -> i32 {
        self.year()
    }
}

impl Mergeable for DatasetType {
    fn merge_key(&self) -> String {
        self.id().to_string()
    }
    fn merge_id(&self) -> &Id {
        self.id()
    }
    fn merge_year(&self) -> i32 {
        self.year()
    }
}

impl Mergeable for PlateauSpec {
    fn merge_key(&self) -> String {
        self.id.to_string()
    }
    fn merge_id(&self) -> &Id {
        &self.id
    }
    fn merge_year(&self) -> i32 {
        self.year
    }
}

/// Groups by identity, keeps the most recent members of each group and
/// drops duplicate ids. The result is sorted by id, then by year descending.
fn merge_latest<T: Mergeable>(items: Vec<T>) -> Vec<T> {
    let mut groups: IndexMap<String, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(item.merge_key()).or_default().push(item);
    }

    let mut seen = HashSet::new();
    let mut res: Vec<T> = groups
        .into_values()
        .flat_map(|group| {
            let latest = group.iter().map(Mergeable::merge_year).max().unwrap_or_default();
            group.into_iter().filter(move |i| i.merge_year() == latest)
        })
        .filter(|i| seen.insert(i.merge_id().clone()))
        .collect();

    res.sort_by(|a, b| {
        a.merge_id()
            .cmp(b.merge_id())
            .then_with(|| b.merge_year().cmp(&a.merge_year()))
    });
    res
}

/// Keeps the most recent of several candidates; ties go to the first one.
fn pick_latest<T>(candidates: impl IntoIterator<Item = Option<T>>, year: impl Fn(&T) -> i32) -> Option<T> {
    candidates.into_iter().flatten().fold(None, |best, c| match best {
        Some(b) if year(&b) >= year(&c) => Some(b),
        _ => Some(c),
    })
}

/// A [`Repo`] fronting several repositories.
pub struct Merger {
    repos: Vec<Arc<dyn Repo>>,
    /// 1-based display position of each dataset type code.
    type_orders: ArcSwap<HashMap<String, i32>>,
}

impl Merger {
    #[must_use]
    pub fn new(repos: Vec<Arc<dyn Repo>>) -> Self {
        Self {
            repos,
            type_orders: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Precomputes the display order of dataset types across all repositories.
    ///
    /// # Errors
    ///
    /// Returns the first constituent error, wrapped with its name.
    pub async fn init(&self) -> RepoResult<()> {
        let ctx = QueryContext::admin(true, true);
        let mut types: Vec<DatasetType> = self
            .each(|r| {
                let ctx = ctx.clone();
                async move { r.dataset_types(&ctx, &DatasetTypesInput::default()).await }
            })
            .await?
            .into_iter()
            .flatten()
            .collect();

        types.sort_by(|a, b| {
            a.category()
                .cmp(&b.category())
                .then_with(|| a.order().cmp(&b.order()))
                .then_with(|| a.code().cmp(b.code()))
        });

        let mut orders = HashMap::new();
        for t in &types {
            let next = i32::try_from(orders.len() + 1).unwrap_or(i32::MAX);
            orders.entry(t.code().to_string()).or_insert(next);
        }

        debug!("{}: {} dataset type orders", self.name(), orders.len());
        self.type_orders.store(Arc::new(orders));
        Ok(())
    }

    fn annotate(&self, mut t: DatasetType) -> DatasetType {
        if let Some(order) = self.type_orders.load().get(t.code()) {
            t.set_order(*order);
        }
        t
    }

    /// Runs a query on every constituent concurrently.
    async fn each<T, F, Fut>(&self, f: F) -> RepoResult<Vec<T>>
    where
        F: Fn(Arc<dyn Repo>) -> Fut,
        Fut: Future<Output = RepoResult<T>>,
    {
        try_join_all(self.repos.iter().map(|r| {
            let name = r.name();
            let fut = f(Arc::clone(r));
            async move { fut.await.map_err(|e| e.in_repo(name)) }
        }))
        .await
    }
}

#[async_trait]
impl Repo for Merger {
    fn name(&self) -> String {
        let names: Vec<String> = self.repos.iter().map(|r| r.name()).collect();
        format!("merger({})", names.join(","))
    }

    async fn node(&self, ctx: &QueryContext, id: &Id) -> RepoResult<Option<Node>> {
        let found = self
            .each(|r| async move { r.node(ctx, id).await })
            .await?;
        Ok(pick_latest(found, Node::year).map(|node| match node {
            Node::DatasetType(t) => Node::DatasetType(self.annotate(t)),
            other => other,
        }))
    }

    async fn nodes(&self, ctx: &QueryContext, ids: &[Id]) -> RepoResult<Vec<Option<Node>>> {
        let found = self
            .each(|r| async move { r.nodes(ctx, ids).await })
            .await?;

        let res = (0..ids.len())
            .map(|i| {
                let candidates = found.iter().map(|nodes| nodes.get(i).cloned().flatten());
                pick_latest(candidates, Node::year).map(|node| match node {
                    Node::DatasetType(t) => Node::DatasetType(self.annotate(t)),
                    other => other,
                })
            })
            .collect();
        Ok(res)
    }

    async fn area(&self, ctx: &QueryContext, code: &AreaCode) -> RepoResult<Option<Area>> {
        let found = self
            .each(|r| async move { r.area(ctx, code).await })
            .await?;
        Ok(found.into_iter().flatten().next())
    }

    async fn areas(&self, ctx: &QueryContext, input: &AreasInput) -> RepoResult<Vec<Area>> {
        let found = self
            .each(|r| async move { r.areas(ctx, input).await })
            .await?;
        Ok(merge_latest(found.into_iter().flatten().collect()))
    }

    async fn dataset_types(
        &self,
        ctx: &QueryContext,
        input: &DatasetTypesInput,
    ) -> RepoResult<Vec<DatasetType>> {
        let found = self
            .each(|r| async move { r.dataset_types(ctx, input).await })
            .await?;

        let mut res: Vec<DatasetType> = merge_latest(found.into_iter().flatten().collect())
            .into_iter()
            .map(|t| self.annotate(t))
            .collect();
        res.sort_by_key(|t| (Reverse(t.year()), t.order()));
        Ok(res)
    }

    async fn datasets(&self, ctx: &QueryContext, input: &DatasetsInput) -> RepoResult<Vec<Dataset>> {
        let found = self
            .each(|r| async move { r.datasets(ctx, input).await })
            .await?;
        Ok(merge_latest(found.into_iter().flatten().collect()))
    }

    async fn plateau_specs(&self, ctx: &QueryContext) -> RepoResult<Vec<PlateauSpec>> {
        let found = self
            .each(|r| async move { r.plateau_specs(ctx).await })
            .await?;
        Ok(merge_latest(found.into_iter().flatten().collect()))
    }

    async fn years(&self, ctx: &QueryContext) -> RepoResult<Vec<i32>> {
        let found = self.each(|r| async move { r.years(ctx).await }).await?;
        let years: BTreeSet<i32> = found.into_iter().flatten().collect();
        Ok(years.into_iter().collect())
    }
}

impl std::fmt::Debug for Merger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger").field("name", &self.name()).finish()
    }
}
