//! Common types and traits shared across `plateau-catalog` crates.
//!
//! This crate provides the catalog model (areas, dataset types, datasets, specs,
//! CityGML aggregates), the query inputs and the [`Repo`] trait that every
//! repository implementation exposes, preventing circular dependencies between
//! the engine and the binaries built on top of it.

pub mod admin;
pub mod area;
pub mod citygml;
pub mod dataset;
pub mod dataset_type;
pub mod error;
pub mod id;
pub mod node;
pub mod query;
pub mod repo;
pub mod spec;

// Re-export commonly used types
pub use admin::{Admin, Stage, is_stage_allowed};
pub use area::{Area, AreaCode, AreaType, Areas, City, Prefecture, Ward};
pub use citygml::CityGmlDataset;
pub use dataset::{
    Dataset, DatasetArea, DatasetFormat, DatasetItem, Datasets, FloodingScale, GenericDataset,
    GenericDatasetItem, PlateauDataset, PlateauDatasetItem, RelatedDataset, RelatedDatasetItem,
    River, RiverAdmin, Texture,
};
pub use dataset_type::{
    DatasetType, DatasetTypeCategory, DatasetTypes, GenericDatasetType, PlateauDatasetType,
    RelatedDatasetType,
};
pub use error::{RepoError, RepoResult};
pub use id::{Id, IdType};
pub use node::Node;
pub use query::{AreasInput, DatasetTypesInput, DatasetsInput, QueryContext};
pub use repo::Repo;
pub use spec::{PlateauSpec, PlateauSpecMinor, find_spec_minor, major_version, spec_number};
