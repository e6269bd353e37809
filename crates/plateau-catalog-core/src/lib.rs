//! `plateau-catalog-core` is the engine of the `plateau-catalog` project: it turns raw CMS records
//! of PLATEAU 3D city model projects into queryable catalog snapshots.
//!
//! This crate includes:
//! - **Asset Names**: Parsing of the structured file names of published assets ([`name`]).
//! - **Seed Builder**: Grouping of feature records into dataset seeds ([`seed`]).
//! - **Converter**: Conversion of typed records into a snapshot with warnings ([`convert`]).
//! - **Repositories**: The in-memory repository ([`inmemory`]), the per-tenant cache ([`cache`])
//!   and the merger reconciling several snapshots ([`merge`]).
//!
//! Records are loaded through a [`fetch::Fetcher`]; the engine performs no network I/O itself.
//!
//! ```
//! use plateau_catalog_core::name::AssetName;
//!
//! let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1");
//! assert_eq!(name.map(|n| n.city_code), Some("11111".to_string()));
//! ```

pub mod cache;
pub mod config;
pub mod convert;
pub mod dic;
pub mod error;
pub mod feature_types;
pub mod fetch;
pub mod inmemory;
pub mod merge;
pub mod name;
pub mod record;
pub mod seed;
pub mod utils;

pub use cache::{Repos, Tenant, TenantState};
pub use config::{CatalogConfig, CmsConfig};
pub use error::{CatalogError, ConfigError, FetchError, Result, TenantError};
pub use fetch::{Dump, Fetcher, StaticFetcher, fetch_all};
pub use inmemory::{InMemoryRepo, Snapshot};
pub use merge::Merger;
