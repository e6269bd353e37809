//! Query inputs and the per-call visibility context.

use crate::admin::Stage;
use crate::area::{AreaCode, AreaType};
use crate::dataset_type::DatasetTypeCategory;

/// Filter for area listings.
#[derive(Debug, Clone, Default)]
pub struct AreasInput {
    /// Restrict to these area levels.
    pub area_types: Vec<AreaType>,
    /// Keep areas whose name contains any of these tokens.
    pub search_tokens: Vec<String>,
    /// Keep children of this area.
    pub parent_code: Option<AreaCode>,
    /// With `parent_code`, also keep grandchildren.
    pub deep: bool,
    /// Keep only areas hosting a dataset of these type codes. An empty list means any type.
    pub dataset_types: Option<Vec<String>>,
    /// Restrict `dataset_types` to these categories.
    pub categories: Vec<DatasetTypeCategory>,
    /// With `dataset_types`, also keep the ancestors of hosting areas.
    pub include_parents: bool,
}

/// Filter for dataset listings.
#[derive(Debug, Clone, Default)]
pub struct DatasetsInput {
    pub area_codes: Vec<AreaCode>,
    /// Match `area_codes` against the most specific area only.
    pub shallow: bool,
    pub year: Option<i32>,
    pub registration_year: Option<i32>,
    /// Spec reference such as `3`, `3.2`, `第3.2版`.
    pub plateau_spec: Option<String>,
    /// Type codes or category names, case-insensitive.
    pub include_types: Vec<String>,
    pub exclude_types: Vec<String>,
    /// Every token must occur in the name, description, subname or subcode.
    pub search_tokens: Vec<String>,
}

/// Filter for dataset type listings.
#[derive(Debug, Clone, Default)]
pub struct DatasetTypesInput {
    pub category: Option<DatasetTypeCategory>,
    pub year: Option<i32>,
    pub plateau_spec: Option<String>,
}

/// Visibility settings of a caller, passed explicitly into every query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Keep admin blobs in results.
    pub bypass_admin_removal: bool,
    /// Non-GA stages the caller may see.
    pub allowed_stages: Vec<Stage>,
}

impl QueryContext {
    /// Anonymous caller: GA records only, admin stripped.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// Privileged caller. `include_beta` admits beta records.
    #[must_use]
    pub fn admin(bypass_admin_removal: bool, include_beta: bool) -> Self {
        Self {
            bypass_admin_removal,
            allowed_stages: if include_beta { vec![Stage::Beta] } else { vec![] },
        }
    }

    #[must_use]
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        for stage in stages {
            if !self.allowed_stages.contains(&stage) {
                self.allowed_stages.push(stage);
            }
        }
        self
    }
}
