//! Per-city CityGML aggregates.

use serde::{Deserialize, Serialize};

use crate::admin::Admin;
use crate::area::AreaCode;
use crate::id::Id;

/// The CityGML package of one city, with the feature types it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityGmlDataset {
    /// `cg_<cityCode>`
    pub id: Id,
    pub year: i32,
    pub registration_year: i32,
    pub prefecture_id: Id,
    pub prefecture_code: AreaCode,
    pub city_id: Id,
    pub city_code: AreaCode,
    /// Base CityGML archive URL.
    pub url: String,
    /// Plateau feature type codes present for the city.
    pub feature_types: Vec<String>,
    pub plateau_spec_minor_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Admin>,
}

impl CityGmlDataset {
    #[must_use]
    pub fn without_admin(mut self) -> Self {
        self.admin = None;
        self
    }
}
