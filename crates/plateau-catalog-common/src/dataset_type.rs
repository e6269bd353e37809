//! Dataset types and their categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::id::Id;

/// The three families of dataset types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetTypeCategory {
    /// 3D city model feature types (buildings, roads, flood areas...).
    Plateau,
    /// Related datasets such as shelters or landmarks.
    Related,
    /// Anything else published alongside the models.
    Generic,
}

impl DatasetTypeCategory {
    pub const ALL: [DatasetTypeCategory; 3] = [
        DatasetTypeCategory::Plateau,
        DatasetTypeCategory::Related,
        DatasetTypeCategory::Generic,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DatasetTypeCategory::Plateau => "plateau",
            DatasetTypeCategory::Related => "related",
            DatasetTypeCategory::Generic => "generic",
        }
    }

    /// Case-insensitive parse.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauDatasetType {
    /// `dt_<code>_<major>`
    pub id: Id,
    pub name: String,
    pub code: String,
    /// `ps_<major>`
    pub plateau_spec_id: Id,
    /// Year of the specification major the type belongs to.
    pub year: i32,
    pub flood: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDatasetType {
    /// `dt_<code>`
    pub id: Id,
    pub name: String,
    pub code: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDatasetType {
    /// `dt_<code>`
    pub id: Id,
    pub name: String,
    pub code: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DatasetType {
    Plateau(PlateauDatasetType),
    Related(RelatedDatasetType),
    Generic(GenericDatasetType),
}

impl DatasetType {
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            DatasetType::Plateau(t) => &t.id,
            DatasetType::Related(t) => &t.id,
            DatasetType::Generic(t) => &t.id,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            DatasetType::Plateau(t) => &t.code,
            DatasetType::Related(t) => &t.code,
            DatasetType::Generic(t) => &t.code,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DatasetType::Plateau(t) => &t.name,
            DatasetType::Related(t) => &t.name,
            DatasetType::Generic(t) => &t.name,
        }
    }

    #[must_use]
    pub fn category(&self) -> DatasetTypeCategory {
        match self {
            DatasetType::Plateau(_) => DatasetTypeCategory::Plateau,
            DatasetType::Related(_) => DatasetTypeCategory::Related,
            DatasetType::Generic(_) => DatasetTypeCategory::Generic,
        }
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        match self {
            DatasetType::Plateau(t) => t.order,
            DatasetType::Related(t) => t.order,
            DatasetType::Generic(t) => t.order,
        }
    }

    pub fn set_order(&mut self, order: i32) {
        match self {
            DatasetType::Plateau(t) => t.order = order,
            DatasetType::Related(t) => t.order = order,
            DatasetType::Generic(t) => t.order = order,
        }
    }

    /// Registration year for plateau types, `0` otherwise.
    #[must_use]
    pub fn year(&self) -> i32 {
        match self {
            DatasetType::Plateau(t) => t.year,
            DatasetType::Related(_) | DatasetType::Generic(_) => 0,
        }
    }

    #[must_use]
    pub fn plateau_spec_id(&self) -> Option<&Id> {
        match self {
            DatasetType::Plateau(t) => Some(&t.plateau_spec_id),
            DatasetType::Related(_) | DatasetType::Generic(_) => None,
        }
    }
}

/// Dataset types of a snapshot grouped by category.
#[derive(Debug, Clone, Default)]
pub struct DatasetTypes(BTreeMap<DatasetTypeCategory, Vec<DatasetType>>);

impl DatasetTypes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, category: DatasetTypeCategory, types: impl IntoIterator<Item = DatasetType>) {
        self.0.entry(category).or_default().extend(types);
    }

    /// All types in category order.
    pub fn all(&self) -> impl Iterator<Item = &DatasetType> {
        self.0.values().flatten()
    }

    /// Types of one category, or all types when `category` is `None`.
    #[must_use]
    pub fn by_category(&self, category: Option<DatasetTypeCategory>) -> Vec<&DatasetType> {
        match category {
            None => self.all().collect(),
            Some(c) => self.0.get(&c).map(|v| v.iter().collect()).unwrap_or_default(),
        }
    }

    /// Types of the given categories, stably sorted by code.
    #[must_use]
    pub fn by_categories(&self, categories: &[DatasetTypeCategory]) -> Vec<&DatasetType> {
        let mut res: Vec<&DatasetType> = categories
            .iter()
            .filter_map(|c| self.0.get(c))
            .flatten()
            .collect();
        res.sort_by(|a, b| a.code().cmp(b.code()));
        res
    }

    #[must_use]
    pub fn find_by_code(&self, code: &str, category: Option<DatasetTypeCategory>) -> Option<&DatasetType> {
        self.by_category(category).into_iter().find(|t| t.code() == code)
    }

    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&DatasetType> {
        self.all().find(|t| t.id() == id)
    }
}
