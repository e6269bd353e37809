//! Datasets and their items.
//!
//! A dataset belongs to exactly one dataset type and is anchored to the most
//! specific area available. Its items are the downloadable or streamable
//! representations (3D Tiles, MVT, CZML...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::admin::Admin;
use crate::area::AreaCode;
use crate::dataset_type::DatasetTypeCategory;
use crate::id::Id;

/// Delivery format of a dataset item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetFormat {
    Csv,
    Czml,
    #[serde(rename = "CESIUM3DTILES")]
    Cesium3DTiles,
    Gltf,
    GtfsRealtime,
    #[serde(rename = "GEOJSON")]
    GeoJson,
    Mvt,
    Tiles,
    Tms,
    Wms,
}

impl DatasetFormat {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DatasetFormat::Csv => "CSV",
            DatasetFormat::Czml => "CZML",
            DatasetFormat::Cesium3DTiles => "CESIUM3DTILES",
            DatasetFormat::Gltf => "GLTF",
            DatasetFormat::GtfsRealtime => "GTFS_REALTIME",
            DatasetFormat::GeoJson => "GEOJSON",
            DatasetFormat::Mvt => "MVT",
            DatasetFormat::Tiles => "TILES",
            DatasetFormat::Tms => "TMS",
            DatasetFormat::Wms => "WMS",
        }
    }

    /// Parses a free-text format name as entered in the CMS (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "geojson" => Some(DatasetFormat::GeoJson),
            "3dtiles" | "3d tiles" => Some(DatasetFormat::Cesium3DTiles),
            "czml" => Some(DatasetFormat::Czml),
            "gtfs" | "gtfs-realtime" => Some(DatasetFormat::GtfsRealtime),
            "gltf" => Some(DatasetFormat::Gltf),
            "mvt" => Some(DatasetFormat::Mvt),
            "tiles" => Some(DatasetFormat::Tiles),
            "tms" => Some(DatasetFormat::Tms),
            "wms" => Some(DatasetFormat::Wms),
            "csv" => Some(DatasetFormat::Csv),
            _ => None,
        }
    }

    /// Returns `true` if items of this format expose named layers.
    #[must_use]
    pub fn supports_layers(&self) -> bool {
        matches!(self, DatasetFormat::Mvt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Texture {
    Texture,
    None,
}

impl Texture {
    /// Maps a "no texture" facet to a texture value.
    #[must_use]
    pub fn from_no_texture(no_texture: bool) -> Self {
        if no_texture {
            Texture::None
        } else {
            Texture::Texture
        }
    }
}

/// Scale of a flood inundation scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodingScale {
    /// 計画規模
    Planned,
    /// 想定最大規模
    ExpectedMaximum,
}

impl FloodingScale {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "計画規模" | "l1" | "L1" => Some(FloodingScale::Planned),
            "想定最大規模" | "l2" | "L2" => Some(FloodingScale::ExpectedMaximum),
            _ => None,
        }
    }
}

/// Authority administering a river reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverAdmin {
    National,
    Prefecture,
}

impl RiverAdmin {
    /// Parses `国`/`natl` and `都道府県`/`pref`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "国" | "natl" => Some(RiverAdmin::National),
            "都道府県" | "pref" => Some(RiverAdmin::Prefecture),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            RiverAdmin::National => "国",
            RiverAdmin::Prefecture => "都道府県",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct River {
    pub name: String,
    pub admin: RiverAdmin,
}

/// Area anchoring of a dataset. The prefecture is always known.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetArea {
    pub prefecture_id: Id,
    pub prefecture_code: AreaCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<AreaCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_code: Option<AreaCode>,
}

impl DatasetArea {
    /// Ward code, else city code, else prefecture code.
    #[must_use]
    pub fn most_detailed_code(&self) -> &AreaCode {
        self.ward_code
            .as_ref()
            .or(self.city_code.as_ref())
            .unwrap_or(&self.prefecture_code)
    }

    /// Prefecture, city and ward codes that are present.
    #[must_use]
    pub fn codes(&self) -> Vec<&AreaCode> {
        std::iter::once(&self.prefecture_code)
            .chain(self.city_code.as_ref())
            .chain(self.ward_code.as_ref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauDatasetItem {
    pub id: Id,
    pub name: String,
    pub url: String,
    pub format: DatasetFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lod: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<Texture>,
    pub parent_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flooding_scale: Option<FloodingScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flooding_scale_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDatasetItem {
    pub id: Id,
    pub name: String,
    pub url: String,
    pub format: DatasetFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_format: Option<DatasetFormat>,
    pub parent_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDatasetItem {
    pub id: Id,
    pub name: String,
    pub url: String,
    pub format: DatasetFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    pub parent_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauDataset {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suborder: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i32,
    pub registration_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_data_url: Option<String>,
    #[serde(flatten)]
    pub area: DatasetArea,
    pub type_id: Id,
    pub type_code: String,
    pub plateau_spec_minor_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub river: Option<River>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Admin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    pub items: Vec<PlateauDatasetItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDataset {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i32,
    pub registration_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_data_url: Option<String>,
    #[serde(flatten)]
    pub area: DatasetArea,
    pub type_id: Id,
    pub type_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Admin>,
    pub items: Vec<RelatedDatasetItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDataset {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i32,
    pub registration_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_data_url: Option<String>,
    #[serde(flatten)]
    pub area: DatasetArea,
    pub type_id: Id,
    pub type_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Admin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    pub items: Vec<GenericDatasetItem>,
}

impl PlateauDataset {
    /// Converts a plateau dataset into a generic one of another type, keeping its items.
    #[must_use]
    pub fn into_generic(self, type_id: Id, type_code: String, new_id: Id) -> GenericDataset {
        let items = self
            .items
            .into_iter()
            .map(|item| GenericDatasetItem {
                id: item.id,
                name: item.name,
                url: item.url,
                format: item.format,
                layers: item.layers,
                parent_id: new_id.clone(),
            })
            .collect();

        GenericDataset {
            id: new_id,
            name: self.name,
            description: self.description,
            year: self.year,
            registration_year: self.registration_year,
            open_data_url: self.open_data_url,
            area: self.area,
            type_id,
            type_code,
            admin: self.admin,
            groups: self.groups,
            items,
        }
    }
}

/// A dataset of any category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Dataset {
    Plateau(PlateauDataset),
    Related(RelatedDataset),
    Generic(GenericDataset),
}

/// A dataset item of any category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DatasetItem {
    Plateau(PlateauDatasetItem),
    Related(RelatedDatasetItem),
    Generic(GenericDatasetItem),
}

impl Dataset {
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            Dataset::Plateau(d) => &d.id,
            Dataset::Related(d) => &d.id,
            Dataset::Generic(d) => &d.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Dataset::Plateau(d) => &d.name,
            Dataset::Related(d) => &d.name,
            Dataset::Generic(d) => &d.name,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Dataset::Plateau(d) => d.description.as_deref(),
            Dataset::Related(d) => d.description.as_deref(),
            Dataset::Generic(d) => d.description.as_deref(),
        }
    }

    /// Data year.
    #[must_use]
    pub fn year(&self) -> i32 {
        match self {
            Dataset::Plateau(d) => d.year,
            Dataset::Related(d) => d.year,
            Dataset::Generic(d) => d.year,
        }
    }

    #[must_use]
    pub fn registration_year(&self) -> i32 {
        match self {
            Dataset::Plateau(d) => d.registration_year,
            Dataset::Related(d) => d.registration_year,
            Dataset::Generic(d) => d.registration_year,
        }
    }

    #[must_use]
    pub fn type_id(&self) -> &Id {
        match self {
            Dataset::Plateau(d) => &d.type_id,
            Dataset::Related(d) => &d.type_id,
            Dataset::Generic(d) => &d.type_id,
        }
    }

    #[must_use]
    pub fn type_code(&self) -> &str {
        match self {
            Dataset::Plateau(d) => &d.type_code,
            Dataset::Related(d) => &d.type_code,
            Dataset::Generic(d) => &d.type_code,
        }
    }

    #[must_use]
    pub fn category(&self) -> DatasetTypeCategory {
        match self {
            Dataset::Plateau(_) => DatasetTypeCategory::Plateau,
            Dataset::Related(_) => DatasetTypeCategory::Related,
            Dataset::Generic(_) => DatasetTypeCategory::Generic,
        }
    }

    #[must_use]
    pub fn area(&self) -> &DatasetArea {
        match self {
            Dataset::Plateau(d) => &d.area,
            Dataset::Related(d) => &d.area,
            Dataset::Generic(d) => &d.area,
        }
    }

    #[must_use]
    pub fn admin(&self) -> Option<&Admin> {
        match self {
            Dataset::Plateau(d) => d.admin.as_ref(),
            Dataset::Related(d) => d.admin.as_ref(),
            Dataset::Generic(d) => d.admin.as_ref(),
        }
    }

    #[must_use]
    pub fn open_data_url(&self) -> Option<&str> {
        match self {
            Dataset::Plateau(d) => d.open_data_url.as_deref(),
            Dataset::Related(d) => d.open_data_url.as_deref(),
            Dataset::Generic(d) => d.open_data_url.as_deref(),
        }
    }

    /// Returns the dataset with its admin blob removed.
    #[must_use]
    pub fn without_admin(mut self) -> Self {
        match &mut self {
            Dataset::Plateau(d) => d.admin = None,
            Dataset::Related(d) => d.admin = None,
            Dataset::Generic(d) => d.admin = None,
        }
        self
    }

    /// Identity shared by all vintages of the same plateau dataset:
    /// `d_<mostSpecificArea>_<typeCode>`. Other categories have none.
    #[must_use]
    pub fn vague_id(&self) -> Option<String> {
        match self {
            Dataset::Plateau(d) => Some(format!(
                "d_{}_{}",
                d.area.most_detailed_code(),
                d.type_code
            )),
            Dataset::Related(_) | Dataset::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<DatasetItem> {
        match self {
            Dataset::Plateau(d) => d.items.iter().cloned().map(DatasetItem::Plateau).collect(),
            Dataset::Related(d) => d.items.iter().cloned().map(DatasetItem::Related).collect(),
            Dataset::Generic(d) => d.items.iter().cloned().map(DatasetItem::Generic).collect(),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Dataset::Plateau(d) => d.items.len(),
            Dataset::Related(d) => d.items.len(),
            Dataset::Generic(d) => d.items.len(),
        }
    }

    /// Finds an item of this dataset by id.
    #[must_use]
    pub fn item(&self, id: &Id) -> Option<DatasetItem> {
        match self {
            Dataset::Plateau(d) => d
                .items
                .iter()
                .find(|i| &i.id == id)
                .cloned()
                .map(DatasetItem::Plateau),
            Dataset::Related(d) => d
                .items
                .iter()
                .find(|i| &i.id == id)
                .cloned()
                .map(DatasetItem::Related),
            Dataset::Generic(d) => d
                .items
                .iter()
                .find(|i| &i.id == id)
                .cloned()
                .map(DatasetItem::Generic),
        }
    }
}

impl DatasetItem {
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            DatasetItem::Plateau(i) => &i.id,
            DatasetItem::Related(i) => &i.id,
            DatasetItem::Generic(i) => &i.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DatasetItem::Plateau(i) => &i.name,
            DatasetItem::Related(i) => &i.name,
            DatasetItem::Generic(i) => &i.name,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            DatasetItem::Plateau(i) => &i.url,
            DatasetItem::Related(i) => &i.url,
            DatasetItem::Generic(i) => &i.url,
        }
    }

    #[must_use]
    pub fn format(&self) -> DatasetFormat {
        match self {
            DatasetItem::Plateau(i) => i.format,
            DatasetItem::Related(i) => i.format,
            DatasetItem::Generic(i) => i.format,
        }
    }

    #[must_use]
    pub fn parent_id(&self) -> &Id {
        match self {
            DatasetItem::Plateau(i) => &i.parent_id,
            DatasetItem::Related(i) => &i.parent_id,
            DatasetItem::Generic(i) => &i.parent_id,
        }
    }
}

/// Datasets of a snapshot grouped by category.
#[derive(Debug, Clone, Default)]
pub struct Datasets(BTreeMap<DatasetTypeCategory, Vec<Dataset>>);

impl Datasets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, category: DatasetTypeCategory, datasets: impl IntoIterator<Item = Dataset>) {
        self.0.entry(category).or_default().extend(datasets);
    }

    /// All datasets in category order.
    pub fn all(&self) -> impl Iterator<Item = &Dataset> {
        self.0.values().flatten()
    }

    #[must_use]
    pub fn by_category(&self, category: DatasetTypeCategory) -> &[Dataset] {
        self.0.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Removes and returns the datasets of one category.
    pub fn take(&mut self, category: DatasetTypeCategory) -> Vec<Dataset> {
        self.0.remove(&category).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&Dataset> {
        self.all().find(|d| d.id() == id)
    }

    /// Finds an item in any dataset.
    #[must_use]
    pub fn item(&self, id: &Id) -> Option<DatasetItem> {
        self.all().find_map(|d| d.item(id))
    }
}
