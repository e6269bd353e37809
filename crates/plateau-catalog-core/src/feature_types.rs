//! Registry of built-in feature types and specification versions.
//!
//! This module provides the static registry of dataset types the catalog knows
//! about: the PLATEAU city model feature types (buildings, roads, flood areas...),
//! the related dataset types (shelters, landmarks...) and the generic ones. Each
//! entry carries its display name, grouping and the rules used to name MVT
//! layers of its items.
//!
//! # Examples
//!
//! ```
//! use plateau_catalog_core::feature_types::{find_plateau_feature_type, get_feature_types};
//!
//! let bldg = find_plateau_feature_type("bldg").expect("bldg should exist");
//! assert_eq!(bldg.name, "建築物モデル");
//! assert_eq!(bldg.order, 1);
//!
//! let types = get_feature_types();
//! assert_eq!(types.related.len(), 7);
//! ```

use plateau_catalog_common::{
    DatasetFormat, DatasetType, DatasetTypeCategory, DatasetTypes, GenericDatasetType, Id,
    IdType, PlateauDatasetType, PlateauSpec, RelatedDatasetType,
};

/// Base URL of dataset pages on G空間情報センター.
pub const GEOSPATIALJP_DATASET_URL: &str = "https://www.geospatial.jp/ckan/dataset/";

/// Minor versions of the 3.x specification.
pub const PLATEAU_SPEC_VERSIONS_3: &[&str] = &["3.0", "3.1", "3.2", "3.3", "3.4", "3.5"];

/// Code of the building feature type, whose datasets are split by ward.
pub const BLDG_CODE: &str = "bldg";

/// Code of the urban planning feature type.
pub const URF_CODE: &str = "urf";

/// Code of the generic type that receives relocated sample datasets.
pub const SAMPLE_CODE: &str = "sample";

/// Related types whose converted assets are ignored.
pub const CONVERSION_IGNORED: &[&str] = &["border"];

/// Rules used to name the layers of an MVT item.
///
/// Fixed names win, then names registered for the item's LOD, then the default
/// names with a prefix, then the default names as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerNames {
    pub names: &'static [&'static str],
    pub names_for_lod: &'static [(i32, &'static [&'static str])],
    pub prefix: Option<&'static str>,
}

impl LayerNames {
    /// Resolves the layer names of an item. Formats without layers yield none.
    #[must_use]
    pub fn layer_names(&self, defaults: &[String], lod: i32, format: DatasetFormat) -> Vec<String> {
        if !format.supports_layers() {
            return vec![];
        }

        if !self.names.is_empty() {
            return self.names.iter().map(ToString::to_string).collect();
        }

        if let Some((_, names)) = self.names_for_lod.iter().find(|(l, _)| *l == lod) {
            return names.iter().map(ToString::to_string).collect();
        }

        match self.prefix {
            Some(prefix) => defaults.iter().map(|d| format!("{prefix}_{d}")).collect(),
            None => defaults.to_vec(),
        }
    }
}

/// A feature type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureType {
    /// Short code used in model keys and asset names (e.g. `"bldg"`).
    pub code: &'static str,
    /// Display name (e.g. `"建築物モデル"`).
    pub name: &'static str,
    /// Global display order, starting at 1 across all categories.
    pub order: i32,
    pub group: Option<&'static str>,
    /// Spec major version of plateau types, `0` for the others.
    pub spec_major: i32,
    /// Flood types use the river grammar in their asset names.
    pub flood: bool,
    /// Textured assets of this type are skipped.
    pub hide_texture: bool,
    pub layers: LayerNames,
}

impl FeatureType {
    /// Creates a feature type with no grouping and default layer rules.
    #[must_use]
    pub const fn new(code: &'static str, name: &'static str) -> Self {
        Self {
            code,
            name,
            order: 0,
            group: None,
            spec_major: 0,
            flood: false,
            hide_texture: false,
            layers: LayerNames {
                names: &[],
                names_for_lod: &[],
                prefix: None,
            },
        }
    }

    #[must_use]
    const fn group(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    /// Marks a flood type: river grammar and hidden textures.
    #[must_use]
    const fn flood(mut self) -> Self {
        self.flood = true;
        self.hide_texture = true;
        self
    }

    #[must_use]
    const fn layers(mut self, names: &'static [&'static str]) -> Self {
        self.layers.names = names;
        self
    }

    #[must_use]
    const fn layers_for_lod(mut self, names: &'static [(i32, &'static [&'static str])]) -> Self {
        self.layers.names_for_lod = names;
        self
    }

    #[must_use]
    const fn layer_prefix(mut self, prefix: &'static str) -> Self {
        self.layers.prefix = Some(prefix);
        self
    }
}

const FLOOD_GROUP: &str = "災害リスク（浸水）モデル";
const LANDSLIDE_GROUP: &str = "災害リスク（土砂災害）モデル";
const TRAFFIC_AREA: &[&str] = &["TrafficArea", "AuxiliaryTrafficArea"];

const fn transport_layers(
    name: &'static [&'static str],
    lod2: &'static [&'static str],
) -> [(i32, &'static [&'static str]); 3] {
    [(0, name), (1, name), (2, lod2)]
}

const ROAD_LAYERS: [(i32, &[&str]); 3] = transport_layers(&["Road"], TRAFFIC_AREA);
const RAILWAY_LAYERS: [(i32, &[&str]); 3] = transport_layers(&["Railway"], TRAFFIC_AREA);
const TRACK_LAYERS: [(i32, &[&str]); 3] = transport_layers(&["Track"], TRAFFIC_AREA);
const SQUARE_LAYERS: [(i32, &[&str]); 3] = transport_layers(&["Square"], TRAFFIC_AREA);
const WATERWAY_LAYERS: [(i32, &[&str]); 3] = transport_layers(&["Waterway"], &["TrafficArea"]);

const PLATEAU_FEATURE_TYPES: &[FeatureType] = &[
    FeatureType::new("bldg", "建築物モデル"),
    FeatureType::new("tran", "交通（道路）モデル").layers_for_lod(&ROAD_LAYERS),
    FeatureType::new("rwy", "交通（鉄道）モデル").layers_for_lod(&RAILWAY_LAYERS),
    FeatureType::new("trk", "交通（徒歩道）モデル").layers_for_lod(&TRACK_LAYERS),
    FeatureType::new("squr", "交通（広場）モデル").layers_for_lod(&SQUARE_LAYERS),
    FeatureType::new("wwy", "交通（航路）モデル").layers_for_lod(&WATERWAY_LAYERS),
    FeatureType::new("luse", "土地利用モデル").layers(&["luse"]),
    FeatureType::new("fld", "洪水浸水想定区域モデル")
        .group(FLOOD_GROUP)
        .flood(),
    FeatureType::new("tnm", "津波浸水想定区域モデル")
        .group(FLOOD_GROUP)
        .flood(),
    FeatureType::new("htd", "高潮浸水想定区域モデル")
        .group(FLOOD_GROUP)
        .flood(),
    FeatureType::new("ifld", "内水浸水想定区域モデル")
        .group(FLOOD_GROUP)
        .flood(),
    FeatureType::new("lsld", "土砂災害警戒区域モデル")
        .group(LANDSLIDE_GROUP)
        .layers(&["lsld"]),
    FeatureType::new("urf", "都市計画決定情報モデル"),
    FeatureType::new("brid", "橋梁モデル"),
    FeatureType::new("tun", "トンネルモデル"),
    FeatureType::new("cons", "その他の構造物モデル").layers(&["OtherConstruction"]),
    FeatureType::new("frn", "都市設備モデル").layers(&["CityFurniture"]),
    FeatureType::new("unf", "地下埋設物モデル"),
    FeatureType::new("ubld", "地下街モデル"),
    FeatureType::new("veg", "植生モデル"),
    FeatureType::new("wtr", "水部モデル").layers(&["WaterBody"]),
    FeatureType::new("dem", "地形モデル"),
    FeatureType::new("area", "区域モデル").layers(&["Zone"]),
    FeatureType::new("gen", "汎用都市オブジェクトモデル").layer_prefix("gen"),
];

const RELATED_FEATURE_TYPES: &[FeatureType] = &[
    FeatureType::new("shelter", "避難施設情報"),
    FeatureType::new("landmark", "ランドマーク情報"),
    FeatureType::new("station", "鉄道駅情報"),
    FeatureType::new("emergency_route", "緊急輸送道路情報"),
    FeatureType::new("railway", "鉄道情報"),
    FeatureType::new("park", "公園情報"),
    FeatureType::new("border", "行政界情報"),
];

const GENERIC_FEATURE_TYPES: &[FeatureType] = &[
    FeatureType::new("global", "全球データ"),
    FeatureType::new("usecase", "ユースケース"),
    FeatureType::new("sample", "サンプルデータ"),
];

/// Urban planning feature classes, in display order, with their names.
pub const URF_FEATURE_TYPES: &[(&str, &str)] = &[
    ("UrbanPlanningArea", "都市計画区域"),
    ("QuasiUrbanPlanningArea", "準都市計画区域"),
    ("AreaClassification", "区域区分"),
    ("UseDistrict", "用途地域"),
    ("SpecialUseDistrict", "特別用途地区"),
    ("SpecialUseRestrictionDistrict", "特定用途制限地域"),
    ("ExceptionalFloorAreaRateDistrict", "特例容積率適用地区"),
    ("HighRiseResidentialAttractionDistrict", "高層住居誘導地区"),
    ("HeightControlDistrict", "高度地区"),
    ("HighLevelUseDistrict", "高度利用地区"),
    ("SpecifiedBlock", "特定街区"),
    ("UrbanRenaissanceSpecialDistrict", "都市再生特別地区"),
    ("HousingControlArea", "居住調整地域"),
    ("ResidentialEnvironmentImprovementDistrict", "居住環境向上用途誘導地区"),
    ("SpecifiedUseAttractionDistrict", "特定用途誘導地区"),
    ("FirePreventionDistrict", "防火地域又は準防火地域"),
    ("SpecifiedDisasterPreventionBlockImprovementZone", "特定防災街区整備地区"),
    ("LandscapeZone", "景観地区"),
    ("ScenicDistrict", "風致地区"),
    ("ParkingPlaceDevelopmentZone", "駐車場整備地区"),
    ("PortZone", "臨港地区"),
    ("SpecialZoneForPreservationOfHistoricalLandscape", "歴史的風土特別保存地区"),
    ("ZoneForPreservationOfHistoricalLandscape", "第一種・第二種歴史的風土保存地区"),
    ("GreenSpaceConservationDistrict", "緑地保全地域"),
    ("SpecialGreenSpaceConservationDistrict", "特別緑地保全地区"),
    ("TreePlantingDistrict", "緑化地域"),
    ("DistributionBusinessZone", "流通業務地区"),
    ("ProductiveGreenZone", "生産緑地地区"),
    ("ConservationZoneForClustersOfTraditionalStructures", "伝統的建造物群保存地区"),
    ("AircraftNoiseControlZone", "航空機騒音障害防止地区"),
    ("UrbanFacility", "都市施設"),
    ("UrbanDevelopmentProject", "市街地開発事業"),
    ("ScheduledAreaForUrbanDevelopmentProject", "市街地開発事業等予定区域"),
    ("PromotionArea", "促進区域"),
    ("UnusedLandUsePromotionArea", "遊休土地転換利用促進地区"),
    ("UrbanDisasterRecoveryPromotionArea", "被災市街地復興推進地域"),
    ("DistrictPlan", "地区計画"),
    ("DisasterPreventionBlockImprovementPlan", "防災街区整備地区計画"),
    ("HistoricSceneryMaintenanceAndImprovementDistrictPlan", "歴史的風致維持向上地区計画"),
    ("RoadsideDistrictPlan", "沿道地区計画"),
    ("RuralDistrictPlan", "集落地区計画"),
];

/// Looks up an urban planning class. Returns its 1-based order and name.
#[must_use]
pub fn find_urf_feature_type(code: &str) -> Option<(i32, &'static str)> {
    URF_FEATURE_TYPES
        .iter()
        .position(|(c, _)| *c == code)
        .map(|i| (order_of(i), URF_FEATURE_TYPES[i].1))
}

fn order_of(index: usize) -> i32 {
    i32::try_from(index).map_or(i32::MAX, |i| i + 1)
}

/// Feature types of the three categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTypes {
    pub plateau: Vec<FeatureType>,
    pub related: Vec<FeatureType>,
    pub generic: Vec<FeatureType>,
}

impl FeatureTypes {
    #[must_use]
    pub fn find_plateau(&self, code: &str) -> Option<&FeatureType> {
        self.plateau.iter().find(|t| t.code == code)
    }

    /// Model keys of every plateau feature type (`plateau-<code>`).
    #[must_use]
    pub fn plateau_codes(&self) -> Vec<&'static str> {
        self.plateau.iter().map(|t| t.code).collect()
    }

    /// Builds the dataset types of a snapshot.
    ///
    /// Plateau types are registered against the specification major they belong to and
    /// take its year; types whose major is unknown are left out.
    #[must_use]
    pub fn to_dataset_types(&self, specs: &[PlateauSpec]) -> DatasetTypes {
        let mut res = DatasetTypes::new();

        res.append(
            DatasetTypeCategory::Plateau,
            self.plateau.iter().filter_map(|ft| {
                let spec = specs.iter().find(|s| s.major_version == ft.spec_major)?;
                Some(DatasetType::Plateau(PlateauDatasetType {
                    id: Id::new(format!("{}_{}", ft.code, ft.spec_major), IdType::DatasetType),
                    name: ft.name.to_string(),
                    code: ft.code.to_string(),
                    plateau_spec_id: spec.id.clone(),
                    year: spec.year,
                    flood: ft.flood,
                    group: ft.group.map(ToString::to_string),
                    order: ft.order,
                }))
            }),
        );

        res.append(
            DatasetTypeCategory::Related,
            self.related.iter().map(|ft| {
                DatasetType::Related(RelatedDatasetType {
                    id: Id::new(ft.code, IdType::DatasetType),
                    name: ft.name.to_string(),
                    code: ft.code.to_string(),
                    order: ft.order,
                })
            }),
        );

        res.append(
            DatasetTypeCategory::Generic,
            self.generic.iter().map(|ft| {
                DatasetType::Generic(GenericDatasetType {
                    id: Id::new(ft.code, IdType::DatasetType),
                    name: ft.name.to_string(),
                    code: ft.code.to_string(),
                    order: ft.order,
                })
            }),
        );

        res
    }
}

/// Returns the complete registry of feature types.
///
/// Orders are assigned sequentially starting at 1: plateau types first, then
/// related types, then generic types. Plateau types belong to spec major 3.
#[must_use]
pub fn get_feature_types() -> FeatureTypes {
    let mut offset = 0;
    let mut number = |types: &[FeatureType], spec_major: i32| -> Vec<FeatureType> {
        let res = types
            .iter()
            .enumerate()
            .map(|(i, ft)| FeatureType {
                order: order_of(offset + i),
                spec_major,
                ..ft.clone()
            })
            .collect();
        offset += types.len();
        res
    };

    let plateau = number(PLATEAU_FEATURE_TYPES, 3);
    let related = number(RELATED_FEATURE_TYPES, 0);
    let generic = number(GENERIC_FEATURE_TYPES, 0);

    FeatureTypes {
        plateau,
        related,
        generic,
    }
}

/// Finds a plateau feature type by code.
#[must_use]
pub fn find_plateau_feature_type(code: &str) -> Option<FeatureType> {
    get_feature_types()
        .plateau
        .into_iter()
        .find(|t| t.code == code)
}

/// Returns the specification versions known to the catalog.
#[must_use]
pub fn get_plateau_specs() -> Vec<PlateauSpec> {
    vec![PlateauSpec::new(3, 2023, PLATEAU_SPEC_VERSIONS_3)]
}

/// Builds the G空間情報センター dataset page URL of a city.
/// Returns `None` when the code, the English name or the year is missing.
#[must_use]
pub fn geospatialjp_url(city_code: &str, city_name_en: &str, year: i32) -> Option<String> {
    if city_code.is_empty() || city_name_en.is_empty() || year == 0 {
        return None;
    }
    Some(format!(
        "{GEOSPATIALJP_DATASET_URL}plateau-{city_code}-{city_name_en}-{year}"
    ))
}
