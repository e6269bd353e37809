//! Raw CMS records and their decoding.
//!
//! Records arrive as loosely typed JSON objects, one list per model key. This
//! module decodes them into typed records. A record that fails to decode is
//! reported as a warning and left out; decoding a tenant never fails as a whole.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;
use plateau_catalog_common::{AreaCode, City, PlateauSpec, Prefecture, Stage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::dic::{Dic, string_or_number};
use crate::feature_types::{FeatureTypes, geospatialjp_url};
use crate::utils::year_int;

pub const MODEL_PREFIX: &str = "plateau-";
pub const CITY_MODEL: &str = "city";
pub const RELATED_MODEL: &str = "related";
pub const GENERIC_MODEL: &str = "generic";
pub const SAMPLE_MODEL: &str = "sample";
pub const GEOSPATIALJP_DATA_MODEL: &str = "geospatialjp-data";

/// Management status meaning the data is ready for review.
pub const STATUS_READY: &str = "確認可能";

/// Category given to generic records that declare none.
pub const DEFAULT_GENERIC_CATEGORY: &str = "ユースケース";

/// Builds the model key of a model name (`city` gives `plateau-city`).
#[must_use]
pub fn model_key(model: &str) -> String {
    format!("{MODEL_PREFIX}{model}")
}

/// Raw records of one tenant keyed by model key, in fetch order.
pub type RawRecords = IndexMap<String, Vec<Value>>;

/// Reads a select tag given either as `{"name": ...}` or as a plain string.
fn tag_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(m)) => m.get("name").and_then(Value::as_str).map(ToString::to_string),
        _ => None,
    })
}

fn asset_url_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(m) => m
            .get("url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        _ => None,
    }
}

/// Reads asset references: a URL, an object carrying `url`, or a list of those.
fn asset_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values.iter().filter_map(asset_url_of).collect(),
        Some(v) => asset_url_of(&v).into_iter().collect(),
        None => vec![],
    })
}

/// Reads a single asset reference; lists yield their first entry.
fn asset_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    asset_urls(deserializer).map(|urls| urls.into_iter().next())
}

/// A city record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CityItem {
    pub id: String,
    pub prefecture: String,
    pub city_name: String,
    pub city_name_en: String,
    #[serde(deserialize_with = "string_or_number")]
    pub city_code: String,
    pub spec: String,
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    pub open_data_url: String,
    #[serde(deserialize_with = "tag_name")]
    pub plateau_data_status: Option<String>,
    #[serde(deserialize_with = "tag_name")]
    pub related_data_status: Option<String>,
    pub city_public: bool,
    pub sdk_public: bool,
    pub related_public: bool,
    pub geospatialjp_publish: bool,
    /// Remaining fields, including the per-type `<code>_public` flags.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CityItem {
    #[must_use]
    pub fn year_int(&self) -> i32 {
        year_int(&self.year)
    }

    /// Returns `true` if the `<code>_public` flag is set.
    #[must_use]
    pub fn is_type_public(&self, code: &str) -> bool {
        self.extra
            .get(&format!("{code}_public"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn any_type_public(&self) -> bool {
        self.extra
            .iter()
            .any(|(k, v)| k.ends_with("_public") && v.as_bool() == Some(true))
    }

    /// Stage of the city's plateau data, optionally for one feature type.
    #[must_use]
    pub fn plateau_stage(&self, feature_type: Option<&str>) -> Stage {
        if self.city_public || feature_type.is_some_and(|ft| self.is_type_public(ft)) {
            Stage::Ga
        } else if self.plateau_data_status.as_deref() == Some(STATUS_READY) {
            Stage::Beta
        } else {
            Stage::Alpha
        }
    }

    #[must_use]
    pub fn sdk_stage(&self) -> Stage {
        if self.sdk_public {
            Stage::Ga
        } else if self.plateau_stage(None) == Stage::Beta {
            Stage::Beta
        } else {
            Stage::Alpha
        }
    }

    /// The city is shown at all if some of its data is public or in review.
    #[must_use]
    pub fn is_public_or_beta(&self) -> bool {
        self.plateau_stage(None) != Stage::Alpha
            || self.sdk_stage() != Stage::Alpha
            || self.any_type_public()
    }

    /// Open data page of the city: the explicit URL, else the G空間情報センター page.
    #[must_use]
    pub fn open_data_url(&self) -> Option<String> {
        if self.open_data_url.is_empty() {
            geospatialjp_url(&self.city_code, &self.city_name_en, self.year_int())
        } else {
            Some(self.open_data_url.clone())
        }
    }

    fn has_required_fields(&self) -> bool {
        !self.prefecture.is_empty()
            && !self.city_name.is_empty()
            && AreaCode::new(self.city_code.as_str()).is_valid()
    }

    /// Builds the prefecture of the record, if the required fields are present.
    #[must_use]
    pub fn to_prefecture(&self) -> Option<Prefecture> {
        if !self.has_required_fields() {
            return None;
        }
        let code = AreaCode::new(self.city_code.as_str()).prefecture_code();
        Some(Prefecture::new(code, self.prefecture.as_str()))
    }

    /// Builds the city of the record. Records carrying a bare prefecture code have none.
    #[must_use]
    pub fn to_city(&self, prefecture: &Prefecture) -> Option<City> {
        let code = AreaCode::new(self.city_code.as_str());
        if !self.has_required_fields() || code.is_prefecture_code() {
            return None;
        }
        Some(City::new(code, self.city_name.as_str(), prefecture))
    }
}

/// A plateau feature record: the data of one feature type for one city.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlateauFeatureItem {
    pub id: String,
    /// Id of the city record.
    pub city: String,
    #[serde(deserialize_with = "asset_url")]
    pub citygml: Option<String>,
    #[serde(deserialize_with = "asset_urls")]
    pub data: Vec<String>,
    pub desc: String,
    pub items: Vec<PlateauFeatureItemDatum>,
    /// Dictionary text, see [`Dic`].
    pub dic: String,
    #[serde(deserialize_with = "asset_url")]
    pub maxlod: Option<String>,
    /// Slash separated group path.
    pub group: String,
    pub sample: bool,
}

impl PlateauFeatureItem {
    /// Parses the dictionary text of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the dictionary is not valid JSON.
    pub fn read_dic(&self) -> Result<Dic, serde_json::Error> {
        Dic::parse(&self.dic)
    }
}

/// One entry of a feature record's group list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlateauFeatureItemDatum {
    pub id: String,
    #[serde(deserialize_with = "asset_urls")]
    pub data: Vec<String>,
    pub name: String,
    pub desc: String,
    pub key: String,
    pub group: String,
}

/// Assets of one related type within a related record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelatedItemDatum {
    pub id: String,
    #[serde(deserialize_with = "asset_urls")]
    pub asset: Vec<String>,
    #[serde(alias = "converted", deserialize_with = "asset_urls")]
    pub conv: Vec<String>,
    pub description: String,
}

/// A related record: the related datasets of one city, keyed by type code.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelatedItem {
    pub id: String,
    pub city: String,
    #[serde(deserialize_with = "asset_url")]
    pub merged: Option<String>,
    #[serde(deserialize_with = "tag_name")]
    pub status: Option<String>,
    /// Entries per related type, read out of `extra` by [`RelatedItem::read_types`].
    #[serde(skip)]
    pub items: HashMap<String, RelatedItemDatum>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RelatedItem {
    /// Decodes the entries of the given related type codes.
    pub fn read_types<'a>(&mut self, codes: impl IntoIterator<Item = &'a str>, warnings: &mut Vec<String>) {
        for code in codes {
            let Some(value) = self.extra.get(code).filter(|v| !v.is_null()) else {
                continue;
            };
            match RelatedItemDatum::deserialize(value) {
                Ok(datum) => {
                    self.items.insert(code.to_string(), datum);
                },
                Err(e) => warnings.push(format!("related {}: invalid {code}: {e}", self.id)),
            }
        }
    }

    /// GA if the city publishes its related data, beta if the record is ready for review.
    #[must_use]
    pub fn stage(&self, city: &CityItem) -> Stage {
        if city.related_public {
            Stage::Ga
        } else if self.status.as_deref() == Some(STATUS_READY) {
            Stage::Beta
        } else {
            Stage::Alpha
        }
    }
}

/// A generic dataset record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenericItem {
    pub id: String,
    pub city: String,
    pub name: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_en: String,
    pub items: Vec<GenericItemDataset>,
    pub open_data_url: String,
    /// Generic type code or name.
    pub category: String,
    #[serde(deserialize_with = "tag_name")]
    pub status: Option<String>,
    pub public: bool,
    #[serde(rename = "use-ar")]
    pub use_ar: bool,
}

impl GenericItem {
    #[must_use]
    pub fn stage(&self) -> Stage {
        if self.public {
            Stage::Ga
        } else if self.status.as_deref() == Some(STATUS_READY) {
            Stage::Beta
        } else {
            Stage::Alpha
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenericItemDataset {
    pub id: String,
    #[serde(alias = "item_name")]
    pub name: String,
    #[serde(deserialize_with = "asset_url")]
    pub data: Option<String>,
    pub desc: String,
    /// External URL used when no asset is attached.
    pub url: String,
    pub format: String,
    /// Comma separated layer names.
    pub layer: String,
}

/// A sample CityGML package of one feature type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SampleItem {
    pub id: String,
    pub city: String,
    pub feature_type: String,
    #[serde(deserialize_with = "asset_url")]
    pub citygml: Option<String>,
    #[serde(deserialize_with = "asset_url")]
    pub maxlod: Option<String>,
}

/// The CityGML index record of a city.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeospatialjpDataItem {
    pub id: String,
    pub city: String,
    #[serde(deserialize_with = "asset_url")]
    pub citygml: Option<String>,
    #[serde(deserialize_with = "asset_url")]
    pub maxlod: Option<String>,
}

/// All typed records of one tenant, ready for conversion.
#[derive(Debug, Clone)]
pub struct AllData {
    /// Project (tenant) name.
    pub name: String,
    /// Registration year of the snapshot.
    pub year: i32,
    pub feature_types: FeatureTypes,
    pub specs: Vec<PlateauSpec>,
    pub city: Vec<CityItem>,
    /// Feature records keyed by feature type code.
    pub plateau: IndexMap<String, Vec<PlateauFeatureItem>>,
    pub related: Vec<RelatedItem>,
    pub generic: Vec<GenericItem>,
    pub sample: Vec<SampleItem>,
    pub geospatialjp: Vec<GeospatialjpDataItem>,
    /// Records that failed to decode.
    pub warnings: Vec<String>,
}

impl AllData {
    /// Creates an empty record set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        year: i32,
        feature_types: FeatureTypes,
        specs: Vec<PlateauSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            year,
            feature_types,
            specs,
            city: vec![],
            plateau: IndexMap::new(),
            related: vec![],
            generic: vec![],
            sample: vec![],
            geospatialjp: vec![],
            warnings: vec![],
        }
    }

    /// Decodes the raw records of a tenant.
    ///
    /// City records without year or spec get the configured defaults and
    /// generic records without category get [`DEFAULT_GENERIC_CATEGORY`].
    #[must_use]
    pub fn decode(mut self, raw: &RawRecords, config: &CatalogConfig) -> Self {
        let mut warnings = vec![];

        self.city = decode_model(raw, CITY_MODEL, &mut warnings);
        for city in &mut self.city {
            if city.year.is_empty() {
                city.year.clone_from(&config.default_city_year);
            }
            if city.spec.is_empty() {
                city.spec.clone_from(&config.default_spec);
            }
        }

        for code in self.feature_types.plateau_codes() {
            let items: Vec<PlateauFeatureItem> = decode_model(raw, code, &mut warnings);
            if !items.is_empty() {
                self.plateau.insert(code.to_string(), items);
            }
        }

        self.related = decode_model(raw, RELATED_MODEL, &mut warnings);
        for item in &mut self.related {
            item.read_types(self.feature_types.related.iter().map(|t| t.code), &mut warnings);
        }

        self.generic = decode_model(raw, GENERIC_MODEL, &mut warnings);
        for item in &mut self.generic {
            if item.category.is_empty() {
                item.category = DEFAULT_GENERIC_CATEGORY.to_string();
            }
        }

        self.sample = decode_model(raw, SAMPLE_MODEL, &mut warnings);
        self.geospatialjp = decode_model(raw, GEOSPATIALJP_DATA_MODEL, &mut warnings);

        debug!(
            "decoded {}: {} cities, {} feature records, {} related, {} generic, {} samples",
            self.name,
            self.city.len(),
            self.plateau.values().map(Vec::len).sum::<usize>(),
            self.related.len(),
            self.generic.len(),
            self.sample.len()
        );

        self.warnings = warnings;
        self
    }

    /// Looks up a city record by id.
    #[must_use]
    pub fn city_item(&self, id: &str) -> Option<&CityItem> {
        self.city.iter().find(|c| c.id == id)
    }
}

fn decode_model<T: DeserializeOwned>(raw: &RawRecords, model: &str, warnings: &mut Vec<String>) -> Vec<T> {
    let key = model_key(model);
    let Some(values) = raw.get(&key) else {
        return vec![];
    };

    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match T::deserialize(value) {
            Ok(item) => Some(item),
            Err(e) => {
                let id = value.get("id").and_then(Value::as_str).unwrap_or_default();
                warnings.push(format!("{key}[{i}] {id}: invalid item: {e}"));
                None
            },
        })
        .collect()
}
