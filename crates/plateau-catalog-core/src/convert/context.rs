//! Lookup tables shared by the conversion passes.

use std::collections::{BTreeSet, HashMap};

use plateau_catalog_common::{
    Admin, Area, AreaCode, AreaType, Areas, City, DatasetArea, Prefecture, Stage, Ward,
};

use crate::record::CityItem;

/// Areas known to a conversion, keyed by city record id and area code.
#[derive(Debug, Default)]
pub struct ConvContext<'a> {
    pub registration_year: i32,
    city_items: HashMap<&'a str, &'a CityItem>,
    prefs: HashMap<AreaCode, Prefecture>,
    cities: HashMap<AreaCode, City>,
    wards: HashMap<AreaCode, Vec<Ward>>,
    years: BTreeSet<i32>,
}

impl<'a> ConvContext<'a> {
    #[must_use]
    pub fn new(registration_year: i32) -> Self {
        Self {
            registration_year,
            ..Self::default()
        }
    }

    /// Registers a visible city record and appends its areas to `areas` once.
    pub fn add_city(&mut self, item: &'a CityItem, areas: &mut Areas) -> bool {
        if !item.is_public_or_beta() {
            return false;
        }
        let Some(pref) = item.to_prefecture() else {
            return false;
        };
        let city = item.to_city(&pref);

        self.city_items.insert(item.id.as_str(), item);
        if let y @ 1.. = item.year_int() {
            self.years.insert(y);
        }

        if !self.prefs.contains_key(&pref.code) {
            areas.append(AreaType::Prefecture, [Area::Prefecture(pref.clone())]);
            self.prefs.insert(pref.code.clone(), pref);
        }

        if let Some(city) = city {
            if !self.cities.contains_key(&city.code) {
                areas.append(AreaType::City, [Area::City(city.clone())]);
                self.cities.insert(city.code.clone(), city);
            }
        }

        true
    }

    /// Registers wards of a city, skipping codes already known.
    pub fn add_wards(&mut self, wards: Vec<Ward>, areas: &mut Areas) {
        for ward in wards {
            let list = self.wards.entry(ward.city_code.clone()).or_default();
            if list.iter().any(|w| w.code == ward.code) {
                continue;
            }
            areas.append(AreaType::Ward, [Area::Ward(ward.clone())]);
            list.push(ward);
        }
    }

    /// Sorted distinct data years of the registered cities.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.years.iter().copied().collect()
    }

    /// Resolves the areas of a city record id.
    #[must_use]
    pub fn area(&self, city_item_id: &str) -> Option<AreaContext<'a>> {
        let item = *self.city_items.get(city_item_id)?;
        let code = AreaCode::new(item.city_code.as_str());
        let pref = self.prefs.get(&code.prefecture_code())?.clone();
        let city = self.cities.get(&code).cloned();
        let wards = self.wards.get(&code).cloned().unwrap_or_default();

        Some(AreaContext {
            city_item: item,
            pref,
            city,
            wards,
        })
    }
}

/// The areas of one city record.
#[derive(Debug, Clone)]
pub struct AreaContext<'a> {
    pub city_item: &'a CityItem,
    pub pref: Prefecture,
    /// `None` for records carrying a bare prefecture code.
    pub city: Option<City>,
    pub wards: Vec<Ward>,
}

impl AreaContext<'_> {
    /// City code, else prefecture code.
    #[must_use]
    pub fn code(&self) -> &AreaCode {
        self.city.as_ref().map_or(&self.pref.code, |c| &c.code)
    }

    /// City name, else prefecture name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.city.as_ref().map_or(&self.pref.name, |c| &c.name)
    }

    /// Anchors a dataset to the city (or prefecture), or to one of its wards.
    #[must_use]
    pub fn dataset_area(&self, ward: Option<&Ward>) -> DatasetArea {
        DatasetArea {
            prefecture_id: self.pref.id.clone(),
            prefecture_code: self.pref.code.clone(),
            city_id: self.city.as_ref().map(|c| c.id.clone()),
            city_code: self.city.as_ref().map(|c| c.code.clone()),
            ward_id: ward.map(|w| w.id.clone()),
            ward_code: ward.map(|w| w.code.clone()),
        }
    }

    #[must_use]
    pub fn find_ward(&self, code: &str) -> Option<&Ward> {
        self.wards.iter().find(|w| w.code.as_str() == code)
    }
}

/// Builds an admin blob linking a record to the CMS.
#[must_use]
pub fn new_admin(stage: Stage, cms_prefix: Option<&str>, record_id: &str) -> Option<Admin> {
    let cms_url = cms_prefix
        .filter(|_| !record_id.is_empty())
        .map(|prefix| format!("{prefix}{record_id}"));
    Admin::new(stage, cms_url)
}

/// Builds a dataset name: `<type>[ <subname>]（<area>）`.
///
/// A type name already ending with the area suffix is not suffixed twice.
#[must_use]
pub fn standard_item_name(name: &str, subname: Option<&str>, area_name: &str) -> String {
    let (name, suffix) = if area_name.is_empty() {
        (name, String::new())
    } else {
        let suffix = format!("（{area_name}）");
        (name.strip_suffix(suffix.as_str()).unwrap_or(name), suffix)
    };

    match subname.filter(|s| !s.is_empty()) {
        Some(subname) => format!("{name} {subname}{suffix}"),
        None => format!("{name}{suffix}"),
    }
}

/// Builds a dataset id key: `<area>_<type>[_<subcode>]`.
#[must_use]
pub fn standard_item_id(type_code: &str, area_code: &AreaCode, subcode: Option<&str>) -> String {
    match subcode.filter(|s| !s.is_empty()) {
        Some(subcode) => format!("{area_code}_{type_code}_{subcode}"),
        None => format!("{area_code}_{type_code}"),
    }
}
