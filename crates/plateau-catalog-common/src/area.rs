//! Administrative areas: prefectures, cities and wards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::id::{Id, IdType};

/// A numeric area code. Prefecture codes have two digits, city and ward codes five.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaCode(String);

impl AreaCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-digit prefecture code this code belongs to.
    #[must_use]
    pub fn prefecture_code(&self) -> AreaCode {
        match self.0.get(..2) {
            Some(prefix) => Self(prefix.to_string()),
            None => self.clone(),
        }
    }

    /// Returns `true` if this is a bare prefecture code.
    #[must_use]
    pub fn is_prefecture_code(&self) -> bool {
        self.0.len() == 2
    }

    /// Returns `true` for non-empty, all-digit codes of at least two characters.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.len() >= 2 && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AreaCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AreaCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The level of an area in the hierarchy, ordered from broadest to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    Prefecture,
    City,
    Ward,
}

impl AreaType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            AreaType::Prefecture => "prefecture",
            AreaType::City => "city",
            AreaType::Ward => "ward",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefecture {
    pub id: Id,
    pub code: AreaCode,
    pub name: String,
}

impl Prefecture {
    #[must_use]
    pub fn new(code: AreaCode, name: impl Into<String>) -> Self {
        Self {
            id: Id::new(code.as_str(), IdType::Prefecture),
            code,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: Id,
    pub code: AreaCode,
    pub name: String,
    pub prefecture_id: Id,
    pub prefecture_code: AreaCode,
    /// Id of the city's CityGML aggregate.
    pub citygml_id: Option<Id>,
}

impl City {
    #[must_use]
    pub fn new(code: AreaCode, name: impl Into<String>, prefecture: &Prefecture) -> Self {
        Self {
            id: Id::new(code.as_str(), IdType::City),
            citygml_id: Some(Id::new(code.as_str(), IdType::CityGml)),
            code,
            name: name.into(),
            prefecture_id: prefecture.id.clone(),
            prefecture_code: prefecture.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub id: Id,
    pub code: AreaCode,
    pub name: String,
    pub prefecture_id: Id,
    pub prefecture_code: AreaCode,
    pub city_id: Id,
    pub city_code: AreaCode,
}

impl Ward {
    #[must_use]
    pub fn new(code: AreaCode, name: impl Into<String>, city: &City) -> Self {
        Self {
            id: Id::new(code.as_str(), IdType::Ward),
            code,
            name: name.into(),
            prefecture_id: city.prefecture_id.clone(),
            prefecture_code: city.prefecture_code.clone(),
            city_id: city.id.clone(),
            city_code: city.code.clone(),
        }
    }
}

/// An area of any level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Area {
    Prefecture(Prefecture),
    City(City),
    Ward(Ward),
}

impl Area {
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            Area::Prefecture(p) => &p.id,
            Area::City(c) => &c.id,
            Area::Ward(w) => &w.id,
        }
    }

    #[must_use]
    pub fn code(&self) -> &AreaCode {
        match self {
            Area::Prefecture(p) => &p.code,
            Area::City(c) => &c.code,
            Area::Ward(w) => &w.code,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Area::Prefecture(p) => &p.name,
            Area::City(c) => &c.name,
            Area::Ward(w) => &w.name,
        }
    }

    #[must_use]
    pub fn area_type(&self) -> AreaType {
        match self {
            Area::Prefecture(_) => AreaType::Prefecture,
            Area::City(_) => AreaType::City,
            Area::Ward(_) => AreaType::Ward,
        }
    }

    /// Code of the immediate parent area, if any.
    #[must_use]
    pub fn parent_code(&self) -> Option<&AreaCode> {
        match self {
            Area::Prefecture(_) => None,
            Area::City(c) => Some(&c.prefecture_code),
            Area::Ward(w) => Some(&w.city_code),
        }
    }

    /// Codes of every ancestor, nearest first.
    #[must_use]
    pub fn ancestor_codes(&self) -> Vec<&AreaCode> {
        match self {
            Area::Prefecture(_) => vec![],
            Area::City(c) => vec![&c.prefecture_code],
            Area::Ward(w) => vec![&w.city_code, &w.prefecture_code],
        }
    }
}

/// Areas of a snapshot grouped by level.
#[derive(Debug, Clone, Default)]
pub struct Areas(BTreeMap<AreaType, Vec<Area>>);

impl Areas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, ty: AreaType, areas: impl IntoIterator<Item = Area>) {
        self.0.entry(ty).or_default().extend(areas);
    }

    /// All areas, prefectures first, then cities, then wards.
    pub fn all(&self) -> impl Iterator<Item = &Area> {
        self.0.values().flatten()
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
    pub fn find_by_code(&self, code: &AreaCode) -> Option<&Area> {
        self.all().find(|a| a.code() == code)
    }

    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&Area> {
        self.all().find(|a| a.id() == id)
    }
}
