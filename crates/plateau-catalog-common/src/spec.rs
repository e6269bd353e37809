//! PLATEAU standard specification versions.

use serde::{Deserialize, Serialize};

use crate::id::{Id, IdType};

/// A major version of the PLATEAU standard specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauSpec {
    /// `ps_<major>`
    pub id: Id,
    pub major_version: i32,
    pub year: i32,
    pub minor_versions: Vec<PlateauSpecMinor>,
}

/// A minor version such as `第3.2版`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateauSpecMinor {
    /// `ps_<major>.<minor>`
    pub id: Id,
    /// Display name, e.g. `第3.2版`
    pub name: String,
    /// Version number, e.g. `3.2`
    pub version: String,
    pub major_version: i32,
    pub year: i32,
    pub parent_id: Id,
}

impl PlateauSpec {
    /// Builds a major version and its minors from minor version numbers like `"3.2"`.
    #[must_use]
    pub fn new(major_version: i32, year: i32, minors: &[&str]) -> Self {
        let id = Id::new(major_version.to_string(), IdType::PlateauSpec);
        let minor_versions = minors
            .iter()
            .map(|v| PlateauSpecMinor {
                id: Id::new(v, IdType::PlateauSpec),
                name: format!("第{v}版"),
                version: (*v).to_string(),
                major_version,
                year,
                parent_id: id.clone(),
            })
            .collect();
        Self {
            id,
            major_version,
            year,
            minor_versions,
        }
    }

    /// Finds a minor version by display name (`第3.2版`) or number (`3.2`).
    #[must_use]
    pub fn minor(&self, name: &str) -> Option<&PlateauSpecMinor> {
        let number = spec_number(name);
        self.minor_versions
            .iter()
            .find(|m| m.name == name || m.version == number)
    }
}

/// Finds a minor version across all majors.
#[must_use]
pub fn find_spec_minor<'a>(specs: &'a [PlateauSpec], name: &str) -> Option<&'a PlateauSpecMinor> {
    specs.iter().find_map(|s| s.minor(name))
}

/// Normalises a spec reference to its bare number: `ps_3.2`, `第3.2版` and `3.2` all give `3.2`.
#[must_use]
pub fn spec_number(spec: &str) -> &str {
    let s = spec.strip_prefix("ps_").unwrap_or(spec);
    let s = s.strip_prefix("第").unwrap_or(s);
    s.strip_suffix("版").unwrap_or(s)
}

/// Major part of a spec number: `3.2` gives `3`.
#[must_use]
pub fn major_version(spec: &str) -> &str {
    spec.split_once('.').map_or(spec, |(major, _)| major)
}
