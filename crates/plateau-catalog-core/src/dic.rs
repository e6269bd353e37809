//! Feature item dictionaries.
//!
//! Each feature item may carry a JSON dictionary mapping lookup keys (ward
//! codes, river reaches, urban planning classes...) to display metadata:
//!
//! ```json
//! { "admin": [{ "code": 11112, "description": "bar市 hoge区" }],
//!   "fld": [{ "name": "tamagawa_l1", "description": "多摩川", "scale": "計画規模" }] }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::feature_types::{URF_CODE, find_urf_feature_type};

/// Dictionary section listing the wards of a city.
pub const ADMIN_KEY: &str = "admin";

/// A parsed dictionary, keyed by section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Dic(HashMap<String, Vec<DicEntry>>);

/// One dictionary entry. Which fields are set depends on the section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DicEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    pub description: String,
    pub admin: String,
    /// Flood scale (`計画規模`, `想定最大規模`, `l1`...)
    pub scale: String,
    pub suffix: String,
    pub suffix_description: String,
    pub order: Option<i32>,
}

/// Accepts a string or a number and keeps its text.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| format!("{f:.6}")).unwrap_or_default(),
        },
        _ => String::new(),
    })
}

impl Dic {
    /// Parses dictionary text. Empty text gives an empty dictionary.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of entry lists.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn entries(&self, key: &str) -> &[DicEntry] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    /// Finds an entry of a section by name or code.
    #[must_use]
    pub fn find_entry(&self, key: &str, name: &str) -> Option<&DicEntry> {
        self.entries(key)
            .iter()
            .find(|e| e.name == name || e.code == name)
    }

    /// Finds an entry, falling back to the built-in urban planning classes for
    /// the `urf` section and to a placeholder entry otherwise.
    ///
    /// The flag tells whether a real entry was found.
    #[must_use]
    pub fn find_entry_or_default(&self, key: &str, name: &str) -> (DicEntry, bool) {
        let urf = (key == URF_CODE)
            .then(|| find_urf_feature_type(name))
            .flatten();

        if let Some(entry) = self.find_entry(key, name) {
            let mut entry = entry.clone();
            if entry.order.is_none() {
                entry.order = urf.map(|(order, _)| order);
            }
            return (entry, true);
        }

        if let Some((order, description)) = urf {
            return (
                DicEntry {
                    name: name.to_string(),
                    code: name.to_string(),
                    description: description.to_string(),
                    order: Some(order),
                    ..DicEntry::default()
                },
                true,
            );
        }

        (
            DicEntry {
                name: name.to_string(),
                code: name.to_string(),
                description: name.to_string(),
                ..DicEntry::default()
            },
            false,
        )
    }

    /// Wards listed in the `admin` section as `(code, name)`.
    ///
    /// The ward name is the description after its first space (`"bar市 hoge区"`
    /// gives `"hoge区"`). Entries without code or description are skipped.
    #[must_use]
    pub fn wards(&self) -> Vec<(String, String)> {
        self.entries(ADMIN_KEY)
            .iter()
            .filter(|e| !e.code.is_empty() && !e.description.is_empty())
            .map(|e| {
                let name = match e.description.split_once(' ') {
                    Some((_, name)) if !name.is_empty() => name,
                    _ => e.description.as_str(),
                };
                (e.code.clone(), name.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DIC: &str = r#"{
        "admin": [
            { "code": 11112, "description": "bar市 hoge区" },
            { "code": "11113", "description": "fuga区" },
            { "code": "", "description": "skipped" }
        ],
        "fld": [
            { "name": "tamagawa_l1", "description": "多摩川", "admin": "国", "scale": "計画規模", "order": 2 }
        ],
        "urf": [
            { "name": "UseDistrict", "description": "用途地域（独自）" }
        ]
    }"#;

    #[test]
    fn test_parse_and_wards() {
        let dic = Dic::parse(DIC);
        assert!(dic.is_ok());
        let dic = dic.unwrap_or_default();
        assert_eq!(
            dic.wards(),
            vec![
                ("11112".to_string(), "hoge区".to_string()),
                ("11113".to_string(), "fuga区".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(Dic::parse("  ").ok(), Some(Dic::default()));
        assert!(Dic::parse("not json").is_err());
        assert!(Dic::parse(r#"{"fld": {"name": 1}}"#).is_err());
    }

    #[test]
    fn test_find_entry() {
        let dic = Dic::parse(DIC).unwrap_or_default();
        let (entry, found) = dic.find_entry_or_default("fld", "tamagawa_l1");
        assert!(found);
        assert_eq!(entry.description, "多摩川");
        assert_eq!(entry.order, Some(2));

        let (entry, found) = dic.find_entry_or_default("fld", "sumida_l1");
        assert!(!found);
        assert_eq!(entry.description, "sumida_l1");
        assert_eq!(entry.code, "sumida_l1");

        assert!(dic.find_entry("admin", "11112").is_some());
    }

    #[test]
    fn test_urf_fallback() {
        let dic = Dic::parse(DIC).unwrap_or_default();

        let (entry, found) = dic.find_entry_or_default("urf", "UseDistrict");
        assert!(found);
        assert_eq!(entry.description, "用途地域（独自）");
        assert_eq!(entry.order, Some(4));

        let (entry, found) = dic.find_entry_or_default("urf", "UrbanPlanningArea");
        assert!(found);
        assert_eq!(entry.description, "都市計画区域");
        assert_eq!(entry.order, Some(1));

        let (_, found) = Dic::default().find_entry_or_default("urf", "Nope");
        assert!(!found);
    }
}
