//! Privileged metadata attached to datasets and CityGML aggregates.
//!
//! The admin blob is never shown to unprivileged callers; repositories strip it
//! unless the query context bypasses redaction.

use serde::{Deserialize, Serialize};

use crate::id::Id;

/// Publication stage of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Internal only.
    Alpha,
    /// Visible to reviewers.
    Beta,
    /// Generally available.
    Ga,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Alpha => "alpha",
            Stage::Beta => "beta",
            Stage::Ga => "ga",
        }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Stage::Ga)
    }
}

/// Typed admin metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Admin {
    /// Non-GA stage. `None` means the record is generally available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Link to the record in the CMS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_url: Option<String>,
    /// Set on datasets relocated from sample data.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sample: bool,
    /// Original plateau dataset type of a relocated sample dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plateau_type_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plateau_type_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citygml_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max_lod_urls: Vec<String>,
}

impl Admin {
    /// Builds an admin blob carrying a stage and a CMS link. Returns `None` when both are absent.
    #[must_use]
    pub fn new(stage: Stage, cms_url: Option<String>) -> Option<Self> {
        let admin = Self {
            stage: (!stage.is_public()).then_some(stage),
            cms_url: cms_url.filter(|u| !u.is_empty()),
            ..Self::default()
        };
        (!admin.is_empty()).then_some(admin)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Returns the stage of an optional admin blob.
#[must_use]
pub fn stage_of(admin: Option<&Admin>) -> Option<Stage> {
    admin.and_then(|a| a.stage)
}

/// Returns `true` if a record with the given admin blob may be shown to a caller
/// admitting `allowed` stages. Records without a stage are always visible.
#[must_use]
pub fn is_stage_allowed(admin: Option<&Admin>, allowed: &[Stage]) -> bool {
    match stage_of(admin) {
        None => true,
        Some(stage) => allowed.contains(&stage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_admin() {
        assert_eq!(Admin::new(Stage::Ga, None), None);
        assert_eq!(Admin::new(Stage::Ga, Some(String::new())), None);

        let admin = Admin::new(Stage::Beta, None);
        assert_eq!(admin.as_ref().and_then(|a| a.stage), Some(Stage::Beta));

        let admin = Admin::new(Stage::Ga, Some("https://cms/x".to_string()));
        assert_eq!(admin.as_ref().and_then(|a| a.stage), None);
        assert_eq!(
            admin.and_then(|a| a.cms_url).as_deref(),
            Some("https://cms/x")
        );
    }

    #[test]
    fn test_stage_allowed() {
        let beta = Admin::new(Stage::Beta, None);
        assert!(is_stage_allowed(None, &[]));
        assert!(!is_stage_allowed(beta.as_ref(), &[]));
        assert!(is_stage_allowed(beta.as_ref(), &[Stage::Beta]));
        assert!(!is_stage_allowed(beta.as_ref(), &[Stage::Alpha]));
    }

    #[test]
    fn test_admin_serialization_skips_empty() {
        let admin = Admin::new(Stage::Alpha, None);
        let json = serde_json::to_string(&admin).unwrap_or_default();
        assert_eq!(json, r#"{"stage":"alpha"}"#);
    }
}
