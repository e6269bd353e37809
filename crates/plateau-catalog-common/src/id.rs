//! Typed catalog identifiers.
//!
//! Every node in the catalog is addressed by an [`Id`] of the form
//! `<prefix>_<key>`, where the prefix encodes the node kind. The kind can always
//! be recovered from the id itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of node an [`Id`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    Prefecture,
    City,
    Ward,
    Dataset,
    DatasetItem,
    DatasetType,
    PlateauSpec,
    CityGml,
}

impl IdType {
    /// All id types in declaration order.
    pub const ALL: [IdType; 8] = [
        IdType::Prefecture,
        IdType::City,
        IdType::Ward,
        IdType::Dataset,
        IdType::DatasetItem,
        IdType::DatasetType,
        IdType::PlateauSpec,
        IdType::CityGml,
    ];

    /// Returns the id prefix for this type.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            IdType::Prefecture => "p",
            IdType::City => "c",
            IdType::Ward => "w",
            IdType::Dataset => "d",
            IdType::DatasetItem => "di",
            IdType::DatasetType => "dt",
            IdType::PlateauSpec => "ps",
            IdType::CityGml => "cg",
        }
    }

    /// Looks up an id type by its prefix.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.prefix() == prefix)
    }
}

/// A catalog node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Builds `<prefix>_<key>`.
    #[must_use]
    pub fn new(key: impl AsRef<str>, ty: IdType) -> Self {
        Self(format!("{}_{}", ty.prefix(), key.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the node kind encoded in the prefix, if known.
    #[must_use]
    pub fn id_type(&self) -> Option<IdType> {
        let (prefix, _) = self.0.split_once('_')?;
        IdType::from_prefix(prefix)
    }

    /// Returns the part after the prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        self.0.split_once('_').map_or("", |(_, key)| key)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
