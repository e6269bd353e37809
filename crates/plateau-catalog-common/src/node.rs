//! Polymorphic catalog nodes returned by id lookups.

use serde::Serialize;

use crate::area::Area;
use crate::citygml::CityGmlDataset;
use crate::dataset::{Dataset, DatasetItem};
use crate::dataset_type::DatasetType;
use crate::id::Id;
use crate::spec::{PlateauSpec, PlateauSpecMinor};

/// Any node addressable by an [`Id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Area(Area),
    DatasetType(DatasetType),
    Dataset(Dataset),
    DatasetItem(DatasetItem),
    PlateauSpec(PlateauSpec),
    PlateauSpecMinor(PlateauSpecMinor),
    CityGml(CityGmlDataset),
}

impl Node {
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            Node::Area(a) => a.id(),
            Node::DatasetType(t) => t.id(),
            Node::Dataset(d) => d.id(),
            Node::DatasetItem(i) => i.id(),
            Node::PlateauSpec(s) => &s.id,
            Node::PlateauSpecMinor(s) => &s.id,
            Node::CityGml(c) => &c.id,
        }
    }

    /// Year used to pick the latest vintage of a node. Nodes without a year report `0`.
    #[must_use]
    pub fn year(&self) -> i32 {
        match self {
            Node::DatasetType(t) => t.year(),
            Node::Dataset(d) => d.year(),
            Node::PlateauSpec(s) => s.year,
            Node::PlateauSpecMinor(s) => s.year,
            Node::CityGml(c) => c.year,
            Node::Area(_) | Node::DatasetItem(_) => 0,
        }
    }

    /// Applies a display order to dataset type nodes; other nodes are left untouched.
    pub fn set_order(&mut self, order: i32) {
        if let Node::DatasetType(t) = self {
            t.set_order(order);
        }
    }
}
