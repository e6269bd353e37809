//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting catalog query results in a human-readable format.

use serde::Serialize;
use tabled::{Table, Tabled};

use plateau_catalog_common::{Area, Dataset, DatasetType, PlateauSpec};

/// Table row representation for displaying areas.
#[derive(Tabled)]
pub struct AreaRow {
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Name")]
    pub name: String,
    /// Prefecture, city or ward.
    #[tabled(rename = "Type")]
    pub area_type: String,
    /// Code of the enclosing area, empty for prefectures.
    #[tabled(rename = "Parent")]
    pub parent: String,
}

impl From<&Area> for AreaRow {
    fn from(area: &Area) -> Self {
        Self {
            code: area.code().to_string(),
            name: area.name().to_string(),
            area_type: area.area_type().as_str().to_string(),
            parent: area.parent_code().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

/// Table row representation for displaying datasets.
#[derive(Tabled)]
pub struct DatasetRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub type_code: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    /// Most specific area code.
    #[tabled(rename = "Area")]
    pub area: String,
    #[tabled(rename = "Items")]
    pub items: usize,
    /// Publication stage, only known to admin callers.
    #[tabled(rename = "Stage")]
    pub stage: String,
}

impl From<&Dataset> for DatasetRow {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: dataset.id().to_string(),
            name: dataset.name().to_string(),
            type_code: dataset.type_code().to_string(),
            year: dataset.year(),
            area: dataset.area().most_detailed_code().to_string(),
            items: dataset.item_count(),
            stage: dataset
                .admin()
                .and_then(|a| a.stage)
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Table row representation for displaying dataset types.
#[derive(Tabled)]
pub struct DatasetTypeRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Order")]
    pub order: i32,
}

impl From<&DatasetType> for DatasetTypeRow {
    fn from(t: &DatasetType) -> Self {
        Self {
            id: t.id().to_string(),
            code: t.code().to_string(),
            name: t.name().to_string(),
            category: t.category().as_str().to_string(),
            year: t.year(),
            order: t.order(),
        }
    }
}

/// Table row representation for displaying specification versions.
#[derive(Tabled)]
pub struct SpecRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    /// Minor version names, comma separated.
    #[tabled(rename = "Versions")]
    pub versions: String,
}

impl From<&PlateauSpec> for SpecRow {
    fn from(spec: &PlateauSpec) -> Self {
        let versions: Vec<&str> = spec.minor_versions.iter().map(|m| m.name.as_str()).collect();
        Self {
            id: spec.id.to_string(),
            year: spec.year,
            versions: versions.join(", "),
        }
    }
}

/// Prints `values` as pretty JSON, or as a table of `R` rows.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_list<T, R>(values: &[T], json: bool, label: &str) -> anyhow::Result<()>
where
    T: Serialize,
    R: Tabled + for<'a> From<&'a T>,
{
    if json {
        println!("{}", serde_json::to_string_pretty(values)?);
        return Ok(());
    }

    println!("\n{label} ({} total):\n", values.len());
    let rows: Vec<R> = values.iter().map(R::from).collect();
    println!("{}", Table::new(rows));
    Ok(())
}
