//! Generic records to generic datasets.

use plateau_catalog_common::{
    Dataset, DatasetType, GenericDataset, GenericDatasetItem, Id, IdType,
};

use super::context::{AreaContext, ConvContext, new_admin};
use crate::record::{GenericItem, GenericItemDataset};
use crate::utils::{DatasetFormatExt, dataset_format_from_or_detect, layer_names_from};

/// Converts generic records.
pub fn convert(
    items: &[GenericItem],
    types: &[&DatasetType],
    cms_prefix: Option<&str>,
    ctx: &ConvContext<'_>,
    warnings: &mut Vec<String>,
) -> Vec<Dataset> {
    let mut res = vec![];
    for item in items {
        let Some(area) = ctx.area(&item.city) else {
            warnings.push(format!("generic {}: invalid city: {}", item.id, item.city));
            continue;
        };

        let Some(dt) = find_type(types, &item.category) else {
            warnings.push(format!("generic {}: unknown category: {}", item.id, item.category));
            continue;
        };

        let admin = new_admin(item.stage(), cms_prefix, &item.id);
        if let Some(dataset) = to_dataset(item, dt, &area, ctx.registration_year, warnings) {
            res.push(Dataset::Generic(GenericDataset { admin, ..dataset }));
        }
    }
    res
}

/// Finds a generic type by code or display name.
fn find_type<'a>(types: &[&'a DatasetType], category: &str) -> Option<&'a DatasetType> {
    types
        .iter()
        .find(|t| t.code() == category || t.name() == category)
        .copied()
}

fn to_dataset(
    item: &GenericItem,
    dt: &DatasetType,
    area: &AreaContext<'_>,
    registration_year: i32,
    warnings: &mut Vec<String>,
) -> Option<GenericDataset> {
    let id = Id::new(&item.id, IdType::Dataset);

    let items: Vec<GenericDatasetItem> = item
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, datum)| to_item(item, i, datum, &id, warnings))
        .collect();

    if items.is_empty() {
        warnings.push(format!("generic {}: no items", item.id));
        return None;
    }

    let open_data_url = Some(item.open_data_url.clone())
        .filter(|u| !u.is_empty())
        .or_else(|| area.city_item.open_data_url());

    Some(GenericDataset {
        name: item.name.clone(),
        description: (!item.desc.is_empty()).then(|| item.desc.clone()),
        year: area.city_item.year_int(),
        registration_year,
        open_data_url,
        area: area.dataset_area(None),
        type_id: dt.id().clone(),
        type_code: dt.code().to_string(),
        admin: None,
        groups: vec![],
        items,
        id,
    })
}

fn to_item(
    item: &GenericItem,
    index: usize,
    datum: &GenericItemDataset,
    parent_id: &Id,
    warnings: &mut Vec<String>,
) -> Option<GenericDatasetItem> {
    let url = datum.data.as_deref().unwrap_or(&datum.url);
    if url.is_empty() {
        warnings.push(format!("generic {}[{index}]: no url", item.id));
        return None;
    }

    let Some(format) = dataset_format_from_or_detect(&datum.format, url) else {
        warnings.push(format!(
            "generic {}[{index}]: unknown format: {}",
            item.id, datum.format
        ));
        return None;
    };

    let key = if datum.id.is_empty() {
        format!("{}_{index}", item.id)
    } else {
        format!("{}_{}", item.id, datum.id)
    };

    Some(GenericDatasetItem {
        id: Id::new(key, IdType::DatasetItem),
        name: datum.name.clone(),
        url: format.asset_url(url),
        format,
        layers: layer_names_from(&datum.layer),
        parent_id: parent_id.clone(),
    })
}
