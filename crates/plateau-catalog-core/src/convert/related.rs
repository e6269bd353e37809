//! Related records to related datasets.
//!
//! A related record carries, per related type, the original GeoJSON assets of
//! a city and optionally their CZML conversions. Each asset becomes one dataset
//! anchored to the city or to the ward named in its file name.

use plateau_catalog_common::{
    AreaCode, Dataset, DatasetFormat, DatasetType, Id, IdType, RelatedDataset, RelatedDatasetItem,
    Ward,
};

use super::context::{AreaContext, ConvContext, new_admin, standard_item_id, standard_item_name};
use crate::feature_types::CONVERSION_IGNORED;
use crate::name::RelatedAssetName;
use crate::record::RelatedItem;
use crate::utils::{DatasetFormatExt, name_from_url, name_without_ext};

/// Converts related records.
pub fn convert(
    items: &[RelatedItem],
    types: &[&DatasetType],
    cms_prefix: Option<&str>,
    ctx: &ConvContext<'_>,
    warnings: &mut Vec<String>,
) -> Vec<Dataset> {
    let mut res = vec![];
    for item in items {
        let Some(area) = ctx.area(&item.city) else {
            warnings.push(format!("related {}: invalid city: {}", item.id, item.city));
            continue;
        };
        res.extend(to_datasets(item, &area, types, cms_prefix, ctx.registration_year, warnings));
    }
    res
}

fn to_datasets(
    item: &RelatedItem,
    area: &AreaContext<'_>,
    types: &[&DatasetType],
    cms_prefix: Option<&str>,
    registration_year: i32,
    warnings: &mut Vec<String>,
) -> Vec<Dataset> {
    let city_code = area.code();
    let year = area.city_item.year_int();
    let admin = new_admin(item.stage(area.city_item), cms_prefix, &item.id);
    let mut res = vec![];

    for dt in types {
        let (code, type_name) = (dt.code(), dt.name());
        let Some(datum) = item.items.get(code).filter(|d| !d.asset.is_empty() || !d.conv.is_empty())
        else {
            warnings.push(format!("related {city_code}: no data for {code}"));
            continue;
        };

        let converted: &[String] = if CONVERSION_IGNORED.contains(&code) {
            &[]
        } else {
            &datum.conv
        };

        for seed in related_seeds(&datum.asset, converted, area, year, warnings) {
            let target_code = seed.ward.map_or(city_code, |w| &w.code);
            let target_name = seed.ward.map_or(area.name(), |w| w.name.as_str());
            let key = standard_item_id(code, target_code, None);
            let id = Id::new(&key, IdType::Dataset);

            let original_url = seed
                .original_url
                .as_deref()
                .zip(seed.original_format)
                .map(|(url, format)| format.asset_url(url))
                .filter(|u| !u.is_empty());

            res.push(Dataset::Related(RelatedDataset {
                name: standard_item_name(type_name, None, target_name),
                description: (!datum.description.is_empty()).then(|| datum.description.clone()),
                year,
                registration_year,
                open_data_url: area.city_item.open_data_url(),
                area: area.dataset_area(seed.ward),
                type_id: dt.id().clone(),
                type_code: code.to_string(),
                admin: admin.clone(),
                items: vec![RelatedDatasetItem {
                    id: Id::new(&key, IdType::DatasetItem),
                    name: type_name.to_string(),
                    url: seed.format.asset_url(&seed.url),
                    format: seed.format,
                    original_url,
                    original_format: seed.original_format,
                    parent_id: id.clone(),
                }],
                id,
            }));
        }
    }

    res
}

/// One converted asset, optionally paired with its original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalAndConv {
    pub original: Option<String>,
    pub converted: String,
}

/// Pairs converted assets with their originals by file name stem.
///
/// Without converted assets each original stands for itself.
#[must_use]
pub fn pair_assets(originals: &[String], converted: &[String]) -> Vec<OriginalAndConv> {
    if converted.is_empty() {
        return originals
            .iter()
            .map(|url| OriginalAndConv {
                original: None,
                converted: url.clone(),
            })
            .collect();
    }

    let stem = |url: &str| name_without_ext(&name_from_url(url)).to_string();
    converted
        .iter()
        .map(|conv| {
            let conv_stem = stem(conv);
            OriginalAndConv {
                original: originals.iter().find(|o| stem(o) == conv_stem).cloned(),
                converted: conv.clone(),
            }
        })
        .collect()
}

struct RelatedSeed<'a> {
    ward: Option<&'a Ward>,
    url: String,
    format: DatasetFormat,
    original_url: Option<String>,
    original_format: Option<DatasetFormat>,
}

fn related_seeds<'a>(
    originals: &[String],
    converted: &[String],
    area: &'a AreaContext<'_>,
    year: i32,
    warnings: &mut Vec<String>,
) -> Vec<RelatedSeed<'a>> {
    let city_code: &AreaCode = area.code();
    let mut city_added = false;
    let mut res = vec![];

    for asset in pair_assets(originals, converted) {
        let (format, original_format) = if asset.original.is_some() {
            (DatasetFormat::Czml, Some(DatasetFormat::GeoJson))
        } else {
            (DatasetFormat::GeoJson, None)
        };

        let name = name_from_url(&asset.converted);
        let Some(parsed) = RelatedAssetName::parse(&name) else {
            warnings.push(format!("related {city_code}: invalid asset name: {name}"));
            continue;
        };

        if parsed.year != 0 && parsed.year != year {
            warnings.push(format!(
                "related {city_code}: invalid year: {name}: {} should be {year}",
                parsed.year
            ));
        }

        let ward = if parsed.code == city_code.as_str() && parsed.ward_code.is_none() {
            if city_added {
                warnings.push(format!(
                    "related {city_code}: duplicated assets that have the same city code: {name}"
                ));
                continue;
            }
            city_added = true;
            None
        } else {
            let ward_code = parsed.ward_code.as_deref().unwrap_or(&parsed.code);
            let Some(ward) = area.find_ward(ward_code) else {
                warnings.push(format!(
                    "related {city_code}: ward not found: name={name}, ward={ward_code}"
                ));
                continue;
            };
            Some(ward)
        };

        res.push(RelatedSeed {
            ward,
            url: asset.converted,
            format,
            original_url: asset.original,
            original_format,
        });
    }

    res
}
