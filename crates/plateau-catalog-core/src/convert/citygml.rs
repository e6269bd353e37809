//! Per-city CityGML aggregates.

use indexmap::IndexMap;
use plateau_catalog_common::{
    Admin, AreaCode, CityGmlDataset, Dataset, DatasetTypeCategory, Id, IdType, PlateauSpec,
    find_spec_minor,
};

use super::context::ConvContext;
use crate::feature_types::FeatureTypes;
use crate::record::{GeospatialjpDataItem, SampleItem};

/// Builds one aggregate per city from its CityGML index record, then folds in
/// the sample packages targeting the same city.
pub fn convert(
    index: &[GeospatialjpDataItem],
    samples: &[SampleItem],
    datasets: &[Dataset],
    feature_types: &FeatureTypes,
    specs: &[PlateauSpec],
    ctx: &ConvContext<'_>,
    warnings: &mut Vec<String>,
) -> Vec<CityGmlDataset> {
    let mut res: IndexMap<String, CityGmlDataset> = IndexMap::new();

    for record in index {
        let Some(area) = ctx.area(&record.city) else {
            warnings.push(format!("citygml {}: invalid city: {}", record.id, record.city));
            continue;
        };
        let Some(city) = &area.city else {
            warnings.push(format!("citygml {}: not a city: {}", record.id, area.code()));
            continue;
        };
        let Some(url) = record.citygml.clone().filter(|u| !u.is_empty()) else {
            warnings.push(format!("citygml {}: no citygml", city.code));
            continue;
        };
        let Some(spec) = find_spec_minor(specs, &area.city_item.spec) else {
            warnings.push(format!("citygml {}: invalid spec: {}", city.code, area.city_item.spec));
            continue;
        };
        if res.contains_key(&record.city) {
            warnings.push(format!("citygml {}: duplicated record: {}", city.code, record.id));
            continue;
        }

        let mut admin = Admin::new(area.city_item.plateau_stage(None), None).unwrap_or_default();
        admin.citygml_urls.push(url.clone());
        admin.max_lod_urls.extend(record.maxlod.clone());

        res.insert(
            record.city.clone(),
            CityGmlDataset {
                id: Id::new(&city.code, IdType::CityGml),
                year: area.city_item.year_int(),
                registration_year: ctx.registration_year,
                prefecture_id: area.pref.id.clone(),
                prefecture_code: area.pref.code.clone(),
                city_id: city.id.clone(),
                city_code: city.code.clone(),
                url,
                feature_types: present_types(datasets, feature_types, &city.code),
                plateau_spec_minor_id: spec.id.clone(),
                admin: Some(admin),
            },
        );
    }

    for sample in samples {
        let Some(citygml) = res.get_mut(&sample.city) else {
            warnings.push(format!("sample {}: no citygml for city: {}", sample.id, sample.city));
            continue;
        };
        let admin = citygml.admin.get_or_insert_with(Admin::default);
        admin.citygml_urls.extend(sample.citygml.clone());
        admin.max_lod_urls.extend(sample.maxlod.clone());
    }

    res.into_values().collect()
}

/// Plateau type codes with at least one dataset in the city, in registry order.
fn present_types(datasets: &[Dataset], feature_types: &FeatureTypes, city_code: &AreaCode) -> Vec<String> {
    feature_types
        .plateau
        .iter()
        .filter(|ft| {
            datasets.iter().any(|d| {
                d.category() == DatasetTypeCategory::Plateau
                    && d.type_code() == ft.code
                    && d.area().city_code.as_ref() == Some(city_code)
            })
        })
        .map(|ft| ft.code.to_string())
        .collect()
}
