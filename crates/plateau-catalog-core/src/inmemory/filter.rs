use std::collections::HashSet;

use plateau_catalog_common::{
    Area, AreaCode, AreasInput, Dataset, DatasetType, DatasetTypeCategory, DatasetTypes,
    DatasetTypesInput, Datasets, DatasetsInput, Id, QueryContext, is_stage_allowed,
    major_version, spec_number,
};

use super::{Snapshot, redact};

/// Filters the areas of a snapshot.
///
/// With `dataset_types` set, only areas hosting a visible dataset of those
/// types are kept: the most specific area of each dataset, plus its ancestors
/// when `include_parents` is set.
#[must_use]
pub fn filter_areas(snapshot: &Snapshot, ctx: &QueryContext, input: &AreasInput) -> Vec<Area> {
    let hosting: Option<HashSet<&AreaCode>> = input.dataset_types.as_ref().map(|types| {
        snapshot
            .datasets
            .all()
            .filter(|d| is_stage_allowed(d.admin(), &ctx.allowed_stages))
            .filter(|d| input.categories.is_empty() || input.categories.contains(&d.category()))
            .filter(|d| types.is_empty() || types.iter().any(|t| t.eq_ignore_ascii_case(d.type_code())))
            .flat_map(|d| {
                if input.include_parents {
                    d.area().codes()
                } else {
                    vec![d.area().most_detailed_code()]
                }
            })
            .collect()
    });

    snapshot
        .areas
        .all()
        .filter(|a| input.area_types.is_empty() || input.area_types.contains(&a.area_type()))
        .filter(|a| {
            input.search_tokens.is_empty() || input.search_tokens.iter().any(|t| a.name().contains(t.as_str()))
        })
        .filter(|a| match &input.parent_code {
            None => true,
            Some(parent) if input.deep => a.ancestor_codes().contains(&parent),
            Some(parent) => a.parent_code() == Some(parent),
        })
        .filter(|a| hosting.as_ref().is_none_or(|codes| codes.contains(a.code())))
        .cloned()
        .collect()
}

/// Filters dataset types. Year and spec filters only match plateau types.
#[must_use]
pub fn filter_dataset_types(types: &DatasetTypes, input: &DatasetTypesInput) -> Vec<DatasetType> {
    types
        .by_category(input.category)
        .into_iter()
        .filter(|t| input.year.is_none_or(|y| t.category() == DatasetTypeCategory::Plateau && t.year() == y))
        .filter(|t| {
            input.plateau_spec.as_deref().is_none_or(|spec| {
                t.plateau_spec_id()
                    .is_some_and(|id| major_version(spec_number(spec)) == spec_number(id.as_str()))
            })
        })
        .cloned()
        .collect()
}

/// Filters datasets by stage admission and the input, redacting admin blobs
/// unless the caller bypasses redaction.
#[must_use]
pub fn filter_datasets(datasets: &Datasets, ctx: &QueryContext, input: &DatasetsInput) -> Vec<Dataset> {
    datasets
        .all()
        .filter(|d| is_stage_allowed(d.admin(), &ctx.allowed_stages))
        .filter(|d| matches_area(d, &input.area_codes, input.shallow))
        .filter(|d| input.year.is_none_or(|y| d.year() == y))
        .filter(|d| input.registration_year.is_none_or(|y| d.registration_year() == y))
        .filter(|d| {
            input.plateau_spec.as_deref().is_none_or(|spec| match d {
                Dataset::Plateau(p) => spec_matches(spec, &p.plateau_spec_minor_id),
                Dataset::Related(_) | Dataset::Generic(_) => false,
            })
        })
        .filter(|d| input.include_types.is_empty() || matches_type(d, &input.include_types))
        .filter(|d| !matches_type(d, &input.exclude_types))
        .filter(|d| matches_search(d, &input.search_tokens))
        .map(|d| redact(ctx, d.clone()))
        .collect()
}

/// Matches a spec reference against a minor version id.
///
/// A bare major (`3`) matches every minor of that major; `3.2`, `第3.2版` and
/// `ps_3.2` match that minor only.
///
/// ```
/// use plateau_catalog_common::Id;
/// use plateau_catalog_core::inmemory::spec_matches;
///
/// assert!(spec_matches("3", &Id::from("ps_3.2")));
/// assert!(spec_matches("第3.2版", &Id::from("ps_3.2")));
/// assert!(!spec_matches("3.1", &Id::from("ps_3.2")));
/// ```
#[must_use]
pub fn spec_matches(spec: &str, minor_id: &Id) -> bool {
    let wanted = spec_number(spec);
    let actual = spec_number(minor_id.as_str());
    if wanted.contains('.') {
        wanted == actual
    } else {
        wanted == major_version(actual)
    }
}

fn matches_area(dataset: &Dataset, codes: &[AreaCode], shallow: bool) -> bool {
    if codes.is_empty() {
        return true;
    }
    let area = dataset.area();
    if shallow {
        codes.contains(area.most_detailed_code())
    } else {
        area.codes().into_iter().any(|c| codes.contains(c))
    }
}

fn matches_type(dataset: &Dataset, keys: &[String]) -> bool {
    keys.iter().any(|k| {
        k.eq_ignore_ascii_case(dataset.type_code()) || k.eq_ignore_ascii_case(dataset.category().as_str())
    })
}

fn matches_search(dataset: &Dataset, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }

    let (subname, subcode) = match dataset {
        Dataset::Plateau(d) => (d.subname.as_deref(), d.subcode.as_deref()),
        Dataset::Related(_) | Dataset::Generic(_) => (None, None),
    };
    let fields: Vec<&str> = [Some(dataset.name()), dataset.description(), subname, subcode]
        .into_iter()
        .flatten()
        .collect();

    tokens
        .iter()
        .all(|t| fields.iter().any(|f| f.contains(t.as_str())))
}
