//! Plateau feature records to plateau datasets.

use plateau_catalog_common::{
    Admin, City, Dataset, DatasetType, GenericDataset, Id, IdType, PlateauDataset,
    PlateauDatasetItem, PlateauSpec, Ward, find_spec_minor,
};

use super::context::{AreaContext, ConvContext, new_admin, standard_item_id, standard_item_name};
use crate::dic::Dic;
use crate::feature_types::FeatureType;
use crate::record::PlateauFeatureItem;
use crate::seed::{DatasetSeed, dataset_seeds, item_seeds};

/// Collects the wards listed in the dictionaries of feature records.
pub fn wards(items: &[PlateauFeatureItem], ctx: &ConvContext<'_>, warnings: &mut Vec<String>) -> Vec<Ward> {
    let mut res = vec![];
    for item in items {
        let Some(area) = ctx.area(&item.city) else {
            warnings.push(format!("plateau {}: city not found: {}", item.id, item.city));
            continue;
        };
        let Some(city) = &area.city else {
            continue;
        };
        res.extend(wards_of(item, city));
    }
    res
}

fn wards_of(item: &PlateauFeatureItem, city: &City) -> Vec<Ward> {
    let Ok(dic) = item.read_dic() else {
        return vec![];
    };
    dic.wards()
        .into_iter()
        .map(|(code, name)| Ward::new(code.as_str().into(), name, city))
        .collect()
}

/// Options shared by the records of one plateau feature type.
pub struct PlateauOptions<'a> {
    pub feature_type: &'a FeatureType,
    pub dataset_type: &'a DatasetType,
    pub specs: &'a [PlateauSpec],
    /// CMS link prefix of city records.
    pub cms_prefix: Option<&'a str>,
}

/// Converts the feature records of one plateau type.
pub fn convert(
    items: &[PlateauFeatureItem],
    opts: &PlateauOptions<'_>,
    ctx: &ConvContext<'_>,
    warnings: &mut Vec<String>,
) -> Vec<Dataset> {
    let code = opts.feature_type.code;
    let mut res = vec![];

    for item in items {
        let Some(area) = ctx.area(&item.city) else {
            warnings.push(format!("plateau {} {code}: invalid city: {}", item.id, item.city));
            continue;
        };

        let label = format!("plateau {} {code}", area.code());
        let Some(spec) = find_spec_minor(opts.specs, &area.city_item.spec) else {
            warnings.push(format!("{label}: invalid spec: {}", area.city_item.spec));
            continue;
        };

        let dic = match item.read_dic() {
            Ok(dic) => dic,
            Err(e) => {
                warnings.push(format!("{label}: invalid dic: {e}"));
                continue;
            },
        };

        let admin = new_admin(
            area.city_item.plateau_stage(Some(code)),
            opts.cms_prefix,
            &area.city_item.id,
        )
        .map(|admin| Admin {
            sample: item.sample,
            ..admin
        })
        .or_else(|| {
            item.sample.then(|| Admin {
                sample: true,
                ..Admin::default()
            })
        });

        let seeds = dataset_seeds(opts.feature_type, item, &dic, &area.wards, &label, warnings);
        for seed in seeds {
            let dataset = SeedContext {
                opts,
                area: &area,
                dic: &dic,
                spec_id: &spec.id,
                admin: admin.as_ref(),
                registration_year: ctx.registration_year,
                label: &label,
            }
            .to_dataset(seed, warnings);
            res.extend(dataset.map(Dataset::Plateau));
        }
    }

    res
}

struct SeedContext<'a> {
    opts: &'a PlateauOptions<'a>,
    area: &'a AreaContext<'a>,
    dic: &'a Dic,
    spec_id: &'a Id,
    admin: Option<&'a Admin>,
    registration_year: i32,
    label: &'a str,
}

impl SeedContext<'_> {
    fn to_dataset(&self, seed: DatasetSeed, warnings: &mut Vec<String>) -> Option<PlateauDataset> {
        let ft = self.opts.feature_type;
        let city_item = self.area.city_item;
        let target_code = seed.ward.as_ref().map_or(self.area.code(), |w| &w.code);
        let target_name = seed.ward.as_ref().map_or(self.area.name(), |w| w.name.as_str());

        let key = standard_item_id(ft.code, target_code, seed.subcode.as_deref());
        let id = Id::new(&key, IdType::Dataset);

        let items: Vec<PlateauDatasetItem> = item_seeds(ft, &seed, self.dic, city_item.year_int(), self.label, warnings)
            .into_iter()
            .map(|item| PlateauDatasetItem {
                id: Id::new(item.id(&key), IdType::DatasetItem),
                name: item.display_name(),
                texture: item.texture(),
                url: item.url,
                format: item.format,
                layers: item.layers,
                lod: item.lod,
                parent_id: id.clone(),
                flooding_scale: item.flooding_scale,
                flooding_scale_suffix: item.flooding_scale_suffix,
            })
            .collect();

        if items.is_empty() {
            warnings.push(format!("plateau {target_code} {}: no items", ft.code));
            return None;
        }

        Some(PlateauDataset {
            name: standard_item_name(ft.name, seed.subname.as_deref(), target_name),
            area: self.area.dataset_area(seed.ward.as_ref()),
            id,
            subname: seed.subname,
            subcode: seed.subcode,
            suborder: seed.suborder,
            description: seed.desc,
            year: city_item.year_int(),
            registration_year: self.registration_year,
            open_data_url: city_item.open_data_url(),
            type_id: self.opts.dataset_type.id().clone(),
            type_code: ft.code.to_string(),
            plateau_spec_minor_id: self.spec_id.clone(),
            river: seed.river,
            admin: self.admin.cloned(),
            groups: seed.groups,
            items,
        })
    }
}

/// Moves plateau datasets built from sample records to the generic sample type.
///
/// Relocated datasets get the id suffix `_sample` and keep their original type
/// in the admin blob.
pub fn relocate_samples(datasets: Vec<Dataset>, sample_type: Option<&DatasetType>) -> (Vec<Dataset>, Vec<Dataset>) {
    let Some(sample_type) = sample_type else {
        return (datasets, vec![]);
    };

    let mut kept = vec![];
    let mut moved = vec![];
    for dataset in datasets {
        match dataset {
            Dataset::Plateau(d) if d.admin.as_ref().is_some_and(|a| a.sample) => {
                moved.push(Dataset::Generic(to_sample(d, sample_type)));
            },
            other => kept.push(other),
        }
    }
    (kept, moved)
}

fn to_sample(dataset: PlateauDataset, sample_type: &DatasetType) -> GenericDataset {
    let new_id = Id::from(format!("{}_sample", dataset.id));
    let type_id = dataset.type_id.clone();
    let type_code = dataset.type_code.clone();

    let mut generic = dataset.into_generic(
        sample_type.id().clone(),
        sample_type.code().to_string(),
        new_id,
    );
    let admin = generic.admin.get_or_insert_with(Admin::default);
    admin.plateau_type_id = Some(type_id);
    admin.plateau_type_code = Some(type_code);
    generic
}
