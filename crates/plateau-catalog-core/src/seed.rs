//! Dataset seed builder.
//!
//! A feature record lists the assets of one feature type for one city. The
//! seed builder groups them into [`DatasetSeed`]s, one per final dataset (a
//! ward, a river reach, an urban planning class...), and turns each asset of a
//! seed into an [`ItemSeed`].
//!
//! Problems with single assets never abort the build: the asset or seed is
//! dropped and a warning is pushed.

use indexmap::IndexMap;
use plateau_catalog_common::{
    DatasetFormat, FloodingScale, River, RiverAdmin, Texture, Ward,
};

use crate::dic::{Dic, DicEntry};
use crate::feature_types::{BLDG_CODE, FeatureType};
use crate::name::{AssetName, ClassifiedEx, ExShape, FloodEx, NormalEx};
use crate::record::{PlateauFeatureItem, PlateauFeatureItemDatum};
use crate::utils::{DatasetFormatExt, name_from_url, name_without_ext};

/// The assets of one future dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSeed {
    /// Asset URLs with their parsed names.
    pub assets: Vec<(String, AssetName)>,
    pub subname: Option<String>,
    pub subcode: Option<String>,
    pub suborder: Option<i32>,
    pub desc: Option<String>,
    /// Ward the dataset is anchored to. `None` anchors it to the city.
    pub ward: Option<Ward>,
    pub river: Option<River>,
    pub groups: Vec<String>,
}

/// One item of a future dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSeed {
    /// Item key (class name, flood level). Empty for normal assets.
    pub key: String,
    pub name: String,
    pub url: String,
    pub format: DatasetFormat,
    pub lod: Option<i32>,
    pub no_texture: Option<bool>,
    pub layers: Vec<String>,
    pub flooding_scale: Option<FloodingScale>,
    pub flooding_scale_suffix: Option<String>,
    pub hide_texture: bool,
}

impl ItemSeed {
    fn shows_no_texture(&self) -> bool {
        !self.hide_texture && self.no_texture == Some(true)
    }

    /// Builds the item id key from the key of its dataset.
    ///
    /// A dataset key already ending with the item key is not repeated:
    /// `11111_urf_UseDistrict` with item key `UseDistrict` and LOD 1 gives
    /// `11111_urf_UseDistrict_lod1`.
    #[must_use]
    pub fn id(&self, parent: &str) -> String {
        let parent = if self.key.is_empty() {
            parent
        } else {
            parent
                .strip_suffix(&format!("_{}", self.key))
                .unwrap_or(parent)
        };

        let lod = self.lod.map(|l| format!("lod{l}"));
        [
            Some(parent),
            Some(self.key.as_str()),
            lod.as_deref(),
            self.shows_no_texture().then_some("no_texture"),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
    }

    /// Display name: `<name> LOD<N>`, with `（テクスチャなし）` appended for
    /// untextured assets, or bare `テクスチャなし`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let lod = self.lod.map(|l| format!("LOD{l}")).unwrap_or_default();
        let base = match (self.name.is_empty(), lod.is_empty()) {
            (false, false) => format!("{} {lod}", self.name),
            (false, true) => self.name.clone(),
            (true, _) => lod,
        };

        if !self.shows_no_texture() {
            base
        } else if base.is_empty() {
            "テクスチャなし".to_string()
        } else {
            format!("{base}（テクスチャなし）")
        }
    }

    #[must_use]
    pub fn texture(&self) -> Option<Texture> {
        self.no_texture.map(Texture::from_no_texture)
    }
}

/// Builds the dataset seeds of a feature record.
///
/// `label` prefixes the warnings (`plateau 11111 bldg`). Seeds with the same
/// subcode are merged in first-seen order.
pub fn dataset_seeds(
    feature_type: &FeatureType,
    item: &PlateauFeatureItem,
    dic: &Dic,
    wards: &[Ward],
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<DatasetSeed> {
    let seeds = if feature_type.code == BLDG_CODE {
        bldg_seeds(item, wards, label, warnings)
    } else if item.data.is_empty() {
        item.items
            .iter()
            .filter_map(|datum| seed_from_datum(datum, false, feature_type, dic, label, warnings))
            .collect()
    } else {
        let simple = PlateauFeatureItemDatum {
            data: item.data.clone(),
            desc: item.desc.clone(),
            group: item.group.clone(),
            ..PlateauFeatureItemDatum::default()
        };
        seed_from_datum(&simple, true, feature_type, dic, label, warnings)
            .into_iter()
            .collect()
    };

    merge_seeds(seeds)
}

/// Merges seeds sharing a non-empty subcode, keeping first-seen order.
#[must_use]
pub fn merge_seeds(seeds: Vec<DatasetSeed>) -> Vec<DatasetSeed> {
    let mut merged: IndexMap<String, DatasetSeed> = IndexMap::new();
    let mut res: Vec<Option<String>> = vec![];
    let mut unkeyed: Vec<DatasetSeed> = vec![];

    for seed in seeds {
        match seed.subcode.clone().filter(|s| !s.is_empty()) {
            Some(key) => {
                if let Some(first) = merged.get_mut(&key) {
                    first.assets.extend(seed.assets);
                } else {
                    res.push(Some(key.clone()));
                    merged.insert(key, seed);
                }
            },
            None => {
                res.push(None);
                unkeyed.push(seed);
            },
        }
    }

    let mut unkeyed = unkeyed.into_iter();
    res.into_iter()
        .filter_map(|key| match key {
            Some(key) => merged.swap_remove(&key),
            None => unkeyed.next(),
        })
        .collect()
}

fn split_groups(group: &str) -> Vec<String> {
    if group.is_empty() {
        return vec![];
    }
    group.split('/').map(ToString::to_string).collect()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_assets(urls: &[String], label: &str, warnings: &mut Vec<String>) -> Vec<(String, AssetName)> {
    urls.iter()
        .filter_map(|url| {
            let name = name_without_ext(&name_from_url(url)).to_string();
            match AssetName::parse(&name).filter(AssetName::has_valid_ex) {
                Some(an) => Some((url.clone(), an)),
                None => {
                    warnings.push(format!("{label}: invalid asset name: {name}"));
                    None
                },
            }
        })
        .collect()
}

fn bldg_seeds(
    item: &PlateauFeatureItem,
    wards: &[Ward],
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<DatasetSeed> {
    let assets: Vec<(String, AssetName)> = parse_assets(&item.data, label, warnings)
        .into_iter()
        .filter(|(_, an)| {
            let normal = an.normal().is_some();
            if !normal {
                warnings.push(format!("{label}: invalid asset name: {an}"));
            }
            normal
        })
        .collect();

    if assets.is_empty() {
        return vec![];
    }

    let groups = split_groups(&item.group);
    if wards.is_empty() {
        return vec![DatasetSeed {
            assets,
            desc: non_empty(&item.desc),
            groups,
            ..DatasetSeed::default()
        }];
    }

    let ward_of = |an: &AssetName| an.normal().and_then(|n| n.ward_code.clone());

    for (_, an) in &assets {
        match ward_of(an) {
            Some(code) if wards.iter().any(|w| w.code.as_str() == code) => {},
            Some(code) => warnings.push(format!("{label}: unknown ward {code}: {an}")),
            None => warnings.push(format!("{label}: asset without ward: {an}")),
        }
    }

    wards
        .iter()
        .filter_map(|ward| {
            let ward_assets: Vec<(String, AssetName)> = assets
                .iter()
                .filter(|(_, an)| ward_of(an).as_deref() == Some(ward.code.as_str()))
                .cloned()
                .collect();

            if ward_assets.is_empty() {
                warnings.push(format!("{label}: no assets for ward {}", ward.code));
                return None;
            }

            Some(DatasetSeed {
                assets: ward_assets,
                desc: non_empty(&item.desc),
                ward: Some(ward.clone()),
                groups: groups.clone(),
                ..DatasetSeed::default()
            })
        })
        .collect()
}

fn seed_from_datum(
    datum: &PlateauFeatureItemDatum,
    simple: bool,
    feature_type: &FeatureType,
    dic: &Dic,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<DatasetSeed> {
    let assets = parse_assets(&datum.data, label, warnings);
    if assets.is_empty() {
        if !datum.data.is_empty() {
            warnings.push(format!("{label}: some invalid assets"));
        }
        return None;
    }

    let mut seed = DatasetSeed {
        desc: non_empty(&datum.desc),
        groups: split_groups(&datum.group),
        ..DatasetSeed::default()
    };

    if !simple {
        let shape = assets[0].1.shape();
        let subcode = shape.and_then(ExShape::dataset_key);
        let entry = match shape {
            Some(ExShape::Flood(flood)) => {
                let Some(entry) = flood_entry(&assets, feature_type, dic) else {
                    let key = shape.and_then(ExShape::dic_key).unwrap_or_default();
                    warnings.push(format!("{label}: unknown dic key: {key}"));
                    return None;
                };
                seed.river = RiverAdmin::parse(&flood.admin).map(|admin| River {
                    name: entry.description.clone(),
                    admin,
                });
                Some(entry)
            },
            Some(shape) => shape.dic_key().map(|key| {
                let (entry, found) = dic.find_entry_or_default(feature_type.code, &key);
                if !found {
                    warnings.push(format!("{label}: unknown dic key: {key}"));
                }
                entry
            }),
            None => None,
        };

        let subname = match (&entry, &seed.river) {
            _ if !datum.name.is_empty() => Some(datum.name.clone()),
            (Some(e), Some(river)) => Some(format!(
                "{}（{}管理区間）",
                e.description,
                river.admin.display_name()
            )),
            (Some(e), None) => non_empty(&e.description),
            (None, _) => None,
        };
        if subname.is_none() && entry.is_some() {
            warnings.push(format!(
                "{label}: invalid dic entry: {}",
                subcode.as_deref().unwrap_or_default()
            ));
        }

        seed.suborder = entry.as_ref().and_then(|e| e.order);
        seed.subname = subname;
        seed.subcode = subcode;
    }

    seed.assets = assets;
    Some(seed)
}

/// The first dictionary entry found for the flood assets of a seed.
fn flood_entry(assets: &[(String, AssetName)], feature_type: &FeatureType, dic: &Dic) -> Option<DicEntry> {
    assets.iter().find_map(|(_, an)| {
        let key = an.shape()?.dic_key()?;
        dic.find_entry(feature_type.code, &key)
            .filter(|e| !e.description.is_empty())
            .cloned()
    })
}

/// Builds the item seeds of a dataset seed.
///
/// `year` is the data year of the city; assets of other years are kept with a
/// warning.
pub fn item_seeds(
    feature_type: &FeatureType,
    seed: &DatasetSeed,
    dic: &Dic,
    year: i32,
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<ItemSeed> {
    let hide_texture = feature_type.hide_texture;

    seed.assets
        .iter()
        .filter_map(|(url, an)| {
            if an.year != year {
                warnings.push(format!(
                    "{label}: invalid asset name year: {an}: {} should be {year}",
                    an.year
                ));
            }

            match an.shape()? {
                ExShape::Normal(ex) => normal_item(url, ex, feature_type, label, warnings),
                ExShape::Classified(ex) => classified_item(url, ex, feature_type, dic, label, warnings),
                ExShape::Flood(ex) => flood_item(url, ex, feature_type, dic, label, warnings),
                ExShape::Unrecognised => {
                    warnings.push(format!("{label}: invalid asset name ex: {an}"));
                    None
                },
            }
        })
        .map(|mut item| {
            item.hide_texture = hide_texture;
            item
        })
        .collect()
}

fn item_format(format: &str, label: &str, warnings: &mut Vec<String>) -> Option<DatasetFormat> {
    let res = DatasetFormat::from_name(format);
    if res.is_none() {
        warnings.push(format!("{label}: unknown format: {format}"));
    }
    res
}

fn normal_item(
    url: &str,
    ex: &NormalEx,
    feature_type: &FeatureType,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<ItemSeed> {
    if !ex.no_texture && feature_type.hide_texture {
        return None;
    }
    let format = item_format(&ex.format, label, warnings)?;

    Some(ItemSeed {
        key: String::new(),
        name: String::new(),
        url: format.asset_url(url),
        format,
        lod: Some(ex.lod),
        no_texture: Some(ex.no_texture),
        layers: feature_type.layers.layer_names(&[], ex.lod, format),
        flooding_scale: None,
        flooding_scale_suffix: None,
        hide_texture: feature_type.hide_texture,
    })
}

fn classified_item(
    url: &str,
    ex: &ClassifiedEx,
    feature_type: &FeatureType,
    dic: &Dic,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<ItemSeed> {
    if !ex.no_texture && feature_type.hide_texture {
        return None;
    }
    let format = item_format(&ex.format, label, warnings)?;

    let key = ex.class_name.clone();
    let (entry, found) = dic.find_entry_or_default(&ex.feature_type, &key);
    if !found {
        warnings.push(format!("{label}: unknown dic key: {key}"));
    }

    Some(ItemSeed {
        name: entry.description,
        url: format.asset_url(url),
        format,
        lod: (ex.lod != 0).then_some(ex.lod),
        no_texture: (format == DatasetFormat::Cesium3DTiles).then_some(ex.no_texture),
        layers: feature_type
            .layers
            .layer_names(std::slice::from_ref(&key), ex.lod, format),
        flooding_scale: None,
        flooding_scale_suffix: None,
        hide_texture: feature_type.hide_texture,
        key,
    })
}

fn flood_item(
    url: &str,
    ex: &FloodEx,
    feature_type: &FeatureType,
    dic: &Dic,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<ItemSeed> {
    if !ex.no_texture && feature_type.hide_texture {
        return None;
    }
    let format = item_format(&ex.format, label, warnings)?;

    let shape = ExShape::Flood(ex.clone());
    let dic_key = shape.dic_key().unwrap_or_default();
    let Some(entry) = dic.find_entry(feature_type.code, &dic_key) else {
        warnings.push(format!("{label}: unknown dic key: {dic_key}"));
        return None;
    };

    Some(ItemSeed {
        key: shape.item_key().unwrap_or_default(),
        name: flood_item_name(entry),
        url: format.asset_url(url),
        format,
        lod: None,
        no_texture: Some(ex.no_texture),
        layers: vec![],
        flooding_scale: FloodingScale::parse(&entry.scale),
        flooding_scale_suffix: non_empty(&entry.suffix_description),
        hide_texture: feature_type.hide_texture,
    })
}

fn flood_item_name(entry: &DicEntry) -> String {
    let suffix = if entry.suffix_description.is_empty() {
        &entry.suffix
    } else {
        &entry.suffix_description
    };
    if suffix.is_empty() {
        entry.scale.clone()
    } else {
        format!("{}（{suffix}）", entry.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_types::find_plateau_feature_type;
    use plateau_catalog_common::{City, Prefecture};
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://example.com/assets/";

    fn url(name: &str) -> String {
        format!("{BASE}{name}.zip")
    }

    fn ft(code: &str) -> FeatureType {
        find_plateau_feature_type(code).unwrap_or_else(|| FeatureType::new("x", "x"))
    }

    fn wards() -> Vec<Ward> {
        let pref = Prefecture::new("11".into(), "埼玉県");
        let city = City::new("11111".into(), "bar市", &pref);
        vec![
            Ward::new("11112".into(), "hoge区", &city),
            Ward::new("11113".into(), "fuga区", &city),
        ]
    }

    #[test]
    fn test_bldg_without_wards() {
        let item = PlateauFeatureItem {
            data: vec![
                url("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1"),
                url("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod2"),
                url("broken"),
            ],
            ..PlateauFeatureItem::default()
        };
        let mut warnings = vec![];
        let seeds = dataset_seeds(&ft("bldg"), &item, &Dic::default(), &[], "plateau 11111 bldg", &mut warnings);

        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].assets.len(), 2);
        assert!(seeds[0].ward.is_none());
        assert_eq!(warnings, vec!["plateau 11111 bldg: invalid asset name: broken"]);
    }

    #[test]
    fn test_bldg_partitioned_by_ward() {
        let item = PlateauFeatureItem {
            data: vec![
                url("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11112_hoge-ku_lod1"),
                url("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11112_hoge-ku_lod2"),
                url("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11199_piyo-ku_lod1"),
            ],
            ..PlateauFeatureItem::default()
        };
        let mut warnings = vec![];
        let seeds = dataset_seeds(&ft("bldg"), &item, &Dic::default(), &wards(), "plateau 11111 bldg", &mut warnings);

        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].assets.len(), 2);
        assert_eq!(seeds[0].ward.as_ref().map(|w| w.code.as_str()), Some("11112"));
        assert_eq!(
            warnings,
            vec![
                "plateau 11111 bldg: unknown ward 11199: 11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11199_piyo-ku_lod1",
                "plateau 11111 bldg: no assets for ward 11113",
            ]
        );
    }

    #[test]
    fn test_classified_seeds_are_merged_by_subcode() {
        let dic = Dic::parse(r#"{"urf": [{"name": "UseDistrict", "description": "用途地域"}]}"#)
            .unwrap_or_default();
        let datum = |name: &str| PlateauFeatureItemDatum {
            data: vec![url(name)],
            ..PlateauFeatureItemDatum::default()
        };
        let item = PlateauFeatureItem {
            items: vec![
                datum("11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_mvt_lod1"),
                datum("11111_bar-shi_city_2023_citygml_1_op_urf_FirePreventionDistrict_mvt_lod1"),
                datum("11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_3dtiles_lod1"),
            ],
            ..PlateauFeatureItem::default()
        };
        let mut warnings = vec![];
        let seeds = dataset_seeds(&ft("urf"), &item, &dic, &[], "plateau 11111 urf", &mut warnings);

        let codes: Vec<_> = seeds.iter().map(|s| s.subcode.as_deref()).collect();
        assert_eq!(codes, vec![Some("UseDistrict"), Some("FirePreventionDistrict")]);
        assert_eq!(seeds[0].assets.len(), 2);
        assert_eq!(seeds[0].subname.as_deref(), Some("用途地域"));
        assert_eq!(seeds[0].suborder, Some(4));
        assert_eq!(seeds[1].subname.as_deref(), Some("防火地域又は準防火地域"));
        assert!(warnings.is_empty(), "{warnings:?}");

        let items = item_seeds(&ft("urf"), &seeds[0], &dic, 2023, "plateau 11111 urf", &mut warnings);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id("11111_urf_UseDistrict"), "11111_urf_UseDistrict_lod1");
        assert_eq!(items[0].display_name(), "用途地域 LOD1");
        assert_eq!(items[0].layers, vec!["UseDistrict"]);
        assert_eq!(items[0].texture(), None);
        assert_eq!(items[1].texture(), Some(Texture::Texture));
    }

    #[test]
    fn test_seed_merge_ignores_asset_order() {
        let dic = Dic::parse(r#"{"urf": [{"name": "UseDistrict", "description": "用途地域"}]}"#)
            .unwrap_or_default();
        let names = [
            "11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_mvt_lod1",
            "11111_bar-shi_city_2023_citygml_1_op_urf_FirePreventionDistrict_mvt_lod1",
            "11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_3dtiles_lod1",
        ];
        let assets_by_subcode = |order: [usize; 3]| {
            let item = PlateauFeatureItem {
                items: order
                    .iter()
                    .map(|&i| PlateauFeatureItemDatum {
                        data: vec![url(names[i])],
                        ..PlateauFeatureItemDatum::default()
                    })
                    .collect(),
                ..PlateauFeatureItem::default()
            };
            let mut warnings = vec![];
            let seeds = dataset_seeds(&ft("urf"), &item, &dic, &[], "plateau 11111 urf", &mut warnings);
            assert!(warnings.is_empty(), "{warnings:?}");
            seeds
                .into_iter()
                .map(|s| {
                    let urls: std::collections::BTreeSet<String> =
                        s.assets.into_iter().map(|(u, _)| u).collect();
                    (s.subcode, urls)
                })
                .collect::<std::collections::BTreeMap<_, _>>()
        };

        let expected = assets_by_subcode([0, 1, 2]);
        assert_eq!(expected.len(), 2);
        for order in [[2, 1, 0], [1, 0, 2], [1, 2, 0], [2, 0, 1], [0, 2, 1]] {
            assert_eq!(assets_by_subcode(order), expected, "{order:?}");
        }
    }

    #[test]
    fn test_merge_keeps_unkeyed_seeds() {
        let seed = |code: Option<&str>, n: usize| DatasetSeed {
            subcode: code.map(ToString::to_string),
            assets: vec![(String::new(), AssetName::parse("1_a_b_2023_c_1").unwrap_or_else(|| unreachable!())); n],
            ..DatasetSeed::default()
        };
        let merged = merge_seeds(vec![seed(Some("a"), 1), seed(None, 1), seed(Some("a"), 2), seed(None, 1)]);
        let sizes: Vec<_> = merged.iter().map(|s| (s.subcode.clone(), s.assets.len())).collect();
        assert_eq!(
            sizes,
            vec![(Some("a".to_string()), 3), (None, 1), (None, 1)]
        );
    }

    #[test]
    fn test_flood_with_missing_dic_entry() {
        let dic = Dic::parse(
            r#"{"fld": [{"name": "tamagawa_l1", "description": "多摩川", "admin": "国", "scale": "計画規模", "order": 1}]}"#,
        )
        .unwrap_or_default();
        let datum = |name: &str| PlateauFeatureItemDatum {
            data: vec![url(name)],
            ..PlateauFeatureItemDatum::default()
        };
        let item = PlateauFeatureItem {
            items: vec![
                datum("11111_bar-shi_city_2023_citygml_1_op_fld_natl_tamagawa_3dtiles_l1_no_texture"),
                datum("11111_bar-shi_city_2023_citygml_1_op_fld_pref_sumidagawa_3dtiles_l1_no_texture"),
            ],
            ..PlateauFeatureItem::default()
        };

        let mut warnings = vec![];
        let seeds = dataset_seeds(&ft("fld"), &item, &dic, &[], "plateau 11111 fld", &mut warnings);

        assert_eq!(seeds.len(), 1);
        assert_eq!(warnings, vec!["plateau 11111 fld: unknown dic key: sumidagawa_l1"]);
        assert_eq!(seeds[0].subcode.as_deref(), Some("natl_tamagawa"));
        assert_eq!(seeds[0].subname.as_deref(), Some("多摩川（国管理区間）"));
        assert_eq!(
            seeds[0].river,
            Some(River {
                name: "多摩川".to_string(),
                admin: RiverAdmin::National
            })
        );

        let items = item_seeds(&ft("fld"), &seeds[0], &dic, 2023, "plateau 11111 fld", &mut warnings);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id("11111_fld_natl_tamagawa"), "11111_fld_natl_tamagawa_l1");
        assert_eq!(items[0].display_name(), "計画規模");
        assert_eq!(items[0].flooding_scale, Some(FloodingScale::Planned));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_flood_sibling_asset_without_entry() {
        let dic = Dic::parse(r#"{"fld": [{"name": "tamagawa_l1", "description": "多摩川", "scale": "計画規模"}]}"#)
            .unwrap_or_default();
        let seed = DatasetSeed {
            assets: [
                "11111_bar-shi_city_2023_citygml_1_op_fld_natl_tamagawa_3dtiles_l1_no_texture",
                "11111_bar-shi_city_2023_citygml_1_op_fld_natl_tamagawa_3dtiles_l2_no_texture",
                "11111_bar-shi_city_2023_citygml_1_op_fld_natl_tamagawa_3dtiles_l1",
            ]
            .iter()
            .filter_map(|n| AssetName::parse(n).map(|an| (url(n), an)))
            .collect(),
            ..DatasetSeed::default()
        };

        let mut warnings = vec![];
        let items = item_seeds(&ft("fld"), &seed, &dic, 2023, "plateau 11111 fld", &mut warnings);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "l1");
        assert_eq!(items[0].display_name(), "計画規模");
        assert_eq!(warnings, vec!["plateau 11111 fld: unknown dic key: tamagawa_l2"]);
    }

    #[test]
    fn test_normal_item_names() {
        let seed = DatasetSeed {
            assets: [
                "11111_bar-shi_city_2022_citygml_1_op_tran_mvt_lod1",
                "11111_bar-shi_city_2023_citygml_1_op_tran_3dtiles_lod2_no_texture",
            ]
            .iter()
            .filter_map(|n| AssetName::parse(n).map(|an| (url(n), an)))
            .collect(),
            ..DatasetSeed::default()
        };

        let mut warnings = vec![];
        let items = item_seeds(&ft("tran"), &seed, &Dic::default(), 2023, "plateau 11111 tran", &mut warnings);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id("11111_tran"), "11111_tran_lod1");
        assert_eq!(items[0].display_name(), "LOD1");
        assert_eq!(items[0].layers, vec!["Road"]);
        assert_eq!(
            items[0].url,
            "https://example.com/assets/11111_bar-shi_city_2022_citygml_1_op_tran_mvt_lod1/{z}/{x}/{y}.mvt"
        );
        assert_eq!(items[1].id("11111_tran"), "11111_tran_lod2_no_texture");
        assert_eq!(items[1].display_name(), "LOD2（テクスチャなし）");
        assert_eq!(items[1].texture(), Some(Texture::None));
        assert_eq!(
            warnings,
            vec!["plateau 11111 tran: invalid asset name year: 11111_bar-shi_city_2022_citygml_1_op_tran_mvt_lod1: 2022 should be 2023"]
        );
    }

    #[test]
    fn test_bare_no_texture_name() {
        let item = ItemSeed {
            key: String::new(),
            name: String::new(),
            url: String::new(),
            format: DatasetFormat::Cesium3DTiles,
            lod: None,
            no_texture: Some(true),
            layers: vec![],
            flooding_scale: None,
            flooding_scale_suffix: None,
            hide_texture: false,
        };
        assert_eq!(item.display_name(), "テクスチャなし");
        assert_eq!(item.id("11111_x"), "11111_x_no_texture");
    }
}
