//! Conversion of typed tenant records into a catalog snapshot.
//!
//! [`convert`] runs the passes in a fixed order: areas, wards, plateau
//! datasets, related datasets, generic datasets, sample relocation and
//! finally CityGML aggregates. Every pass reports malformed records as
//! warnings and drops them; conversion as a whole never fails.

mod citygml;
mod context;
mod generic;
mod plateau;
mod related;

use log::{debug, info};
use plateau_catalog_common::{Areas, DatasetTypeCategory, Datasets};

pub use context::{standard_item_id, standard_item_name};
pub use related::{OriginalAndConv, pair_assets};

use crate::config::CmsConfig;
use crate::feature_types::SAMPLE_CODE;
use crate::inmemory::Snapshot;
use crate::record::{AllData, CITY_MODEL, GENERIC_MODEL, RELATED_MODEL, model_key};
use context::ConvContext;
use plateau::PlateauOptions;

/// Converts the records of one tenant into a snapshot and its warnings.
///
/// Decoding warnings carried by `all` come first. Without city records the
/// snapshot has no areas nor datasets and no warnings are reported.
#[must_use]
pub fn convert(all: &AllData, cms: Option<&CmsConfig>) -> (Snapshot, Vec<String>) {
    let dataset_types = all.feature_types.to_dataset_types(&all.specs);
    let mut snapshot = Snapshot {
        name: all.name.clone(),
        plateau_specs: all.specs.clone(),
        ..Snapshot::default()
    };

    if all.city.is_empty() {
        snapshot.dataset_types = dataset_types;
        return (snapshot, vec![]);
    }

    let mut warnings = all.warnings.clone();
    let cms_prefix = |model: &str| cms.and_then(|c| c.item_url_prefix(&all.name, &model_key(model)));
    let city_prefix = cms_prefix(CITY_MODEL);
    let related_prefix = cms_prefix(RELATED_MODEL);
    let generic_prefix = cms_prefix(GENERIC_MODEL);

    let mut areas = Areas::new();
    let mut ctx = ConvContext::new(all.year);
    let visible = all.city.iter().filter(|&c| ctx.add_city(c, &mut areas)).count();
    debug!("{}: {visible} of {} cities visible", all.name, all.city.len());

    let plateau_types = dataset_types.by_category(Some(DatasetTypeCategory::Plateau));
    let records_of = |code: &str| all.plateau.get(code).map_or(&[][..], Vec::as_slice);

    for dt in &plateau_types {
        let wards = plateau::wards(records_of(dt.code()), &ctx, &mut warnings);
        ctx.add_wards(wards, &mut areas);
    }

    let mut datasets = Datasets::new();
    for dt in &plateau_types {
        let Some(ft) = all.feature_types.find_plateau(dt.code()) else {
            continue;
        };
        let opts = PlateauOptions {
            feature_type: ft,
            dataset_type: dt,
            specs: &all.specs,
            cms_prefix: city_prefix.as_deref(),
        };
        datasets.append(
            DatasetTypeCategory::Plateau,
            plateau::convert(records_of(dt.code()), &opts, &ctx, &mut warnings),
        );
    }

    datasets.append(
        DatasetTypeCategory::Related,
        related::convert(
            &all.related,
            &dataset_types.by_category(Some(DatasetTypeCategory::Related)),
            related_prefix.as_deref(),
            &ctx,
            &mut warnings,
        ),
    );

    datasets.append(
        DatasetTypeCategory::Generic,
        generic::convert(
            &all.generic,
            &dataset_types.by_category(Some(DatasetTypeCategory::Generic)),
            generic_prefix.as_deref(),
            &ctx,
            &mut warnings,
        ),
    );

    let sample_type = dataset_types.find_by_code(SAMPLE_CODE, Some(DatasetTypeCategory::Generic));
    let (kept, moved) = plateau::relocate_samples(datasets.take(DatasetTypeCategory::Plateau), sample_type);
    if !moved.is_empty() {
        debug!("{}: {} sample datasets relocated", all.name, moved.len());
    }
    datasets.append(DatasetTypeCategory::Plateau, kept);
    datasets.append(DatasetTypeCategory::Generic, moved);

    let citygml = citygml::convert(
        &all.geospatialjp,
        &all.sample,
        datasets.by_category(DatasetTypeCategory::Plateau),
        &all.feature_types,
        &all.specs,
        &ctx,
        &mut warnings,
    );

    info!(
        "converted {}: {} areas, {} datasets, {} citygml, {} warnings",
        all.name,
        areas.len(),
        datasets.len(),
        citygml.len(),
        warnings.len()
    );

    snapshot.years = ctx.years();
    snapshot.areas = areas;
    snapshot.datasets = datasets;
    snapshot.citygml = citygml;
    snapshot.dataset_types = dataset_types;
    (snapshot, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateau_catalog_common::{
        Area, AreaCode, Dataset, DatasetFormat, Id, RiverAdmin, Stage,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use crate::config::CatalogConfig;
    use crate::feature_types::{get_feature_types, get_plateau_specs};
    use crate::record::{GEOSPATIALJP_DATA_MODEL, RawRecords, SAMPLE_MODEL};

    const BASE: &str = "https://example.com/assets";

    fn asset(name: &str) -> Value {
        json!({ "url": format!("{BASE}/{name}") })
    }

    fn raw(models: Vec<(&str, Vec<Value>)>) -> RawRecords {
        models
            .into_iter()
            .map(|(model, items)| (model_key(model), items))
            .collect()
    }

    fn all_data(raw: &RawRecords) -> AllData {
        AllData::new("prj", 2023, get_feature_types(), get_plateau_specs())
            .decode(raw, &CatalogConfig::default())
    }

    fn city_records() -> Vec<Value> {
        vec![
            json!({
                "id": "city1", "prefecture": "埼玉県", "city_name": "bar市", "city_code": "11111",
                "city_name_en": "bar-shi", "year": "2023", "spec": "第3.2版", "city_public": true,
                "related_public": true
            }),
            json!({
                "id": "city2", "prefecture": "埼玉県", "city_name": "hoge市", "city_code": "11200",
                "year": "2023", "spec": "第3.2版",
                "plateau_data_status": { "name": "確認可能" }
            }),
            json!({
                "id": "hidden", "prefecture": "埼玉県", "city_name": "fuga市", "city_code": "11300"
            }),
        ]
    }

    fn dataset<'a>(snapshot: &'a Snapshot, id: &str) -> Option<&'a Dataset> {
        snapshot.datasets.get(&Id::from(id))
    }

    #[test]
    fn test_empty() {
        let all = all_data(&RawRecords::new());
        let (snapshot, warnings) = convert(&all, None);
        assert!(warnings.is_empty());
        assert!(snapshot.areas.is_empty());
        assert!(snapshot.datasets.is_empty());
        assert_eq!(snapshot.plateau_specs.len(), 1);
    }

    #[test]
    fn test_areas_and_wards() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "bldg",
                vec![json!({
                    "id": "b1", "city": "city1",
                    "data": [asset("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11112_hoge-ku_lod1.zip")],
                    "dic": r#"{"admin": [{"code": "11112", "description": "bar市 hoge区"}]}"#
                })],
            ),
            (
                "tran",
                vec![json!({
                    "id": "t1", "city": "city1",
                    "dic": r#"{"admin": [{"code": "11112", "description": "bar市 hoge区"}, {"code": "11113", "description": "bar市 fuga区"}]}"#
                })],
            ),
        ]);
        let all = all_data(&raw);
        let (snapshot, _) = convert(&all, None);

        let codes: Vec<&str> = snapshot.areas.all().map(|a| a.code().as_str()).collect();
        assert_eq!(codes, vec!["11", "11111", "11200", "11112", "11113"]);
        assert_eq!(snapshot.years, vec![2023]);

        let Some(Area::Ward(ward)) = snapshot.areas.find_by_code(&AreaCode::new("11112")) else {
            panic!("ward not found");
        };
        assert_eq!(ward.name, "hoge区");
        assert_eq!(ward.city_code.as_str(), "11111");

        let d = dataset(&snapshot, "d_11112_bldg");
        assert_eq!(d.map(Dataset::name), Some("建築物モデル（hoge区）"));
        assert_eq!(d.and_then(|d| d.area().ward_code.clone()), Some(AreaCode::new("11112")));
    }

    #[test]
    fn test_plateau_stage_and_cms_link() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "tran",
                vec![
                    json!({ "id": "t1", "city": "city1", "data": [asset("11111_bar-shi_city_2023_citygml_1_op_tran_mvt_lod1.zip")] }),
                    json!({ "id": "t2", "city": "city2", "data": [asset("11200_hoge-shi_city_2023_citygml_1_op_tran_mvt_lod1.zip")] }),
                    json!({ "id": "t3", "city": "hidden", "data": [] }),
                ],
            ),
        ]);
        let cms = CmsConfig {
            url: "https://cms.example.com".to_string(),
            workspace: "ws".to_string(),
        };
        let all = all_data(&raw);
        let (snapshot, warnings) = convert(&all, Some(&cms));

        assert_eq!(
            warnings,
            vec![
                "plateau t3: city not found: hidden".to_string(),
                "plateau t3 tran: invalid city: hidden".to_string(),
            ]
        );

        let ga = dataset(&snapshot, "d_11111_tran").and_then(Dataset::admin);
        assert_eq!(ga.and_then(|a| a.stage), None);
        assert_eq!(
            ga.and_then(|a| a.cms_url.as_deref()),
            Some("https://cms.example.com/workspace/ws/project/prj/content/plateau-city/details/city1")
        );

        let beta = dataset(&snapshot, "d_11200_tran").and_then(Dataset::admin);
        assert_eq!(beta.and_then(|a| a.stage), Some(Stage::Beta));

        let Some(Dataset::Plateau(tran)) = dataset(&snapshot, "d_11111_tran") else {
            panic!("tran dataset not found");
        };
        assert_eq!(tran.items[0].format, DatasetFormat::Mvt);
        assert_eq!(
            tran.items[0].url,
            format!("{BASE}/11111_bar-shi_city_2023_citygml_1_op_tran_mvt_lod1/{{z}}/{{x}}/{{y}}.mvt")
        );
        assert_eq!(tran.plateau_spec_minor_id.as_str(), "ps_3.2");
        assert_eq!(tran.type_id.as_str(), "dt_tran_3");
    }

    #[test]
    fn test_malformed_record_only_adds_warnings() {
        let tran = |extra: Option<Value>| {
            let mut records = vec![
                json!({ "id": "t1", "city": "city1", "data": [asset("11111_bar-shi_city_2023_citygml_1_op_tran_mvt_lod1.zip")] }),
                json!({ "id": "t2", "city": "city2", "data": [asset("11200_hoge-shi_city_2023_citygml_1_op_tran_mvt_lod1.zip")] }),
            ];
            records.extend(extra);
            raw(vec![("city", city_records()), ("tran", records)])
        };

        let (clean, clean_warnings) = convert(&all_data(&tran(None)), None);
        let broken = json!({ "id": "t9", "city": "nowhere", "data": [asset("broken.zip")] });
        let (dirty, dirty_warnings) = convert(&all_data(&tran(Some(broken))), None);

        assert!(clean_warnings.is_empty(), "{clean_warnings:?}");
        assert_eq!(
            dirty_warnings,
            vec![
                "plateau t9: city not found: nowhere".to_string(),
                "plateau t9 tran: invalid city: nowhere".to_string(),
            ]
        );
        assert_eq!(dirty.areas.len(), clean.areas.len());
        assert_eq!(dirty.datasets.len(), clean.datasets.len());
        let ids = |s: &Snapshot| s.datasets.all().map(|d| d.id().clone()).collect::<Vec<_>>();
        assert_eq!(ids(&dirty), ids(&clean));
    }

    #[test]
    fn test_flood_datasets() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "fld",
                vec![json!({
                    "id": "f1", "city": "city1",
                    "items": [
                        { "data": [asset("11111_bar-shi_city_2023_citygml_1_op_fld_natl_tamagawa_tamagawa-kumagawa_3dtiles_l1_no_texture.zip")] },
                        { "data": [asset("11111_bar-shi_city_2023_citygml_1_op_fld_natl_arakawa_arakawa_3dtiles_l1_no_texture.zip")] }
                    ],
                    "dic": r#"{"fld": [{"name": "tamagawa_tamagawa-kumagawa_l1", "description": "多摩川", "admin": "国", "scale": "計画規模"}]}"#
                })],
            ),
        ]);
        let all = all_data(&raw);
        let (snapshot, warnings) = convert(&all, None);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("arakawa"), "{warnings:?}");

        let fld: Vec<&Dataset> = snapshot
            .datasets
            .by_category(DatasetTypeCategory::Plateau)
            .iter()
            .collect();
        assert_eq!(fld.len(), 1);
        let Dataset::Plateau(d) = fld[0] else {
            panic!("not a plateau dataset");
        };
        assert_eq!(d.river.as_ref().map(|r| r.admin), Some(RiverAdmin::National));
        assert_eq!(d.subname.as_deref(), Some("多摩川（国管理区間）"));
    }

    #[test]
    fn test_related_datasets() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "bldg",
                vec![json!({
                    "id": "b1", "city": "city1",
                    "dic": r#"{"admin": [{"code": "11112", "description": "bar市 hoge区"}]}"#
                })],
            ),
            (
                "related",
                vec![json!({
                    "id": "r1", "city": "city1",
                    "shelter": {
                        "asset": [
                            asset("11111_bar-shi_city_2023_shelter.geojson"),
                            asset("11112_hoge-ku_city_2023_shelter.geojson"),
                            asset("11119_nowhere_city_2023_shelter.geojson"),
                        ],
                        "conv": [
                            asset("11111_bar-shi_city_2023_shelter.czml"),
                            asset("11112_hoge-ku_city_2023_shelter.czml"),
                        ]
                    },
                    "border": {
                        "asset": [asset("11111_bar-shi_city_2023_border.geojson")],
                        "conv": [asset("11111_bar-shi_city_2023_border.czml")]
                    },
                    "park": {
                        "asset": [asset("11111_bar-shi_city_2022_park.geojson")]
                    }
                })],
            ),
        ]);
        let all = all_data(&raw);
        let (snapshot, warnings) = convert(&all, None);

        let Some(Dataset::Related(shelter)) = dataset(&snapshot, "d_11111_shelter") else {
            panic!("shelter not found");
        };
        assert_eq!(shelter.name, "避難施設情報（bar市）");
        assert_eq!(shelter.items[0].format, DatasetFormat::Czml);
        assert_eq!(shelter.items[0].original_format, Some(DatasetFormat::GeoJson));
        assert_eq!(
            shelter.items[0].original_url.as_deref(),
            Some(format!("{BASE}/11111_bar-shi_city_2023_shelter.geojson").as_str())
        );
        assert!(shelter.admin.is_none());

        assert!(dataset(&snapshot, "d_11112_shelter").is_some());

        let Some(Dataset::Related(border)) = dataset(&snapshot, "d_11111_border") else {
            panic!("border not found");
        };
        assert_eq!(border.items[0].format, DatasetFormat::GeoJson);
        assert_eq!(border.items[0].original_url, None);

        assert!(dataset(&snapshot, "d_11111_park").is_some());
        assert!(warnings.iter().any(|w| w.contains("invalid year")), "{warnings:?}");
        assert!(warnings.iter().any(|w| w == "related 11111: no data for landmark"));
    }

    #[test]
    fn test_generic_and_samples() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "bldg",
                vec![json!({
                    "id": "b1", "city": "city1", "sample": true,
                    "data": [asset("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1.zip")]
                })],
            ),
            (
                "generic",
                vec![
                    json!({
                        "id": "g1", "city": "city1", "name": "公園データ", "category": "ユースケース",
                        "public": true,
                        "items": [
                            { "id": "x", "name": "公園", "data": asset("park.geojson") },
                            { "name": "ベースマップ", "url": "https://tiles.example.com/{z}/{x}/{y}.png" },
                            { "name": "unknown", "url": "https://example.com/a.bin" }
                        ]
                    }),
                    json!({ "id": "g2", "city": "city1", "category": "nope", "items": [] }),
                    json!({ "id": "g3", "city": "city1", "items": [] }),
                ],
            ),
        ]);
        let all = all_data(&raw);
        let (snapshot, warnings) = convert(&all, None);

        let Some(Dataset::Generic(g1)) = dataset(&snapshot, "d_g1") else {
            panic!("generic dataset not found");
        };
        assert_eq!(g1.type_code, "usecase");
        assert_eq!(g1.items.len(), 2);
        assert_eq!(g1.items[0].id.as_str(), "di_g1_x");
        assert_eq!(g1.items[1].format, DatasetFormat::Tiles);
        assert!(g1.admin.is_none());

        assert_eq!(
            warnings,
            vec![
                "generic g1[2]: unknown format: ".to_string(),
                "generic g2: unknown category: nope".to_string(),
                "generic g3: no items".to_string(),
            ]
        );

        assert!(dataset(&snapshot, "d_11111_bldg").is_none());
        let Some(Dataset::Generic(sample)) = dataset(&snapshot, "d_11111_bldg_sample") else {
            panic!("sample not relocated");
        };
        assert_eq!(sample.type_code, "sample");
        let admin = sample.admin.as_ref();
        assert_eq!(admin.map(|a| a.sample), Some(true));
        assert_eq!(admin.and_then(|a| a.plateau_type_code.as_deref()), Some("bldg"));
        assert_eq!(
            admin.and_then(|a| a.plateau_type_id.as_ref()).map(Id::as_str),
            Some("dt_bldg_3")
        );
    }

    #[test]
    fn test_citygml() {
        let raw = raw(vec![
            ("city", city_records()),
            (
                "bldg",
                vec![json!({
                    "id": "b1", "city": "city1",
                    "data": [asset("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1.zip")]
                })],
            ),
            (
                GEOSPATIALJP_DATA_MODEL,
                vec![json!({
                    "id": "gj1", "city": "city1",
                    "citygml": asset("11111_bar-shi_city_2023_citygml_1_op.zip"),
                    "maxlod": asset("11111_bar-shi_city_2023_maxlod.csv")
                })],
            ),
            (
                SAMPLE_MODEL,
                vec![
                    json!({
                        "id": "s1", "city": "city1", "feature_type": "bldg",
                        "citygml": asset("sample_citygml.zip")
                    }),
                    json!({ "id": "s2", "city": "city2", "citygml": asset("other.zip") }),
                ],
            ),
        ]);
        let all = all_data(&raw);
        let (snapshot, warnings) = convert(&all, None);

        assert_eq!(snapshot.citygml.len(), 1);
        let cg = &snapshot.citygml[0];
        assert_eq!(cg.id.as_str(), "cg_11111");
        assert_eq!(cg.feature_types, vec!["bldg".to_string()]);
        assert_eq!(cg.url, format!("{BASE}/11111_bar-shi_city_2023_citygml_1_op.zip"));
        let admin = cg.admin.as_ref();
        assert_eq!(admin.map(|a| a.citygml_urls.len()), Some(2));
        assert_eq!(admin.map(|a| a.max_lod_urls.len()), Some(1));
        assert_eq!(warnings, vec!["sample s2: no citygml for city: city2".to_string()]);
    }
}
