//! Parser for encoded asset file names.
//!
//! PLATEAU assets encode their metadata in the file name:
//!
//! ```text
//! <cityCode>_<cityName>_<provider>_<year>_<format>_<revision>[_op][_<extension>]
//! ```
//!
//! The extension describes the feature data and takes one of three shapes:
//! a normal one (`bldg_3dtiles_lod1`), a classified one keyed by a dictionary
//! class (`urf_UseDistrict_mvt`) and a flood one naming a river reach
//! (`fld_pref_tamagawa_3dtiles_l1`).
//!
//! # Examples
//!
//! ```
//! use plateau_catalog_core::name::{AssetName, ExShape};
//!
//! let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1")
//!     .expect("valid asset name");
//! assert_eq!(name.city_code, "11111");
//! assert!(matches!(name.shape(), Some(ExShape::Normal(n)) if n.lod == 1));
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{name_from_url, name_without_ext};

static ASSET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)_([a-z0-9-]+)_([a-z0-9-]+)_(\d{4})_(.+?)_(\d+)(?:_op)?(?:_(.+))?$")
        .expect("valid asset name regex")
});

static EX_NORMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)_(mvt|3dtiles)(?:_(\d+)_([a-z0-9-]+))?(_lod\d+)?(_no_texture)?$")
        .expect("valid normal extension regex")
});

static EX_NORMAL_DM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)_dm_geometric_attributes$").expect("valid dm extension regex")
});

static EX_CLASSIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)_([A-Za-z0-9-_]+)_(mvt|3dtiles)(_lod\d+)?(_no_texture)?$")
        .expect("valid classified extension regex")
});

static EX_FLOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^fld_(natl|pref)_([A-Za-z0-9-_]+)_3dtiles_(l\d+)(?:-(.+?))?(_no_texture)?$")
        .expect("valid flood extension regex")
});

static RELATED_ASSET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+)_([a-zA-Z0-9-]+)_([a-zA-Z0-9-]+)_(\d+)_(?:(\d+)_([a-zA-Z0-9-]+?)_)?([a-zA-Z0-9-_]+)\.([a-z0-9]+)$",
    )
    .expect("valid related asset name regex")
});

/// A parsed asset file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    pub city_code: String,
    pub city_name: String,
    pub provider: String,
    pub year: i32,
    /// Base format of the package, usually `citygml`.
    pub format: String,
    pub revision: i32,
    /// Feature extension, absent when the name has none.
    pub ex: Option<AssetNameEx>,
}

/// Feature extension of an asset name, with its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNameEx {
    pub raw: String,
    pub shape: ExShape,
}

/// The three recognised extension shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExShape {
    Normal(NormalEx),
    Classified(ClassifiedEx),
    Flood(FloodEx),
    /// The text matches no known shape.
    Unrecognised,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalEx {
    pub feature_type: String,
    pub format: String,
    pub ward_code: Option<String>,
    pub ward_name: Option<String>,
    pub lod: i32,
    pub no_texture: bool,
}

/// Extension of data classified by a dictionary key (e.g. urban planning classes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEx {
    pub feature_type: String,
    pub class_name: String,
    pub format: String,
    pub lod: i32,
    pub no_texture: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodEx {
    /// `natl` or `pref`
    pub admin: String,
    pub river: String,
    pub format: String,
    /// Scale level, `1` for `l1`.
    pub level: i32,
    pub suffix: Option<String>,
    pub no_texture: bool,
}

impl AssetName {
    /// Parses a file name without extension. Returns `None` when the positional
    /// prefix does not match or a number in it overflows.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let caps = ASSET_NAME.captures(name)?;
        let ex = caps
            .get(7)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(AssetNameEx::parse);

        Some(Self {
            city_code: caps[1].to_string(),
            city_name: caps[2].to_string(),
            provider: caps[3].to_string(),
            year: caps[4].parse().ok()?,
            format: caps[5].to_string(),
            revision: caps[6].parse().ok()?,
            ex,
        })
    }

    /// Parses the file name of an asset URL.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        Self::parse(name_without_ext(&name_from_url(url)))
    }

    /// Returns the extension shape, if the name has an extension.
    #[must_use]
    pub fn shape(&self) -> Option<&ExShape> {
        self.ex.as_ref().map(|ex| &ex.shape)
    }

    /// Returns `true` if the extension has one of the three known shapes.
    #[must_use]
    pub fn has_valid_ex(&self) -> bool {
        self.shape().is_some_and(ExShape::is_valid)
    }

    #[must_use]
    pub fn normal(&self) -> Option<&NormalEx> {
        match self.shape() {
            Some(ExShape::Normal(n)) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{:04}_{}_{}_op",
            self.city_code, self.city_name, self.provider, self.year, self.format, self.revision
        )?;
        if let Some(ex) = &self.ex {
            write!(f, "_{}", ex.raw)?;
        }
        Ok(())
    }
}

impl AssetNameEx {
    /// Classifies an extension, trying the flood, classified and normal shapes in that order.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let shape = FloodEx::parse(raw)
            .map(ExShape::Flood)
            .or_else(|| ClassifiedEx::parse(raw).map(ExShape::Classified))
            .or_else(|| NormalEx::parse(raw).map(ExShape::Normal))
            .unwrap_or(ExShape::Unrecognised);
        Self {
            raw: raw.to_string(),
            shape,
        }
    }
}

impl ExShape {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, ExShape::Unrecognised)
    }

    /// Key grouping assets into one dataset.
    #[must_use]
    pub fn dataset_key(&self) -> Option<String> {
        match self {
            ExShape::Classified(c) => Some(c.class_name.clone()),
            ExShape::Flood(f) => Some(format!("{}_{}{}", f.admin, f.river, f.suffix_part())),
            ExShape::Normal(_) | ExShape::Unrecognised => None,
        }
    }

    /// Key looked up in the feature item's dictionary.
    #[must_use]
    pub fn dic_key(&self) -> Option<String> {
        match self {
            ExShape::Classified(c) => Some(c.class_name.clone()),
            ExShape::Flood(f) => Some(format!("{}_l{}{}", f.river, f.level, f.suffix_part())),
            ExShape::Normal(_) | ExShape::Unrecognised => None,
        }
    }

    /// Key distinguishing items within one dataset.
    #[must_use]
    pub fn item_key(&self) -> Option<String> {
        match self {
            ExShape::Classified(c) => Some(c.class_name.clone()),
            ExShape::Flood(f) => Some(format!("l{}", f.level)),
            ExShape::Normal(_) | ExShape::Unrecognised => None,
        }
    }
}

/// LOD of an optional `_lodN` capture, `0` when absent and `None` when it overflows.
fn lod_from(m: Option<regex::Match<'_>>) -> Option<i32> {
    match m.and_then(|m| m.as_str().strip_prefix("_lod")) {
        Some(s) => s.parse().ok(),
        None => Some(0),
    }
}

impl NormalEx {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(caps) = EX_NORMAL.captures(raw) {
            return Some(Self {
                feature_type: caps[1].to_string(),
                format: caps[2].to_string(),
                ward_code: caps.get(3).map(|m| m.as_str().to_string()),
                ward_name: caps.get(4).map(|m| m.as_str().to_string()),
                lod: lod_from(caps.get(5))?,
                no_texture: caps.get(6).is_some(),
            });
        }

        let caps = EX_NORMAL_DM.captures(raw)?;
        Some(Self {
            feature_type: caps[1].to_string(),
            format: "mvt".to_string(),
            ward_code: None,
            ward_name: None,
            lod: 0,
            no_texture: false,
        })
    }
}

impl ClassifiedEx {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = EX_CLASSIFIED.captures(raw)?;
        Some(Self {
            feature_type: caps[1].to_string(),
            class_name: caps[2].to_string(),
            format: caps[3].to_string(),
            lod: lod_from(caps.get(4))?,
            no_texture: caps.get(5).is_some(),
        })
    }
}

impl FloodEx {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = EX_FLOOD.captures(raw)?;
        Some(Self {
            admin: caps[1].to_string(),
            river: caps[2].to_string(),
            format: "3dtiles".to_string(),
            level: caps[3][1..].parse().ok()?,
            suffix: caps.get(4).map(|m| m.as_str().to_string()),
            no_texture: caps.get(5).is_some(),
        })
    }

    fn suffix_part(&self) -> String {
        self.suffix
            .as_deref()
            .map(|s| format!("-{s}"))
            .unwrap_or_default()
    }
}

/// A parsed related dataset file name (with its extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedAssetName {
    pub code: String,
    pub name: String,
    pub provider: String,
    pub year: i32,
    pub ward_code: Option<String>,
    pub ward_name: Option<String>,
    /// Related dataset type, e.g. `shelter`.
    pub feature_type: String,
    /// File extension, e.g. `geojson`.
    pub format: String,
}

impl RelatedAssetName {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let caps = RELATED_ASSET_NAME.captures(name)?;
        Some(Self {
            code: caps[1].to_string(),
            name: caps[2].to_string(),
            provider: caps[3].to_string(),
            year: caps[4].parse().ok()?,
            ward_code: caps.get(5).map(|m| m.as_str().to_string()),
            ward_name: caps.get(6).map(|m| m.as_str().to_string()),
            feature_type: caps[7].to_string(),
            format: caps[8].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_ward_asset() {
        let name =
            AssetName::from_url("https://example.com/11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_11112_hoge-ku_lod1.zip");
        assert_eq!(
            name,
            Some(AssetName {
                city_code: "11111".to_string(),
                city_name: "bar-shi".to_string(),
                provider: "city".to_string(),
                year: 2023,
                format: "citygml".to_string(),
                revision: 1,
                ex: Some(AssetNameEx {
                    raw: "bldg_3dtiles_11112_hoge-ku_lod1".to_string(),
                    shape: ExShape::Normal(NormalEx {
                        feature_type: "bldg".to_string(),
                        format: "3dtiles".to_string(),
                        ward_code: Some("11112".to_string()),
                        ward_name: Some("hoge-ku".to_string()),
                        lod: 1,
                        no_texture: false,
                    }),
                }),
            })
        );
    }

    #[test]
    fn test_parse_normal_variants() {
        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_tran_mvt_lod2_no_texture");
        let normal = name.as_ref().and_then(AssetName::normal);
        assert_eq!(normal.map(|n| n.lod), Some(2));
        assert_eq!(normal.map(|n| n.no_texture), Some(true));
        assert_eq!(normal.and_then(|n| n.ward_code.clone()), None);

        let dm = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_tran_dm_geometric_attributes");
        let normal = dm.as_ref().and_then(AssetName::normal);
        assert_eq!(normal.map(|n| n.format.as_str()), Some("mvt"));
        assert_eq!(normal.map(|n| n.lod), Some(0));
    }

    #[test]
    fn test_parse_classified() {
        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_mvt_lod1");
        let Some(ExShape::Classified(ex)) = name.as_ref().and_then(AssetName::shape) else {
            panic!("expected classified extension: {name:?}");
        };
        assert_eq!(ex.feature_type, "urf");
        assert_eq!(ex.class_name, "UseDistrict");
        assert_eq!(ex.lod, 1);

        let shape = name.as_ref().and_then(AssetName::shape);
        assert_eq!(shape.and_then(ExShape::dataset_key).as_deref(), Some("UseDistrict"));
        assert_eq!(shape.and_then(ExShape::dic_key).as_deref(), Some("UseDistrict"));
        assert_eq!(shape.and_then(ExShape::item_key).as_deref(), Some("UseDistrict"));
    }

    #[test]
    fn test_parse_flood() {
        let name = AssetName::parse(
            "11111_bar-shi_city_2023_citygml_1_op_fld_pref_tamagawa_3dtiles_l2-foo_no_texture",
        );
        let shape = name.as_ref().and_then(AssetName::shape);
        let Some(ExShape::Flood(ex)) = shape else {
            panic!("expected flood extension: {name:?}");
        };
        assert_eq!(ex.admin, "pref");
        assert_eq!(ex.river, "tamagawa");
        assert_eq!(ex.level, 2);
        assert_eq!(ex.suffix.as_deref(), Some("foo"));
        assert!(ex.no_texture);
        assert_eq!(shape.and_then(ExShape::dataset_key).as_deref(), Some("pref_tamagawa-foo"));
        assert_eq!(shape.and_then(ExShape::dic_key).as_deref(), Some("tamagawa_l2-foo"));
        assert_eq!(shape.and_then(ExShape::item_key).as_deref(), Some("l2"));
    }

    #[test]
    fn test_normal_has_no_keys() {
        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1");
        let shape = name.as_ref().and_then(AssetName::shape);
        assert_eq!(shape.and_then(ExShape::dataset_key), None);
        assert_eq!(shape.and_then(ExShape::dic_key), None);
        assert_eq!(shape.and_then(ExShape::item_key), None);
    }

    #[test]
    fn test_missing_and_unrecognised_extension() {
        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op");
        assert_eq!(name.as_ref().map(|n| n.ex.is_none()), Some(true));
        assert_eq!(name.as_ref().map(AssetName::has_valid_ex), Some(false));

        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_weird!ext");
        assert_eq!(name.as_ref().and_then(AssetName::shape), Some(&ExShape::Unrecognised));
        assert_eq!(
            name.as_ref().and_then(|n| n.ex.as_ref()).map(|e| e.raw.as_str()),
            Some("weird!ext")
        );
    }

    #[test]
    fn test_unparseable_and_junk() {
        for junk in [
            "",
            "_",
            "foo",
            "11111_BAR_city_2023_citygml_1_op",
            "11111_bar_city_23_citygml_1",
            "ａｂｃ_日本語_🙂",
            "1_a_b_2023_c_x",
            "____________",
        ] {
            assert_eq!(AssetName::parse(junk), None, "{junk}");
        }
    }

    #[test]
    fn test_canonical_rendering_reparses() {
        for name in [
            "11111_bar-shi_city_2023_citygml_1_bldg_3dtiles_lod1",
            "11111_bar-shi_city_2023_citygml_2_op_fld_natl_tamagawa_3dtiles_l1",
            "11111_bar-shi_city_2023_citygml_3_op",
            "11111_bar-shi_city_2023_citygml_1_op_urf_UseDistrict_mvt",
            "11111_bar-shi_city_0123_citygml_1_op",
        ] {
            let parsed = AssetName::parse(name);
            let rendered = parsed.as_ref().map(ToString::to_string);
            assert_eq!(
                rendered.as_deref().and_then(AssetName::parse),
                parsed,
                "{name}"
            );
        }
        assert_eq!(
            AssetName::parse("11111_bar-shi_city_2023_citygml_1_bldg_3dtiles_lod1")
                .map(|n| n.to_string()),
            Some("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod1".to_string())
        );
    }

    #[test]
    fn test_overflowing_numbers_are_rejected() {
        assert_eq!(AssetName::parse("11111_bar-shi_city_2023_citygml_99999999999_op"), None);

        let name = AssetName::parse(
            "11111_bar-shi_city_2023_citygml_1_op_fld_pref_tamagawa_3dtiles_l99999999999",
        );
        assert_eq!(name.as_ref().and_then(AssetName::shape), Some(&ExShape::Unrecognised));

        let name = AssetName::parse("11111_bar-shi_city_2023_citygml_1_op_bldg_3dtiles_lod99999999999");
        assert_eq!(name.as_ref().map(AssetName::has_valid_ex), Some(false));

        assert_eq!(
            RelatedAssetName::parse("11111_bar-shi_city_99999999999_park.geojson"),
            None
        );
    }

    #[test]
    fn test_parse_related_asset_name() {
        let name = RelatedAssetName::parse("11111_bar-shi_city_2023_11112_hoge-ku_shelter.geojson");
        assert_eq!(
            name,
            Some(RelatedAssetName {
                code: "11111".to_string(),
                name: "bar-shi".to_string(),
                provider: "city".to_string(),
                year: 2023,
                ward_code: Some("11112".to_string()),
                ward_name: Some("hoge-ku".to_string()),
                feature_type: "shelter".to_string(),
                format: "geojson".to_string(),
            })
        );

        let name = RelatedAssetName::parse("11111_bar-shi_city_2023_park.czml");
        assert_eq!(name.as_ref().and_then(|n| n.ward_code.clone()), None);
        assert_eq!(name.map(|n| n.feature_type), Some("park".to_string()));

        assert_eq!(RelatedAssetName::parse("park.geojson"), None);
    }
}
