//! Helpers for asset URLs, dataset formats and year labels.
//!
//! Assets uploaded to the CMS are archives (`.zip`, `.7z`) that the CMS unpacks
//! next to the archive. [`DatasetFormatExt::asset_url`] maps an archive URL to
//! the URL a viewer should actually load.

use plateau_catalog_common::DatasetFormat;
use url::Url;

const ARCHIVE_EXTS: &[&str] = &[".zip", ".7z"];

/// Extension trait deriving entry URLs from archive asset URLs.
///
/// # Examples
///
/// ```
/// use plateau_catalog_common::DatasetFormat;
/// use plateau_catalog_core::utils::DatasetFormatExt;
///
/// assert_eq!(
///     DatasetFormat::Cesium3DTiles.asset_url("https://example.com/a/bldg.zip"),
///     "https://example.com/a/bldg/tileset.json"
/// );
/// assert_eq!(
///     DatasetFormat::Mvt.asset_url("https://example.com/a/tran.zip"),
///     "https://example.com/a/tran/{z}/{x}/{y}.mvt"
/// );
/// ```
pub trait DatasetFormatExt {
    /// Returns the URL to load for an asset of this format.
    ///
    /// Non-archive URLs and unparseable URLs are returned unchanged.
    fn asset_url(&self, url: &str) -> String;
}

impl DatasetFormatExt for DatasetFormat {
    fn asset_url(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        let path = parsed.path().to_string();
        let (dir, base) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
        let ext = extension(base);
        let stem = &base[..base.len() - ext.len()];
        let is_archive = ARCHIVE_EXTS.contains(&ext);
        let root = format!("{dir}/{stem}");

        match self {
            DatasetFormat::Cesium3DTiles if is_archive => {
                parsed.set_path(&format!("{root}/tileset.json"));
                parsed.to_string()
            },
            DatasetFormat::Mvt | DatasetFormat::Tiles => {
                let res = if is_archive {
                    let ext = if *self == DatasetFormat::Mvt { "mvt" } else { "png" };
                    parsed.set_path(&format!("{root}/{{z}}/{{x}}/{{y}}.{ext}"));
                    parsed.to_string()
                } else {
                    url.to_string()
                };
                res.replace("%7B", "{").replace("%7D", "}")
            },
            DatasetFormat::Tms if is_archive => {
                parsed.set_path(&root);
                parsed.to_string()
            },
            DatasetFormat::Czml if is_archive => {
                parsed.set_path(&format!("{root}/{stem}.czml"));
                parsed.to_string()
            },
            _ => url.to_string(),
        }
    }
}

/// Extension of a file name including the dot, or `""`.
fn extension(name: &str) -> &str {
    name.rfind('.').map_or("", |i| &name[i..])
}

/// Returns the last path segment of a URL.
#[must_use]
pub fn name_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Strips the extension of a file name.
#[must_use]
pub fn name_without_ext(name: &str) -> &str {
    &name[..name.len() - extension(name).len()]
}

/// Takes the format from a format name, or detects it from the URL when no name is given.
#[must_use]
pub fn dataset_format_from_or_detect(format: &str, url: &str) -> Option<DatasetFormat> {
    if format.is_empty() {
        detect_dataset_format(url)
    } else {
        DatasetFormat::from_name(format)
    }
}

/// Detects a dataset format from the file name or tile template of a URL.
#[must_use]
pub fn detect_dataset_format(url: &str) -> Option<DatasetFormat> {
    let lower = url
        .to_lowercase()
        .replace("%7b", "{")
        .replace("%7d", "}");
    let name = name_from_url(&lower);

    if name.ends_with(".geojson") {
        Some(DatasetFormat::GeoJson)
    } else if name.ends_with(".czml") {
        Some(DatasetFormat::Czml)
    } else if lower.ends_with("{z}/{x}/{y}.pbf") || name.ends_with(".mvt") {
        Some(DatasetFormat::Mvt)
    } else if name == "tileset.json" {
        Some(DatasetFormat::Cesium3DTiles)
    } else if name.ends_with(".csv") {
        Some(DatasetFormat::Csv)
    } else if name.ends_with(".gltf") {
        Some(DatasetFormat::Gltf)
    } else if lower.ends_with("{z}/{x}/{y}.png") {
        Some(DatasetFormat::Tiles)
    } else {
        None
    }
}

/// Splits a comma separated layer list.
#[must_use]
pub fn layer_names_from(layer: &str) -> Vec<String> {
    if layer.is_empty() {
        return vec![];
    }
    layer.split(',').map(|s| s.trim().to_string()).collect()
}

/// Normalises a year label to a western year.
///
/// Accepts `2023`, `2023年`, `2023年度` and the Japanese eras `令和`/`平成`
/// (`令和5年度`, `令和元年`). Unrecognised labels give `0`.
///
/// # Examples
///
/// ```
/// use plateau_catalog_core::utils::year_int;
///
/// assert_eq!(year_int("令和5年度"), 2023);
/// assert_eq!(year_int("2023年"), 2023);
/// assert_eq!(year_int("平成31年"), 2019);
/// assert_eq!(year_int("foo"), 0);
/// ```
#[must_use]
pub fn year_int(label: &str) -> i32 {
    let label = label.trim();
    for (era, base) in [("令和", 2018), ("平成", 1988)] {
        if let Some(rest) = label.strip_prefix(era) {
            if rest.starts_with('元') {
                return base + 1;
            }
            return leading_number(rest).map_or(0, |n| base + n);
        }
    }
    leading_number(label).unwrap_or(0)
}

fn leading_number(s: &str) -> Option<i32> {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
