//! Writing accessibility results: GeoJSON layer, CSV table and summaries

mod columns;
mod summary;
mod table;
mod to_geojson;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

pub use columns::{sanitize_column, sanitize_columns, sanitize_properties};
pub use summary::{AccessBand, AccessSummary};
pub use table::write_report_csv;
pub use to_geojson::{report_to_geojson, report_to_geojson_string};

use crate::algo::AccessibilityReport;
use crate::algo::accessibility::format_meters;
use crate::loading::safe_place_name;
use crate::model::SnappedFeature;
use crate::{Crs, Error, Meters};

/// Output files of one analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub geojson: PathBuf,
    pub csv: PathBuf,
}

impl ExportPaths {
    /// `{output_dir}/{safe_name}_park_access_{max}m.{geojson,csv}`
    pub fn new(output_dir: &Path, place: &str, max_distance: Meters) -> Self {
        let stem = format!(
            "{}_park_access_{}m",
            safe_place_name(place),
            format_meters(max_distance)
        );
        Self {
            geojson: output_dir.join(format!("{stem}.geojson")),
            csv: output_dir.join(format!("{stem}.csv")),
        }
    }
}

/// What happened to each output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Written,
    /// The file already existed and overwriting was not requested
    Kept,
}

/// Write the GeoJSON layer and the CSV table for a report.
///
/// Existing files are left alone unless `overwrite` is set. Each file is
/// rendered in memory first, so a failed export leaves nothing on disk.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created or a file
/// cannot be written.
pub fn export_report(
    paths: &ExportPaths,
    report: &AccessibilityReport,
    buildings: &[SnappedFeature],
    crs: Crs,
    overwrite: bool,
) -> Result<(ExportStatus, ExportStatus), Error> {
    for parent in [paths.geojson.parent(), paths.csv.parent()]
        .into_iter()
        .flatten()
    {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let geojson = if overwrite || !paths.geojson.exists() {
        let collection = report_to_geojson(report, buildings, crs)?;
        let bytes =
            serde_json::to_vec(&collection).map_err(|e| Error::GeoJsonError(e.to_string()))?;
        fs::write(&paths.geojson, bytes)?;
        info!("Wrote {}", paths.geojson.display());
        ExportStatus::Written
    } else {
        info!("{} already exists, keeping it", paths.geojson.display());
        ExportStatus::Kept
    };

    let csv = if overwrite || !paths.csv.exists() {
        let mut buffer = Vec::new();
        write_report_csv(&mut buffer, report, buildings, crs)?;
        fs::write(&paths.csv, buffer)?;
        info!("Wrote {}", paths.csv.display());
        ExportStatus::Written
    } else {
        info!("{} already exists, keeping it", paths.csv.display());
        ExportStatus::Kept
    };

    Ok((geojson, csv))
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::algo::AccessibilityResult;
    use crate::model::{FeaturePoint, Properties};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("parkaccess-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn building(source_index: usize, x: f64, y: f64) -> SnappedFeature {
        SnappedFeature {
            point: FeaturePoint {
                source_index,
                geometry: Point::new(x, y),
                properties: Properties::new(),
            },
            node: None,
            node_id: None,
            snap_distance: None,
        }
    }

    #[test]
    fn export_paths_use_the_safe_name() {
        let paths = ExportPaths::new(Path::new("out"), "Kathmandu, Nepal", 1500.0);
        assert_eq!(
            paths.geojson,
            Path::new("out").join("kathmandu_nepal_park_access_1500m.geojson")
        );
        assert_eq!(
            paths.csv,
            Path::new("out").join("kathmandu_nepal_park_access_1500m.csv")
        );
    }

    #[test]
    fn existing_files_are_kept_unless_overwriting() {
        let dir = scratch_dir("export");
        let paths = ExportPaths::new(&dir, "Test Town", 500.0);
        let report = AccessibilityReport {
            max_distance: 500.0,
            results: Vec::new(),
        };

        let first = export_report(&paths, &report, &[], Crs::Wgs84, false).unwrap();
        assert_eq!(first, (ExportStatus::Written, ExportStatus::Written));

        fs::write(&paths.csv, "sentinel").unwrap();
        let second = export_report(&paths, &report, &[], Crs::Wgs84, false).unwrap();
        assert_eq!(second, (ExportStatus::Kept, ExportStatus::Kept));
        assert_eq!(fs::read_to_string(&paths.csv).unwrap(), "sentinel");

        let third = export_report(&paths, &report, &[], Crs::Wgs84, true).unwrap();
        assert_eq!(third, (ExportStatus::Written, ExportStatus::Written));
        assert!(fs::read_to_string(&paths.csv).unwrap().starts_with("building,"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_export_leaves_no_partial_table() {
        let dir = scratch_dir("export-failed");
        let paths = ExportPaths::new(&dir, "Test Town", 500.0);
        fs::create_dir_all(&dir).unwrap();
        fs::write(&paths.geojson, "{}").unwrap();

        let report = AccessibilityReport {
            max_distance: 500.0,
            results: vec![AccessibilityResult::reachable(120.0); 2],
        };
        // the second row cannot be projected back to longitude/latitude
        let buildings = [
            building(0, 9_500_000.0, 3_200_000.0),
            building(1, f64::NAN, 0.0),
        ];

        let result = export_report(&paths, &report, &buildings, Crs::WebMercator, false);
        assert!(matches!(result, Err(Error::Projection(_))));
        assert!(!paths.csv.exists());

        let retry = export_report(&paths, &report, &buildings[..1], Crs::WebMercator, false);
        assert!(matches!(retry, Err(Error::InvalidData(_))));
        assert!(!paths.csv.exists());

        let report = AccessibilityReport {
            max_distance: 500.0,
            results: vec![AccessibilityResult::reachable(120.0)],
        };
        let written =
            export_report(&paths, &report, &buildings[..1], Crs::WebMercator, false).unwrap();
        assert_eq!(written, (ExportStatus::Kept, ExportStatus::Written));
        assert_eq!(fs::read_to_string(&paths.csv).unwrap().lines().count(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
