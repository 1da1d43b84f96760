use std::io::Write;

use super::summary::AccessBand;
use super::to_geojson::{ACCESS_BAND, DIST_TO_PARK, NEAREST_NODE};
use crate::algo::AccessibilityReport;
use crate::crs::Transformer;
use crate::model::SnappedFeature;
use crate::{Crs, Error};

/// One row per building: source position, WGS84 centroid and result.
/// Missing values are written as empty fields.
///
/// # Errors
///
/// [`Error::InvalidData`] if the report and the buildings differ in length,
/// [`Error::CsvError`] on write failures.
pub fn write_report_csv<W: Write>(
    writer: W,
    report: &AccessibilityReport,
    buildings: &[SnappedFeature],
    crs: Crs,
) -> Result<(), Error> {
    if report.len() != buildings.len() {
        return Err(Error::InvalidData(format!(
            "report has {} results for {} buildings",
            report.len(),
            buildings.len()
        )));
    }

    let to_wgs84 = Transformer::new(crs, Crs::Wgs84);
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "building",
        "lon",
        "lat",
        NEAREST_NODE,
        DIST_TO_PARK,
        report.access_column().as_str(),
        ACCESS_BAND,
    ])?;

    for (building, result) in buildings.iter().zip(&report.results) {
        let point = to_wgs84.transform_geometry(&building.point.geometry)?;
        csv.write_record([
            building.point.source_index.to_string(),
            point.x().to_string(),
            point.y().to_string(),
            building.node_id.map(|id| id.to_string()).unwrap_or_default(),
            result.distance_m.map(|d| d.to_string()).unwrap_or_default(),
            result.accessible.to_string(),
            AccessBand::classify(result).to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
