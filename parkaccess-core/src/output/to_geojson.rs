use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Value, json};

use super::columns::sanitize_properties;
use super::summary::AccessBand;
use crate::algo::AccessibilityReport;
use crate::crs::Transformer;
use crate::model::{Properties, SnappedFeature};
use crate::{Crs, Error};

pub(crate) const NEAREST_NODE: &str = "nearest_node";
pub(crate) const DIST_TO_PARK: &str = "dist_to_park_m";
pub(crate) const ACCESS_BAND: &str = "access_band";

/// Building centroids with their results as a WGS84 `FeatureCollection`.
///
/// `buildings` must be the slice the report was computed for; its points are
/// expected in `crs`.
///
/// # Errors
///
/// [`Error::InvalidData`] if the report and the buildings differ in length,
/// [`Error::Projection`] if a centroid cannot be brought back to WGS84.
pub fn report_to_geojson(
    report: &AccessibilityReport,
    buildings: &[SnappedFeature],
    crs: Crs,
) -> Result<FeatureCollection, Error> {
    if report.len() != buildings.len() {
        return Err(Error::InvalidData(format!(
            "report has {} results for {} buildings",
            report.len(),
            buildings.len()
        )));
    }

    let access_column = report.access_column();
    let reserved = [NEAREST_NODE, DIST_TO_PARK, access_column.as_str(), ACCESS_BAND];
    let to_wgs84 = Transformer::new(crs, Crs::Wgs84);

    let features = buildings
        .iter()
        .zip(&report.results)
        .map(|(building, result)| {
            let point = to_wgs84.transform_geometry(&building.point.geometry)?;

            let mut properties: Properties =
                sanitize_properties(&building.point.properties, &reserved);
            properties.insert(NEAREST_NODE.to_string(), json!(building.node_id));
            properties.insert(DIST_TO_PARK.to_string(), json!(result.distance_m));
            properties.insert(access_column.clone(), Value::Bool(result.accessible));
            properties.insert(
                ACCESS_BAND.to_string(),
                Value::String(AccessBand::classify(result).as_str().to_string()),
            );

            Ok::<_, Error>(Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeoJsonValue::from(&point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn report_to_geojson_string(
    report: &AccessibilityReport,
    buildings: &[SnappedFeature],
    crs: Crs,
) -> Result<String, Error> {
    serde_json::to_string(&report_to_geojson(report, buildings, crs)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::algo::AccessibilityResult;
    use crate::model::FeaturePoint;

    fn building(x: f64, y: f64, properties: Value, node_id: Option<i64>) -> SnappedFeature {
        SnappedFeature {
            point: FeaturePoint {
                source_index: 0,
                geometry: Point::new(x, y),
                properties: properties.as_object().cloned().unwrap_or_default(),
            },
            node: None,
            node_id,
            snap_distance: None,
        }
    }

    #[test]
    fn features_carry_results_in_wgs84() {
        let utm = Crs::Utm {
            zone: 45,
            north: true,
        };
        let buildings = vec![
            building(
                500_000.0,
                0.0,
                json!({"addr:street": "Durbar Marg", "access_band": "x"}),
                Some(7),
            ),
            building(500_100.0, 0.0, json!({}), None),
        ];
        let report = AccessibilityReport {
            max_distance: 1500.0,
            results: vec![
                AccessibilityResult::reachable(320.0),
                AccessibilityResult::unreachable(),
            ],
        };

        let fc = report_to_geojson(&report, &buildings, utm).unwrap();
        assert_eq!(fc.features.len(), 2);

        let first = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(first["addr_street"], "Durbar Marg");
        assert_eq!(first["access_band_1"], "x");
        assert_eq!(first["access_band"], "within_500m");
        assert_eq!(first["nearest_node"], 7);
        assert_eq!(first["dist_to_park_m"], 320.0);
        assert_eq!(first["park_access_1500m"], true);

        let second = fc.features[1].properties.as_ref().unwrap();
        assert!(second["dist_to_park_m"].is_null());
        assert!(second["nearest_node"].is_null());
        assert_eq!(second["park_access_1500m"], false);
        assert_eq!(second["access_band"], "not_accessible");

        let point: Point<f64> = fc.features[0]
            .geometry
            .as_ref()
            .map(|g| Point::try_from(&g.value).unwrap())
            .unwrap();
        assert!((point.x() - 87.0).abs() < 1e-9);
        assert!(point.y().abs() < 1e-9);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let report = AccessibilityReport {
            max_distance: 500.0,
            results: vec![AccessibilityResult::unreachable()],
        };
        assert!(matches!(
            report_to_geojson(&report, &[], Crs::Wgs84),
            Err(Error::InvalidData(_))
        ));
    }
}
