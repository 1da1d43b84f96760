//! End-to-end run over GeoJSON layers written to a scratch directory

use std::fs;
use std::path::{Path, PathBuf};

use geojson::FeatureCollection;
use parkaccess_core::output::ExportStatus;
use parkaccess_core::prelude::*;
use serde_json::{Value, json};

const PLACE: &str = "Test Town, Nepal";
const UTM_CRS: &str = "EPSG:32645";
const NODE_Y: f64 = 3_067_000.0;

fn node_x(i: usize) -> f64 {
    334_370.0 + i as f64 * 100.0
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("parkaccess-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn collection(crs: Option<&str>, features: Vec<Value>) -> Value {
    let mut fc = json!({"type": "FeatureCollection", "features": features});
    if let Some(crs) = crs {
        fc["crs"] = json!({"type": "name", "properties": {"name": crs}});
    }
    fc
}

fn square(x: f64, y: f64, half: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {"type": "Polygon", "coordinates": [[
            [x - half, y - half], [x + half, y - half], [x + half, y + half],
            [x - half, y + half], [x - half, y - half]
        ]]}
    })
}

fn write_layer(dir: &Path, layer: &str, value: &Value) {
    let path = dir.join(format!("{}_{layer}.geojson", safe_place_name(PLACE)));
    fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

/// Five intersections 100 m apart along one street, a building 20 m north of
/// each, one more building far to the east, and a park given in WGS84 that
/// lands on the last intersection.
fn write_fixtures(dir: &Path, with_boundary: bool) {
    let nodes = (0..5)
        .map(|i| {
            json!({
                "type": "Feature",
                "properties": {"osmid": 1000 + i, "street_count": 2},
                "geometry": {"type": "Point", "coordinates": [node_x(i), NODE_Y]}
            })
        })
        .collect();
    write_layer(dir, "walking_nodes", &collection(Some(UTM_CRS), nodes));

    let edges = vec![
        // no stored length, measured along the geometry
        json!({
            "type": "Feature",
            "properties": {"u": 1000, "v": 1001, "highway": "footway"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[node_x(0), NODE_Y], [node_x(1), NODE_Y]]
            }
        }),
        // neither length nor geometry, straight segment between the nodes
        json!({"type": "Feature", "properties": {"u": 1001, "v": 1002}, "geometry": null}),
        json!({
            "type": "Feature",
            "properties": {"u": 1002, "v": 1003, "length": 100.0},
            "geometry": null
        }),
        json!({
            "type": "Feature",
            "properties": {"u": 1003, "v": 1004, "length": 100.0},
            "geometry": null
        }),
    ];
    write_layer(dir, "walking_edges", &collection(Some(UTM_CRS), edges));

    let mut buildings: Vec<Value> = (0..5)
        .map(|i| {
            square(
                node_x(i),
                NODE_Y + 20.0,
                5.0,
                json!({"building": "yes", "addr:street": "Durbar Marg", "Levels": i}),
            )
        })
        .collect();
    buildings.push(square(335_500.0, NODE_Y + 20.0, 5.0, json!({"building": "shed"})));
    buildings.push(json!({
        "type": "Feature",
        "properties": {"amenity": "bench"},
        "geometry": {"type": "Point", "coordinates": [node_x(0), NODE_Y]}
    }));
    write_layer(dir, "buildings", &collection(Some(UTM_CRS), buildings));

    // 85.3240 E, 27.7172 N is about (334769.8, 3067000.0) in UTM 45N
    let parks = vec![square(85.3240, 27.7172, 0.0001, json!({"leisure": "park"}))];
    write_layer(dir, "parks", &collection(None, parks));

    if with_boundary {
        let boundary = vec![square(334_575.0, NODE_Y, 275.0, json!({"name": "Test Town"}))];
        write_layer(dir, "boundary", &collection(Some(UTM_CRS), boundary));
    }
}

fn config(data_dir: &Path, output_dir: &Path, max_distance_m: f64) -> AnalysisConfig {
    AnalysisConfig {
        place_name: PLACE.to_string(),
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        max_distance_m,
        ..AnalysisConfig::default()
    }
}

#[test]
fn full_pipeline_exports_results() {
    let data_dir = scratch_dir("pipeline-data");
    let output_dir = data_dir.join("out");
    write_fixtures(&data_dir, true);
    let config = config(&data_dir, &output_dir, 250.0);
    config.validate().unwrap();

    let dataset = GeoJsonDirSource::new(&config.data_dir)
        .load(&config.place_name)
        .unwrap();
    assert_eq!(dataset.buildings.len(), 6);
    assert_eq!(dataset.parks.crs, Crs::Wgs84);

    let prepared = create_accessibility_model(dataset, &config).unwrap();
    assert_eq!(prepared.buildings.len(), 5);
    assert_eq!(prepared.model.node_count(), 5);
    assert_eq!(prepared.model.edge_count(), 4);

    let resolved = prepared
        .model
        .resolve(&prepared.buildings, &prepared.parks)
        .unwrap();
    assert_eq!(resolved.park_nodes.len(), 1);

    let report = prepared
        .model
        .compute_accessibility(&resolved, config.max_distance_m)
        .unwrap();
    let distances: Vec<_> = report.results.iter().map(|r| r.distance_m).collect();
    assert_eq!(distances, vec![None, None, Some(200.0), Some(100.0), Some(0.0)]);

    let paths = ExportPaths::new(&config.output_dir, &config.place_name, config.max_distance_m);
    let statuses = export_report(
        &paths,
        &report,
        &resolved.buildings,
        prepared.model.crs(),
        false,
    )
    .unwrap();
    assert_eq!(statuses, (ExportStatus::Written, ExportStatus::Written));
    assert!(
        paths
            .geojson
            .ends_with("test_town_nepal_park_access_250m.geojson")
    );

    let exported: FeatureCollection = fs::read_to_string(&paths.geojson)
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(exported.features.len(), 5);
    let first = exported.features[0].properties.as_ref().unwrap();
    assert_eq!(first["addr_street"], "Durbar Marg");
    assert_eq!(first["levels"], 0);
    assert_eq!(first["nearest_node"], 1000);
    assert_eq!(first["park_access_250m"], false);
    assert_eq!(first["access_band"], "not_accessible");
    let last = exported.features[4].properties.as_ref().unwrap();
    assert_eq!(last["park_access_250m"], true);
    assert_eq!(last["dist_to_park_m"], 0.0);
    assert_eq!(last["access_band"], "within_500m");

    let csv = fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 6);

    let summary = AccessSummary::from_report(&report);
    assert_eq!(summary.accessible, 3);
    assert_eq!(summary.inaccessible, 2);
    assert!((summary.mean_distance_m.unwrap() - 100.0).abs() < 1e-9);

    fs::remove_dir_all(&data_dir).unwrap();
}

#[test]
fn sweep_without_boundary_keeps_every_building() {
    let data_dir = scratch_dir("pipeline-sweep");
    write_fixtures(&data_dir, false);
    let config = config(&data_dir, &data_dir, 1500.0);

    let dataset = GeoJsonDirSource::new(&data_dir).load(PLACE).unwrap();
    assert!(dataset.boundary.is_none());

    let prepared = create_accessibility_model(dataset, &config).unwrap();
    assert_eq!(prepared.buildings.len(), 6);

    let resolved = prepared
        .model
        .resolve(&prepared.buildings, &prepared.parks)
        .unwrap();
    let reports = prepared
        .model
        .sweep(&resolved, &[100.0, 300.0, 1000.0])
        .unwrap();
    let counts: Vec<_> = reports.iter().map(AccessibilityReport::accessible_count).collect();
    // the eastern building snaps to the last intersection, 0 m from the park
    assert_eq!(counts, vec![3, 5, 6]);

    fs::remove_dir_all(&data_dir).unwrap();
}

#[test]
fn mislabeled_layer_is_reported() {
    let data_dir = scratch_dir("pipeline-mislabeled");
    write_fixtures(&data_dir, false);
    // projected coordinates declared as WGS84
    let nodes = (0..2)
        .map(|i| {
            json!({
                "type": "Feature",
                "properties": {"osmid": 1000 + i},
                "geometry": {"type": "Point", "coordinates": [node_x(i), NODE_Y]}
            })
        })
        .collect();
    write_layer(&data_dir, "walking_nodes", &collection(None, nodes));

    let dataset = GeoJsonDirSource::new(&data_dir).load(PLACE).unwrap();
    let result = create_accessibility_model(dataset, &config(&data_dir, &data_dir, 500.0));
    assert!(matches!(result, Err(Error::Projection(_))));

    fs::remove_dir_all(&data_dir).unwrap();
}
