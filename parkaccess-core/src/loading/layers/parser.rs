use std::fs;
use std::path::Path;

use geo::{LineString, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection, feature::Id};
use log::debug;
use serde_json::Value;

use super::raw_types::{
    EdgeLayer, EdgeProperties, EdgeRecord, NodeLayer, NodeProperties, NodeRecord,
};
use crate::model::{FeatureLayer, PolygonFeature};
use crate::{Crs, Error, NodeId};

/// Read a GeoJSON `FeatureCollection` from disk.
///
/// # Errors
///
/// [`Error::IoError`] naming the path if the file cannot be read,
/// [`Error::GeoJsonError`] if it is not a feature collection.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;
    text.parse::<FeatureCollection>()
        .map_err(|e| Error::GeoJsonError(format!("{}: {e}", path.display())))
}

/// CRS declared by the legacy `crs` member, WGS84 when absent
pub fn layer_crs(collection: &FeatureCollection) -> Result<Crs, Error> {
    let name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|properties| properties.get("name"))
        .and_then(Value::as_str);

    match name {
        Some(name) => name.parse(),
        None => Ok(Crs::Wgs84),
    }
}

/// Keep the `Polygon` and `MultiPolygon` features of a collection
pub fn polygon_layer(collection: FeatureCollection) -> Result<FeatureLayer, Error> {
    let crs = layer_crs(&collection)?;
    let total = collection.features.len();

    let features: Vec<PolygonFeature> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let geometry = polygonal(&feature)?;
            Some(PolygonFeature {
                geometry,
                properties: feature.properties.unwrap_or_default(),
            })
        })
        .collect();

    if features.len() < total {
        debug!(
            "Skipped {} of {total} features without polygonal geometry",
            total - features.len()
        );
    }
    Ok(FeatureLayer::new(crs, features))
}

fn polygonal(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let value = &feature.geometry.as_ref()?.value;
    match geo::Geometry::<f64>::try_from(value).ok()? {
        geo::Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Some(multi),
        _ => None,
    }
}

/// Walking network nodes. Each feature must be a point with an integer
/// `osmid` property or feature id.
pub fn node_layer(collection: FeatureCollection) -> Result<NodeLayer, Error> {
    let crs = layer_crs(&collection)?;

    let nodes = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(position, feature)| {
            let geometry = feature
                .geometry
                .as_ref()
                .and_then(|g| Point::<f64>::try_from(&g.value).ok())
                .ok_or_else(|| {
                    Error::InvalidData(format!("node feature {position} is not a point"))
                })?;

            let fallback_id = feature.id.as_ref().and_then(feature_id);
            let properties: NodeProperties = match feature.properties {
                Some(properties) => serde_json::from_value(Value::Object(properties))
                    .map_err(|e| {
                        Error::InvalidData(format!("node feature {position}: {e}"))
                    })?,
                None => NodeProperties::default(),
            };
            let id = properties.osmid.or(fallback_id).ok_or_else(|| {
                Error::InvalidData(format!("node feature {position} has no osmid"))
            })?;

            Ok(NodeRecord { id, geometry })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(NodeLayer { crs, nodes })
}

/// Walking network edges. Each feature needs integer `u` and `v`
/// properties; `length` and a line geometry are optional.
pub fn edge_layer(collection: FeatureCollection) -> Result<EdgeLayer, Error> {
    let crs = layer_crs(&collection)?;

    let edges = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(position, feature)| {
            let geometry = feature
                .geometry
                .as_ref()
                .and_then(|g| LineString::<f64>::try_from(&g.value).ok());

            let properties = feature.properties.ok_or_else(|| {
                Error::InvalidData(format!("edge feature {position} has no properties"))
            })?;
            let EdgeProperties { u, v, length } =
                serde_json::from_value(Value::Object(properties)).map_err(|e| {
                    Error::InvalidData(format!("edge feature {position}: {e}"))
                })?;

            Ok(EdgeRecord {
                u,
                v,
                length,
                geometry,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(EdgeLayer { crs, edges })
}

fn feature_id(id: &Id) -> Option<NodeId> {
    match id {
        Id::Number(number) => number.as_i64(),
        Id::String(text) => text.parse().ok(),
    }
}
