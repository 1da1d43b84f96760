use std::path::{Path, PathBuf};

use log::info;

use super::layers::{
    EdgeLayer, NodeLayer, edge_layer, node_layer, polygon_layer, read_feature_collection,
};
use crate::Error;
use crate::model::FeatureLayer;

/// Everything one analysis reads for a place
#[derive(Debug, Clone)]
pub struct Dataset {
    pub boundary: Option<FeatureLayer>,
    pub buildings: FeatureLayer,
    pub parks: FeatureLayer,
    pub nodes: NodeLayer,
    pub edges: EdgeLayer,
}

/// Where the layers of a place come from
pub trait DataSource {
    /// # Errors
    ///
    /// Returns an error if a required layer is missing or cannot be parsed
    fn load(&self, place: &str) -> Result<Dataset, Error>;
}

/// File name stem for a place: `"Kathmandu, Nepal"` becomes `kathmandu_nepal`
pub fn safe_place_name(place: &str) -> String {
    place.replace(", ", "_").replace(' ', "_").to_lowercase()
}

/// Layers prepared ahead of time as GeoJSON files named
/// `{safe_name}_{layer}.geojson` in one directory
#[derive(Debug, Clone)]
pub struct GeoJsonDirSource {
    dir: PathBuf,
}

impl GeoJsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layer_path(&self, place: &str, layer: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{layer}.geojson", safe_place_name(place)))
    }

    fn required(&self, place: &str, layer: &str) -> Result<PathBuf, Error> {
        let path = self.layer_path(place, layer);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{layer} layer not found: {}", path.display()),
            )))
        }
    }
}

impl DataSource for GeoJsonDirSource {
    fn load(&self, place: &str) -> Result<Dataset, Error> {
        info!("Loading layers for {place} from {}", self.dir.display());

        let buildings = polygon_layer(read_feature_collection(
            &self.required(place, "buildings")?,
        )?)?;
        let parks = polygon_layer(read_feature_collection(&self.required(place, "parks")?)?)?;
        let nodes = node_layer(read_feature_collection(
            &self.required(place, "walking_nodes")?,
        )?)?;
        let edges = edge_layer(read_feature_collection(
            &self.required(place, "walking_edges")?,
        )?)?;

        let boundary_path = self.layer_path(place, "boundary");
        let boundary = if boundary_path.exists() {
            Some(polygon_layer(read_feature_collection(&boundary_path)?)?)
        } else {
            None
        };

        info!(
            "Loaded {} buildings, {} parks, {} street nodes and {} street edges{}",
            buildings.len(),
            parks.len(),
            nodes.nodes.len(),
            edges.edges.len(),
            if boundary.is_some() {
                " with a boundary"
            } else {
                ""
            }
        );

        Ok(Dataset {
            boundary,
            buildings,
            parks,
            nodes,
            edges,
        })
    }
}
