//! Accessibility engine: network distance from every building to the
//! nearest park, thresholded at a maximum walking distance.

use hashbrown::HashMap;
use log::{debug, info};

use crate::model::{ParkNodeSet, SnappedFeature, StreetGraph};
use crate::routing::multi_source_dijkstra;
use crate::{Error, Meters, StreetNodeId};

/// Per-building outcome. `accessible` is true exactly when a distance is
/// present, and a distance is present only if it is within the cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessibilityResult {
    pub distance_m: Option<Meters>,
    pub accessible: bool,
}

impl AccessibilityResult {
    pub fn reachable(distance_m: Meters) -> Self {
        Self {
            distance_m: Some(distance_m),
            accessible: true,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            distance_m: None,
            accessible: false,
        }
    }
}

/// Results for one cutoff, index-aligned with the buildings they were
/// computed for.
#[derive(Debug, Clone)]
pub struct AccessibilityReport {
    pub max_distance: Meters,
    pub results: Vec<AccessibilityResult>,
}

impl AccessibilityReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn accessible_count(&self) -> usize {
        self.results.iter().filter(|r| r.accessible).count()
    }

    pub fn inaccessible_count(&self) -> usize {
        self.len() - self.accessible_count()
    }

    /// Conventional name of the accessibility flag, e.g. `park_access_1500m`
    pub fn access_column(&self) -> String {
        access_column_name(self.max_distance)
    }
}

/// `park_access_{max}m`, with whole meters printed without a fraction
pub fn access_column_name(max_distance: Meters) -> String {
    format!("park_access_{}m", format_meters(max_distance))
}

pub(crate) fn format_meters(meters: Meters) -> String {
    if meters.fract() == 0.0 {
        format!("{meters:.0}")
    } else {
        format!("{meters}")
    }
}

/// Validates a walking distance cutoff.
///
/// # Errors
///
/// [`Error::InvalidData`] unless the cutoff is finite and strictly positive.
pub fn validate_cutoff(max_distance: Meters) -> Result<(), Error> {
    if max_distance.is_finite() && max_distance > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "maximum walking distance must be a positive number of meters, got {max_distance}"
        )))
    }
}

/// Shortest network distance from the nearest park node to every node
/// reachable within `max_distance`.
///
/// With no park nodes the search is skipped and the map is empty.
pub fn park_distances(
    graph: &StreetGraph,
    park_nodes: &ParkNodeSet,
    max_distance: Meters,
) -> Result<HashMap<StreetNodeId, Meters>, Error> {
    validate_cutoff(max_distance)?;

    if park_nodes.is_empty() {
        debug!("No park nodes, skipping network search");
        return Ok(HashMap::new());
    }

    let distances = multi_source_dijkstra(graph, park_nodes.as_slice(), Some(max_distance));
    debug!(
        "Search from {} park nodes reached {} of {} street nodes within {max_distance} m",
        park_nodes.len(),
        distances.len(),
        graph.node_count()
    );
    Ok(distances)
}

/// Classify every building against `max_distance`.
///
/// Buildings without a node assignment, on a node outside the graph, or on a
/// node not reached within the cutoff are inaccessible. Buildings sharing a
/// node share a result.
///
/// # Errors
///
/// [`Error::InvalidData`] if `max_distance` is not a positive finite number.
pub fn compute_accessibility(
    graph: &StreetGraph,
    park_nodes: &ParkNodeSet,
    buildings: &[SnappedFeature],
    max_distance: Meters,
) -> Result<AccessibilityReport, Error> {
    let distances = park_distances(graph, park_nodes, max_distance)?;

    let results: Vec<AccessibilityResult> = buildings
        .iter()
        .map(|building| {
            building
                .node
                .and_then(|node| distances.get(&node))
                .map_or_else(AccessibilityResult::unreachable, |&distance| {
                    AccessibilityResult::reachable(distance)
                })
        })
        .collect();

    let report = AccessibilityReport {
        max_distance,
        results,
    };
    info!(
        "{} of {} buildings are within {max_distance} m of a park",
        report.accessible_count(),
        report.len()
    );
    Ok(report)
}
