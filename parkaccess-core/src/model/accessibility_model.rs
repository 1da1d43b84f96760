use log::info;
use rayon::prelude::*;

use super::{FeatureLayer, ResolvedFeatures, StreetGraph};
use crate::algo::{AccessibilityReport, compute_accessibility, resolve_features, validate_cutoff};
use crate::{Crs, Error, Meters};

/// Street network prepared for park accessibility queries.
///
/// The graph is built once (acquisition is the slow step) and then only
/// read, so one model serves any number of resolve/compute calls, including
/// concurrent ones with different cutoffs.
#[derive(Debug, Clone)]
pub struct AccessibilityModel {
    pub street_graph: StreetGraph,
}

impl AccessibilityModel {
    pub fn new(street_graph: StreetGraph) -> Self {
        Self { street_graph }
    }

    pub fn crs(&self) -> Crs {
        self.street_graph.crs()
    }

    pub fn node_count(&self) -> usize {
        self.street_graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.street_graph.edge_count()
    }

    /// Reduce buildings and parks to centroids snapped onto the network
    pub fn resolve(
        &self,
        buildings: &FeatureLayer,
        parks: &FeatureLayer,
    ) -> Result<ResolvedFeatures, Error> {
        resolve_features(&self.street_graph, buildings, parks)
    }

    /// Distance to the nearest park for every resolved building
    pub fn compute_accessibility(
        &self,
        resolved: &ResolvedFeatures,
        max_distance: Meters,
    ) -> Result<AccessibilityReport, Error> {
        compute_accessibility(
            &self.street_graph,
            &resolved.park_nodes,
            &resolved.buildings,
            max_distance,
        )
    }

    /// Evaluate several cutoffs against the same snapping. Each cutoff runs
    /// its own search; the reports come back in the order of `cutoffs`.
    pub fn sweep(
        &self,
        resolved: &ResolvedFeatures,
        cutoffs: &[Meters],
    ) -> Result<Vec<AccessibilityReport>, Error> {
        cutoffs.iter().try_for_each(|&cutoff| validate_cutoff(cutoff))?;
        info!("Evaluating {} cutoffs", cutoffs.len());

        cutoffs
            .par_iter()
            .map(|&cutoff| self.compute_accessibility(resolved, cutoff))
            .collect()
    }
}
