use std::path::PathBuf;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algo::validate_cutoff;
use crate::{Crs, Error, Meters};

/// Configuration for one accessibility analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Place the data was prepared for, e.g. `"Kathmandu, Nepal"`
    pub place_name: String,
    /// Directory holding the prepared GeoJSON layers
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Metric CRS the graph is projected into before any distance is measured
    pub target_crs: Crs,
    pub max_distance_m: Meters,
    /// Additional cutoffs evaluated by a sweep
    pub extra_cutoffs_m: Vec<Meters>,
    /// Drop features whose centroid is outside the place boundary
    pub clip_to_boundary: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            place_name: "Kathmandu, Nepal".to_string(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("outputs"),
            target_crs: Crs::Utm {
                zone: 45,
                north: true,
            },
            max_distance_m: 1500.0,
            extra_cutoffs_m: Vec::new(),
            clip_to_boundary: true,
        }
    }
}

impl AnalysisConfig {
    /// Check the configuration before any data is read.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidData`] for an empty place name or a cutoff that is
    ///   not a positive finite number
    /// - [`Error::CrsMismatch`] if the target CRS is geographic
    /// - [`Error::IoError`] if the data directory does not exist
    pub fn validate(&self) -> Result<(), Error> {
        if self.place_name.trim().is_empty() {
            return Err(Error::InvalidData("place name is empty".to_string()));
        }

        validate_cutoff(self.max_distance_m)?;
        for &cutoff in &self.extra_cutoffs_m {
            validate_cutoff(cutoff)?;
        }

        if !self.target_crs.is_projected() {
            return Err(Error::CrsMismatch {
                expected: "a projected CRS with linear units in meters".to_string(),
                found: self.target_crs.to_string(),
            });
        }

        if !self.data_dir.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory not found: {}", self.data_dir.display()),
            )));
        }

        Ok(())
    }

    /// The main cutoff followed by the extra ones, ascending and without
    /// duplicates
    pub fn cutoffs(&self) -> Vec<Meters> {
        std::iter::once(self.max_distance_m)
            .chain(self.extra_cutoffs_m.iter().copied())
            .sorted_unstable_by(f64::total_cmp)
            .dedup()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing_dir() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn defaults_match_kathmandu_setup() {
        let config = AnalysisConfig::default();
        assert_eq!(config.target_crs.epsg(), 32645);
        assert_eq!(config.max_distance_m, 1500.0);
        assert!(config.clip_to_boundary);
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"place_name": "Pokhara, Nepal", "target_crs": "EPSG:32644",
                "max_distance_m": 800}"#,
        )
        .unwrap();

        assert_eq!(config.place_name, "Pokhara, Nepal");
        assert_eq!(
            config.target_crs,
            Crs::Utm {
                zone: 44,
                north: true
            }
        );
        assert_eq!(config.max_distance_m, 800.0);
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn unknown_crs_fails_to_deserialize() {
        let parsed: Result<AnalysisConfig, _> =
            serde_json::from_str(r#"{"target_crs": "EPSG:2154"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = AnalysisConfig {
            data_dir: existing_dir(),
            ..AnalysisConfig::default()
        };
        assert!(base.validate().is_ok());

        let zero = AnalysisConfig {
            max_distance_m: 0.0,
            ..base.clone()
        };
        assert!(matches!(zero.validate(), Err(Error::InvalidData(_))));

        let bad_extra = AnalysisConfig {
            extra_cutoffs_m: vec![500.0, f64::NAN],
            ..base.clone()
        };
        assert!(matches!(bad_extra.validate(), Err(Error::InvalidData(_))));

        let geographic = AnalysisConfig {
            target_crs: Crs::Wgs84,
            ..base.clone()
        };
        assert!(matches!(
            geographic.validate(),
            Err(Error::CrsMismatch { .. })
        ));

        let missing = AnalysisConfig {
            data_dir: existing_dir().join("parkaccess-no-such-dir"),
            ..base
        };
        assert!(matches!(missing.validate(), Err(Error::IoError(_))));
    }

    #[test]
    fn cutoffs_are_sorted_and_unique() {
        let config = AnalysisConfig {
            max_distance_m: 1000.0,
            extra_cutoffs_m: vec![1500.0, 500.0, 1000.0],
            ..AnalysisConfig::default()
        };
        assert_eq!(config.cutoffs(), vec![500.0, 1000.0, 1500.0]);
    }
}
