use std::fmt;

use serde::Serialize;

use crate::Meters;
use crate::algo::{AccessibilityReport, AccessibilityResult, access_column_name};

/// Distance class of a building, used for colouring results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AccessBand {
    #[serde(rename = "within_500m")]
    Within500m,
    #[serde(rename = "within_1000m")]
    Within1000m,
    #[serde(rename = "within_cutoff")]
    WithinCutoff,
    #[serde(rename = "not_accessible")]
    NotAccessible,
}

impl AccessBand {
    pub const ALL: [AccessBand; 4] = [
        AccessBand::Within500m,
        AccessBand::Within1000m,
        AccessBand::WithinCutoff,
        AccessBand::NotAccessible,
    ];

    pub fn classify(result: &AccessibilityResult) -> Self {
        match result.distance_m {
            Some(d) if d <= 500.0 => AccessBand::Within500m,
            Some(d) if d <= 1000.0 => AccessBand::Within1000m,
            Some(_) => AccessBand::WithinCutoff,
            None => AccessBand::NotAccessible,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessBand::Within500m => "within_500m",
            AccessBand::Within1000m => "within_1000m",
            AccessBand::WithinCutoff => "within_cutoff",
            AccessBand::NotAccessible => "not_accessible",
        }
    }
}

impl fmt::Display for AccessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate view of one report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessSummary {
    pub max_distance: Meters,
    pub total: usize,
    pub accessible: usize,
    pub inaccessible: usize,
    /// Over accessible buildings only
    pub mean_distance_m: Option<Meters>,
    pub max_distance_m: Option<Meters>,
    /// Building count per band, in [`AccessBand::ALL`] order
    pub bands: Vec<(AccessBand, usize)>,
}

impl AccessSummary {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_report(report: &AccessibilityReport) -> Self {
        let distances: Vec<Meters> = report.results.iter().filter_map(|r| r.distance_m).collect();

        let mean_distance_m = (!distances.is_empty())
            .then(|| distances.iter().sum::<Meters>() / distances.len() as f64);
        let max_distance_m = distances.iter().copied().reduce(f64::max);

        let bands = AccessBand::ALL
            .iter()
            .map(|&band| {
                let count = report
                    .results
                    .iter()
                    .filter(|r| AccessBand::classify(r) == band)
                    .count();
                (band, count)
            })
            .collect();

        Self {
            max_distance: report.max_distance,
            total: report.len(),
            accessible: report.accessible_count(),
            inaccessible: report.inaccessible_count(),
            mean_distance_m,
            max_distance_m,
            bands,
        }
    }

    pub fn band_count(&self, band: AccessBand) -> usize {
        self.bands
            .iter()
            .find(|(b, _)| *b == band)
            .map_or(0, |(_, count)| *count)
    }
}

#[allow(clippy::cast_precision_loss)]
impl fmt::Display for AccessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let share = |count: usize| {
            if self.total == 0 {
                0.0
            } else {
                count as f64 / self.total as f64 * 100.0
            }
        };

        writeln!(f, "{}", access_column_name(self.max_distance))?;
        writeln!(
            f,
            "  accessible    {:>8} ({:.1}%)",
            self.accessible,
            share(self.accessible)
        )?;
        writeln!(
            f,
            "  inaccessible  {:>8} ({:.1}%)",
            self.inaccessible,
            share(self.inaccessible)
        )?;
        if let (Some(mean), Some(max)) = (self.mean_distance_m, self.max_distance_m) {
            writeln!(f, "  distance      mean {mean:.1} m, max {max:.1} m")?;
        }
        for (band, count) in &self.bands {
            writeln!(f, "  {:<14}{count:>8}", band.as_str())?;
        }
        Ok(())
    }
}
