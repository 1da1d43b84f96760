use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use parkaccess_core::{Crs, Meters};

/// Walking distance from every building to the nearest park
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file, `parkaccess.toml` is used when present
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `parkaccess_core=trace`; takes precedence
    /// over `RUST_LOG` and the config file
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub overrides: AnalysisOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that replace values from the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct AnalysisOverrides {
    /// Place name, e.g. "Kathmandu, Nepal"
    #[arg(long, global = true)]
    pub place: Option<String>,

    /// Maximum walking distance in meters
    #[arg(long, global = true, value_name = "METERS")]
    pub max_distance: Option<Meters>,

    /// Projected CRS for the analysis, e.g. EPSG:32645
    #[arg(long, global = true, value_name = "CRS")]
    pub target_crs: Option<Crs>,

    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Keep features outside the place boundary
    #[arg(long, global = true)]
    pub no_clip: bool,

    /// Worker threads, all cores by default
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute accessibility, export the results and print a summary
    Run {
        /// Replace result files that already exist
        #[arg(long)]
        overwrite: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summaries for several cutoffs over the same graph and snapping
    Sweep {
        /// Comma separated cutoffs in meters; the configured cutoffs when omitted
        #[arg(long, value_delimiter = ',', value_name = "METERS")]
        cutoffs: Vec<Meters>,

        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print dataset and street graph statistics
    Inspect,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sweep_cutoffs_and_global_flags() {
        let cli = Cli::try_parse_from([
            "parkaccess",
            "sweep",
            "--cutoffs",
            "500,1000,1500",
            "--target-crs",
            "EPSG:32644",
            "--place",
            "Pokhara, Nepal",
        ])
        .unwrap();

        match cli.command {
            Command::Sweep { cutoffs, json } => {
                assert_eq!(cutoffs, vec![500.0, 1000.0, 1500.0]);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(
            cli.overrides.target_crs,
            Some(Crs::Utm {
                zone: 44,
                north: true
            })
        );
        assert_eq!(cli.overrides.place.as_deref(), Some("Pokhara, Nepal"));
    }

    #[test]
    fn rejects_unsupported_crs() {
        let parsed = Cli::try_parse_from(["parkaccess", "inspect", "--target-crs", "EPSG:2154"]);
        assert!(parsed.is_err());
    }
}
