use std::path::PathBuf;
use std::time::Instant;

use parkaccess_core::loading::PreparedAnalysis;
use parkaccess_core::output::ExportStatus;
use parkaccess_core::prelude::*;
use tracing::{info, warn};

use crate::cli::Command;
use crate::error::AppError;

pub fn execute(command: &Command, config: &AnalysisConfig) -> Result<(), AppError> {
    match command {
        Command::Run { overwrite, json } => {
            let outcome = run(config, *overwrite)?;
            for path in &outcome.kept {
                warn!(
                    "{} already exists and was not replaced, pass --overwrite to refresh it",
                    path.display()
                );
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            } else {
                print!("{}", outcome.summary);
            }
        }
        Command::Sweep { cutoffs, json } => {
            let summaries = sweep(config, cutoffs)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for summary in &summaries {
                    print!("{summary}");
                }
            }
        }
        Command::Inspect => inspect(config)?,
    }
    Ok(())
}

/// Result of a `run`: the summary and the output files left untouched
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: AccessSummary,
    pub kept: Vec<PathBuf>,
}

fn load(config: &AnalysisConfig) -> Result<Dataset, AppError> {
    config.validate()?;
    let source = GeoJsonDirSource::new(&config.data_dir);
    Ok(source.load(&config.place_name)?)
}

fn prepare(config: &AnalysisConfig) -> Result<(PreparedAnalysis, ResolvedFeatures), AppError> {
    let started = Instant::now();
    let prepared = create_accessibility_model(load(config)?, config)?;
    let resolved = prepared
        .model
        .resolve(&prepared.buildings, &prepared.parks)?;
    info!("Data prepared in {:.2?}", started.elapsed());
    Ok((prepared, resolved))
}

pub fn run(config: &AnalysisConfig, overwrite: bool) -> Result<RunOutcome, AppError> {
    let (prepared, resolved) = prepare(config)?;

    let started = Instant::now();
    let report = prepared
        .model
        .compute_accessibility(&resolved, config.max_distance_m)?;
    info!("Accessibility computed in {:.2?}", started.elapsed());

    let paths = ExportPaths::new(&config.output_dir, &config.place_name, config.max_distance_m);
    let (geojson, csv) = export_report(
        &paths,
        &report,
        &resolved.buildings,
        prepared.model.crs(),
        overwrite,
    )?;
    let kept = [(geojson, paths.geojson), (csv, paths.csv)]
        .into_iter()
        .filter(|(status, _)| *status == ExportStatus::Kept)
        .map(|(_, path)| path)
        .collect();

    Ok(RunOutcome {
        summary: AccessSummary::from_report(&report),
        kept,
    })
}

/// Cutoffs given on the command line, or the configured ones when none are
fn sweep_cutoffs(requested: &[Meters], config: &AnalysisConfig) -> Vec<Meters> {
    if requested.is_empty() {
        config.cutoffs()
    } else {
        requested.to_vec()
    }
}

pub fn sweep(
    config: &AnalysisConfig,
    requested: &[Meters],
) -> Result<Vec<AccessSummary>, AppError> {
    let cutoffs = sweep_cutoffs(requested, config);
    let (prepared, resolved) = prepare(config)?;

    let started = Instant::now();
    let reports = prepared.model.sweep(&resolved, &cutoffs)?;
    info!(
        "{} cutoffs evaluated in {:.2?}",
        reports.len(),
        started.elapsed()
    );

    Ok(reports.iter().map(AccessSummary::from_report).collect())
}

fn inspect(config: &AnalysisConfig) -> Result<(), AppError> {
    let dataset = load(config)?;

    println!("place          {}", config.place_name);
    println!(
        "boundary       {}",
        dataset
            .boundary
            .as_ref()
            .map_or_else(|| "none".to_string(), |b| format!("{} polygons ({})", b.len(), b.crs))
    );
    println!(
        "buildings      {} ({})",
        dataset.buildings.len(),
        dataset.buildings.crs
    );
    println!("parks          {} ({})", dataset.parks.len(), dataset.parks.crs);
    println!(
        "street nodes   {} ({})",
        dataset.nodes.nodes.len(),
        dataset.nodes.crs
    );
    println!(
        "street edges   {} ({})",
        dataset.edges.edges.len(),
        dataset.edges.crs
    );

    let prepared = create_accessibility_model(dataset, config)?;
    println!(
        "graph          {} nodes, {} edges in {}",
        prepared.model.node_count(),
        prepared.model.edge_count(),
        prepared.model.crs()
    );
    println!(
        "after clipping {} buildings, {} parks",
        prepared.buildings.len(),
        prepared.parks.len()
    );
    Ok(())
}
