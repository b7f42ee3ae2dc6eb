use anyhow::{Context, Result};
use clap::Parser;
use deprec_scan::analyze::{analyze_all, analyze_artifact};
use deprec_scan::catalog::DeprecatedApi;
use deprec_scan::cli::{Cli, Commands, OutputFormat};
use deprec_scan::config::ScanConfig;
use deprec_scan::report::ScanReport;
use deprec_scan::scan::{artifact_identity, scan_artifacts};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command.clone() {
        Commands::Scan {
            core,
            plugins,
            format,
            output,
        } => {
            let start = Instant::now();
            let api = build_catalog(&core)?;
            let artifacts = scan_artifacts(&plugins)?;
            info!(artifacts = artifacts.len(), "starting analysis");

            let outcomes = analyze_all(artifacts, &api, &config);
            let report = ScanReport::build(&api, &outcomes);
            info!(
                plugins = report.plugins.len(),
                failures = report.failures.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "scan finished"
            );
            write_report(&report, format, output.as_deref())?;
        }
        Commands::Catalog { core } => {
            let api = build_catalog(&core)?;
            println!("{}", serde_json::to_string_pretty(&CatalogOutput::from(&api))?);
        }
        Commands::Check { core, plugin } => {
            let api = build_catalog(&core)?;
            let usage = analyze_artifact(artifact_identity(&plugin), &plugin, &api, &config)
                .with_context(|| format!("Failed to analyze {}", plugin.display()))?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> ScanConfig {
    let mut config = ScanConfig::default();
    if cli.no_namespace_filter {
        config.relevant_namespaces.clear();
    } else if !cli.include_namespace.is_empty() {
        config.relevant_namespaces = cli.include_namespace.clone();
    }
    for name in &cli.ignore {
        config.ignored_artifacts.insert(name.clone());
    }
    if let Some(depth) = cli.max_depth {
        config.max_inheritance_depth = depth;
    }
    config
}

fn build_catalog(core: &Path) -> Result<DeprecatedApi> {
    let api = DeprecatedApi::from_core_archive(core)
        .with_context(|| format!("Failed to build catalog from {}", core.display()))?;
    info!(
        classes = api.classes().len(),
        methods = api.methods().len(),
        fields = api.fields().len(),
        "catalog built"
    );
    Ok(api)
}

#[derive(Debug, Serialize)]
struct CatalogOutput {
    classes: BTreeSet<String>,
    methods: BTreeSet<String>,
    fields: BTreeSet<String>,
}

impl From<&DeprecatedApi> for CatalogOutput {
    fn from(api: &DeprecatedApi) -> Self {
        Self {
            classes: api.classes().iter().cloned().collect(),
            methods: api.methods().iter().cloned().collect(),
            fields: api.fields().iter().cloned().collect(),
        }
    }
}

fn write_report(report: &ScanReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => report.to_text(),
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
