//! Audit command - initialize auditors, audit one source, render the report

use std::io::{self, Write};
use tracing::info;

use crate::cli::output;
use crate::cli::{exit_codes, Cli, Commands};
use crate::config::{non_empty, AuditorsConfig, ImageConfig, RunConfig};
use crate::error::{KubeauditError, SetupError};
use crate::k8s::{ClusterProbe, InClusterProbe};
use crate::rules::categories::{escalation, hostns, image, nonroot, privileged, rootfs};
use crate::rules::{catalog, AuditEngine, RuleSet};
use crate::source::SourceSelection;

pub async fn execute(cli: Cli) -> Result<i32, KubeauditError> {
    let config = cli.run_config();
    let (explicit, auditors) = rule_set(&cli.command)?;

    run(
        explicit,
        &auditors,
        &config,
        &InClusterProbe,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}

/// Auditors a subcommand asks for. `all` leaves the set empty so the engine
/// falls back to the configured default catalog.
fn rule_set(command: &Commands) -> Result<(RuleSet, AuditorsConfig), SetupError> {
    let single = |name: &str, config: AuditorsConfig| -> Result<_, SetupError> {
        let auditor = catalog::auditor(name, &config)?;
        Ok((vec![auditor], config))
    };

    match command {
        Commands::All(args) => {
            let config = match &args.kconfig {
                Some(path) => AuditorsConfig::load_from_file(path)?,
                None => AuditorsConfig::default(),
            };
            Ok((Vec::new(), config))
        }
        Commands::Image(args) => {
            let mut config = AuditorsConfig::default();
            config.auditors.image = ImageConfig {
                image: non_empty(args.image.as_deref()),
            };
            single(image::NAME, config)
        }
        Commands::Privileged => single(privileged::NAME, AuditorsConfig::default()),
        Commands::Hostns => single(hostns::NAME, AuditorsConfig::default()),
        Commands::Nonroot => single(nonroot::NAME, AuditorsConfig::default()),
        Commands::Rootfs => single(rootfs::NAME, AuditorsConfig::default()),
        Commands::Escalation => single(escalation::NAME, AuditorsConfig::default()),
    }
}

/// Run the whole audit pipeline and return the process exit code.
///
/// Any failure before the report is written is returned as an error; the
/// caller decides how to report it.
pub async fn run(
    explicit: RuleSet,
    auditors: &AuditorsConfig,
    config: &RunConfig,
    probe: &dyn ClusterProbe,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<i32, KubeauditError> {
    let engine = AuditEngine::initialize(explicit, auditors)?;

    let source = SourceSelection::resolve(config, probe);
    info!(mode = source.mode_name(), "Resolved audit source");

    let report = engine.generate_report(&source).await?;
    let outcome = output::render(&report, &config.render, source.manifest_title(), out, diag)?;

    let code = exit_codes::resolve(&report, outcome, config.exit_code);
    info!(
        findings = report.findings().len(),
        exit_code = code,
        "Audit complete"
    );
    Ok(code)
}
