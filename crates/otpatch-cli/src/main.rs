use anyhow::{Context, Result};
use clap::Parser;
use otpatch_core::{
    PatchConfig, PatchOutcome, Patcher, PatcherConfig, Signature, builtin_signatures,
    load_signatures,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "otpatch")]
#[command(about = "Patches the game client in place: key swap, anti-cheat hook, service URLs")]
struct Args {
    /// Client executable to patch in place
    client: PathBuf,

    #[arg(short, long, default_value = "otpatch.toml", env = "OTPATCH_CONFIG")]
    config: PathBuf,

    /// JSON signature set to use instead of the built-in one
    #[arg(short, long)]
    signatures: Option<PathBuf>,

    /// Skip the timestamped backup (for re-runs where one already exists)
    #[arg(long)]
    no_backup: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("otpatch=info".parse()?)
                .add_directive("otpatch_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = PatchConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {:?}", args.config))?;
    info!("Loaded config from {:?}", args.config);

    let signatures = build_signatures(&config, args.signatures.as_deref())?;

    let patcher = Patcher::with_config(
        signatures,
        config.property_specs(),
        PatcherConfig {
            backup: !args.no_backup,
        },
    );

    let report = patcher
        .run(&args.client)
        .with_context(|| format!("Failed to patch {:?}", args.client))?;

    for item in &report.items {
        match item.outcome {
            PatchOutcome::Patched => info!("{}: patched", item.name),
            PatchOutcome::AlreadyPatched => info!("{}: already patched", item.name),
            PatchOutcome::NotFound => warn!("{}: not found", item.name),
        }
    }
    if let Some(backup) = &report.backup_path {
        info!("Backup written to {}", backup.display());
    }
    info!(
        "Done: {} of {} edits applied",
        report.patched_count(),
        report.items.len()
    );

    Ok(())
}

fn build_signatures(
    config: &PatchConfig,
    signature_path: Option<&std::path::Path>,
) -> Result<Vec<Signature>> {
    // The key swap is always first and always mandatory; hook signatures
    // follow from the built-in set or a user-supplied JSON file.
    let mut signatures = vec![
        config
            .key_signature()
            .context("Failed to read key blob files")?,
    ];

    let set = match signature_path {
        Some(path) => load_signatures(path)
            .with_context(|| format!("Failed to load signature set {path:?}"))?,
        None => builtin_signatures(),
    };
    signatures.extend(set.signatures().context("Invalid signature set")?);

    Ok(signatures)
}
