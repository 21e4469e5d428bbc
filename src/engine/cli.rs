//! CLI command handler: process by default; --dry-run lists pending inputs only.

use anyhow::{Result, bail};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::tools::list_input_paths;
use crate::imaging::StandardOps;
use crate::ledger::JsonFileLedger;
use crate::utils::settings_toml::SettingsToml;
use crate::utils::{apply_file_to_opts, ensure_dir, load_settings_toml, setup_logging};
use crate::{plan_batch, process_batch};

/// Defaults, then the settings file, then CLI flags. The settings file is read before the
/// logger exists (it may set `verbose`), so its outcome is logged after `setup_logging`.
fn setup_opts(cli: &Cli) -> Opts {
    let config_path = cli.config_path();
    let file = load_settings_toml(&config_path);
    let opts = resolve_opts(cli, file.as_ref().ok().and_then(Option::as_ref));

    setup_logging(opts.verbose);
    match file {
        Ok(Some(_)) => debug!("Loaded settings from {}", config_path.display()),
        Ok(None) => {}
        Err(e) => warn!("Ignoring settings file: {e:#}"),
    }
    opts
}

fn resolve_opts(cli: &Cli, file: Option<&SettingsToml>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(ref dir) = cli.dir {
        opts.input_dir = dir.clone();
    }
    if let Some(ref out) = cli.output {
        opts.output_dir = Some(out.clone());
    }
    if let Some(ref ledger) = cli.ledger {
        opts.ledger_path = ledger.clone();
    }
    if let Some(w) = cli.width {
        opts.width = w;
    }
    if let Some(h) = cli.height {
        opts.height = h;
    }
    if cli.blur.is_some() {
        opts.blur_sigma = cli.blur;
    }
    if cli.rotate.is_some() {
        opts.rotate_degrees = cli.rotate;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts.dry_run = cli.dry_run;
    opts
}

/// Reject option values the image operations cannot honour, before any work starts.
fn validate_opts(opts: &Opts) -> Result<()> {
    if opts.width == 0 || opts.height == 0 {
        bail!("resize target {}x{} has a zero dimension", opts.width, opts.height);
    }
    if let Some(sigma) = opts.blur_sigma
        && !(sigma.is_finite() && sigma > 0.0)
    {
        bail!("blur sigma must be a positive number, got {sigma}");
    }
    if let Some(degrees) = opts.rotate_degrees
        && !degrees.is_finite()
    {
        bail!("rotation must be a finite number of degrees, got {degrees}");
    }
    Ok(())
}

/// Run the batch (default) or list pending inputs when --dry-run. Listing the input directory
/// and creating the output directory are the only fatal failures; per-item and ledger errors
/// are logged and the run still exits successfully.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    validate_opts(&opts)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let inputs = list_input_paths(&opts.input_dir)?;
    let ledger = JsonFileLedger::new(&opts.ledger_path);

    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NO IMAGES OR LEDGER CHANGES WILL BE WRITTEN.");
        let pending = plan_batch(inputs, &ledger);
        for path in &pending {
            println!("{}", path.display());
        }
        info!(
            "{} image(s) pending against {}",
            pending.len(),
            ledger.path().display()
        );
        return Ok(());
    }

    ensure_dir(&opts.output_dir())?;
    let report = process_batch(inputs, &opts, Arc::new(StandardOps), &ledger)?;
    info!(
        "Done: {} succeeded, {} failed, {} unreadable, {} already processed",
        report.succeeded.len(),
        report.failed.len(),
        report.decode_failures,
        report.already_processed + report.duplicates
    );
    Ok(())
}
