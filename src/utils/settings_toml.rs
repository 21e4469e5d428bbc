//! Load `.graypipe.toml` (CLI only). Lib callers build [`Opts`](crate::Opts) themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Opts;

#[derive(Debug, Deserialize)]
pub struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    input_dir: Option<String>,
    output_dir: Option<String>,
    ledger: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    blur: Option<f32>,
    rotate: Option<f32>,
    verbose: Option<bool>,
}

/// Load the settings file at `path`. `Ok(None)` when there is no such file; an unreadable or
/// invalid file is an error the caller reports once logging is up.
pub fn load_settings_toml(path: &Path) -> Result<Option<SettingsToml>> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let file = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI flags.
/// `dry_run` is never read from the file.
pub fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.input_dir {
        opts.input_dir = PathBuf::from(p);
    }
    if let Some(ref p) = s.output_dir {
        opts.output_dir = Some(PathBuf::from(p));
    }
    if let Some(ref p) = s.ledger {
        opts.ledger_path = PathBuf::from(p);
    }
    apply_file_opt!(s, opts, width => width);
    apply_file_opt!(s, opts, height => height);
    apply_file_opt!(s, opts, verbose => verbose);
    if s.blur.is_some() {
        opts.blur_sigma = s.blur;
    }
    if s.rotate.is_some() {
        opts.rotate_degrees = s.rotate;
    }
}
