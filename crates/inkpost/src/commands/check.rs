//! `inkpost check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use inkpost_config::Config;
use inkpost_renderer::Renderer;
use inkpost_sync::slug::DEFAULT_SLUG_RULES;
use inkpost_sync::{VerifyError, verify_slugs};

use super::{create_renderer, expand_paths};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Documents or glob patterns (default: `sync.paths` from config).
    paths: Vec<String>,

    /// Path to configuration file (default: auto-discover inkpost.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let paths = expand_paths(&config, &self.paths)?;
        let renderer = create_renderer(&config);

        check_slugs(&output, &renderer, &paths)?;
        output.success(&format!("All {} document slugs are valid.", paths.len()));
        Ok(())
    }
}

/// Verify slugs, printing every invalid document.
pub(crate) fn check_slugs(
    output: &Output,
    renderer: &Renderer,
    paths: &[impl AsRef<Path>],
) -> Result<(), CliError> {
    match verify_slugs(renderer, paths, DEFAULT_SLUG_RULES) {
        Err(VerifyError::InvalidSlugs(invalid)) => {
            output.error(&format!("Invalid slugs in {} document(s):", invalid.len()));
            for document in &invalid {
                let slug = document.slug.as_deref().unwrap_or("");
                output.info(&format!("  {} ({slug:?})", document.path.display()));
                for violation in &document.violations {
                    output.warning(&format!("    - {violation}"));
                }
            }
            Err(VerifyError::InvalidSlugs(invalid).into())
        }
        result => Ok(result?),
    }
}
