//! `inkpost render` command implementation.

use std::path::PathBuf;

use clap::Args;
use inkpost_config::Config;

use super::create_renderer;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the document.
    path: PathBuf,

    /// Path to configuration file (default: auto-discover inkpost.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print only the HTML body.
    #[arg(long)]
    html_only: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let rendering = create_renderer(&config).render(&self.path)?;

        if !self.html_only {
            output.highlight(&self.path.display().to_string());
            output.info(&format!(
                "Title: {}",
                rendering.title.as_deref().unwrap_or("(none)")
            ));
            output.info(&format!("Slug: {}", rendering.slug().unwrap_or("(none)")));
            output.info(&format!("Tags: {}", rendering.tags.join(", ")));
            output.info("Attributes:");
            for (key, value) in &rendering.attributes {
                output.info(&format!("  {key} = {value}"));
            }
            for warning in &rendering.warnings {
                output.warning(&format!("Warning: {warning}"));
            }
            output.info("");
        }

        output.print(&rendering.html);
        Ok(())
    }
}
