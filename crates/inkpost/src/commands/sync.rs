//! `inkpost sync` command implementation.

use std::path::PathBuf;

use clap::Args;
use inkpost_config::{CliSettings, Config, Transport, WordPressConfig};
use inkpost_sync::{SyncOptions, SyncPlan, SyncReport, Syncer};
use inkpost_wordpress::{CustomField, PostBackend, RestClient, XmlRpcClient};

use super::check::check_slugs;
use super::{create_renderer, expand_paths, parse_field};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Documents or glob patterns (default: `sync.paths` from config).
    paths: Vec<String>,

    /// Path to configuration file (default: auto-discover inkpost.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site URL (overrides config).
    #[arg(long, env = "INKPOST_BASE_URL")]
    base_url: Option<String>,

    /// Post type to sync (overrides config).
    #[arg(long)]
    post_type: Option<String>,

    /// Status for created and updated posts (overrides config).
    #[arg(long)]
    status: Option<String>,

    /// Delete remote posts that match no document (`=false` overrides config).
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    delete_not_found: Option<bool>,

    /// Create missing tags and attach tags to posts (`=false` overrides config).
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    generate_tags: Option<bool>,

    /// Custom field attached to every post (repeatable).
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Show what would change without writing to the site.
    #[arg(long)]
    dry_run: bool,

    /// Skip the slug check before syncing.
    #[arg(long)]
    skip_check: bool,
}

impl SyncArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let wordpress = config.require_wordpress()?;

        let paths = expand_paths(&config, &self.paths)?;
        let renderer = create_renderer(&config);
        output.info(&format!("Found {} document(s)", paths.len()));

        if !self.skip_check {
            check_slugs(&output, &renderer, &paths)?;
        }

        let options = SyncOptions {
            delete_not_found: config.sync.delete_not_found,
            generate_tags: config.sync.generate_tags,
            post_status: config.sync.post_status.clone(),
            ..SyncOptions::default()
        };
        let mut syncer = Syncer::new(
            create_backend(wordpress),
            config.sync.post_type.clone(),
            renderer,
            options,
        )?;

        if self.dry_run {
            let plan = syncer.plan(&paths)?;
            print_plan(&output, &plan);
        } else {
            let fields = custom_fields(&config, self.fields);
            let report = syncer.sync(&paths, &fields)?;
            print_report(&output, &report);
        }

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            base_url: self.base_url.clone(),
            post_type: self.post_type.clone(),
            post_status: self.status.clone(),
            delete_not_found: self.delete_not_found,
            generate_tags: self.generate_tags,
        }
    }
}

fn create_backend(wordpress: &WordPressConfig) -> Box<dyn PostBackend> {
    match wordpress.transport {
        Transport::Rest => Box::new(RestClient::new(
            &wordpress.base_url,
            &wordpress.username,
            &wordpress.password,
        )),
        Transport::XmlRpc => Box::new(XmlRpcClient::new(
            &wordpress.base_url,
            wordpress.blog_id,
            &wordpress.username,
            &wordpress.password,
        )),
    }
}

/// Config custom fields overridden by `--field` arguments with the same key.
fn custom_fields(config: &Config, overrides: Vec<(String, String)>) -> Vec<CustomField> {
    let mut fields = config.sync.custom_fields.clone();
    fields.extend(overrides);
    fields
        .into_iter()
        .map(|(key, value)| CustomField::new(key, value))
        .collect()
}

fn print_plan(output: &Output, plan: &SyncPlan) {
    output.highlight("\n[DRY RUN] No changes made.");

    if plan.is_empty() {
        output.success("Everything is up to date.");
    }
    print_list(output, "Would create", &plan.create);
    print_list(output, "Would update", &plan.update);
    print_list(output, "Would delete", &plan.delete);
    print_list(output, "Would create tags", &plan.new_tags);
    print_skipped(output, &plan.skipped);
}

fn print_report(output: &Output, report: &SyncReport) {
    output.success(&format!("\nSynced {} post(s).", report.processed.len()));
    print_list(output, "Created", &report.created);
    print_list(output, "Updated", &report.updated);
    print_list(output, "Deleted", &report.deleted);
    print_skipped(output, &report.skipped);
}

fn print_list(output: &Output, label: &str, slugs: &[String]) {
    if slugs.is_empty() {
        return;
    }
    output.info(&format!("\n{label} ({}):", slugs.len()));
    for slug in slugs {
        output.info(&format!("  -> {slug}"));
    }
}

fn print_skipped(output: &Output, skipped: &[PathBuf]) {
    if skipped.is_empty() {
        return;
    }
    output.warning(&format!("\nSkipped ({}):", skipped.len()));
    for path in skipped {
        output.info(&format!("  - {}", path.display()));
    }
}
