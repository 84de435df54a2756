//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;
pub(crate) mod sync;

use std::path::PathBuf;

use inkpost_config::Config;
use inkpost_renderer::{RenderOptions, Renderer};
use tracing::warn;

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;
pub(crate) use sync::SyncArgs;

/// Build a renderer from the `[render]` section.
pub(crate) fn create_renderer(config: &Config) -> Renderer {
    Renderer::new().with_options(RenderOptions {
        gfm: config.render.gfm,
        extract_title: config.render.extract_title,
        attributes: config.render.attributes.clone(),
    })
}

/// Expand path arguments as glob patterns.
///
/// Falls back to the `sync.paths` patterns from config when no arguments are
/// given. A pattern without wildcards is kept even if nothing matches, so a
/// missing file is reported when it is read.
pub(crate) fn expand_paths(config: &Config, args: &[String]) -> Result<Vec<PathBuf>, CliError> {
    let patterns: Vec<String> = if args.is_empty() {
        config
            .sync
            .paths
            .iter()
            .map(|pattern| config.resolve_pattern(pattern))
            .collect()
    } else {
        args.to_vec()
    };

    if patterns.is_empty() {
        return Err(CliError::Validation(
            "no documents given (pass paths or set sync.paths in inkpost.toml)".to_owned(),
        ));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in &patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)? {
            let path = entry?;
            if path.is_file() && !paths.contains(&path) {
                paths.push(path);
            }
            matched = true;
        }
        if !matched {
            if is_literal(pattern) {
                paths.push(PathBuf::from(pattern));
            } else {
                warn!("Pattern '{}' matched no documents", pattern);
            }
        }
    }

    Ok(paths)
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

/// Parse a `key=value` custom field argument.
pub(crate) fn parse_field(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected key=value, got '{arg}'")),
    }
}
