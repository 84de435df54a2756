//! Pre-flight slug verification.

use std::path::{Path, PathBuf};

use inkpost_renderer::{Renderer, Rendering};
use tracing::{error, info};

use crate::error::VerifyError;
use crate::slug::{SlugRule, violated_slug_rules};

/// Document whose slug failed one or more rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlugViolation {
    /// Document path.
    pub path: PathBuf,
    /// The slug, if the document has one.
    pub slug: Option<String>,
    /// Descriptions of the violated rules.
    pub violations: Vec<String>,
}

/// Slug of a rendered document. An empty `slug` attribute counts as missing.
pub(crate) fn document_slug(rendering: &Rendering) -> Option<&str> {
    rendering.slug().filter(|slug| !slug.is_empty())
}

/// Render every document and check its slug against `rules`.
///
/// Every violation is logged before returning, so one run reports all
/// problems at once.
///
/// # Errors
///
/// Returns [`VerifyError::InvalidSlugs`] listing every failing document, or
/// [`VerifyError::Render`] if a document cannot be rendered.
pub fn verify_slugs(
    renderer: &Renderer,
    paths: &[impl AsRef<Path>],
    rules: &[SlugRule],
) -> Result<(), VerifyError> {
    let mut invalid = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let rendering = renderer.render(path)?;
        let slug = document_slug(&rendering);
        let violations = violated_slug_rules(slug, rules);

        if violations.is_empty() {
            continue;
        }
        for violation in &violations {
            error!("{}: invalid slug {:?}: {}", path.display(), slug.unwrap_or(""), violation);
        }
        invalid.push(SlugViolation {
            path: path.to_path_buf(),
            slug: slug.map(ToOwned::to_owned),
            violations,
        });
    }

    if invalid.is_empty() {
        info!("All {} document slugs are valid", paths.len());
        Ok(())
    } else {
        Err(VerifyError::InvalidSlugs(invalid))
    }
}
