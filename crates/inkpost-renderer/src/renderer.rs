//! Document renderer.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine;
use crate::error::RenderError;
use crate::front_matter;
use crate::include::expand_includes;

/// Diagnostics containing this text are expected and never surfaced.
const BENIGN_WARNING: &str = "out of sequence";

/// Text transform applied to raw Markdown or rendered HTML.
pub type TextTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Tag transform. Its return value replaces the derived tag list.
pub type TagTransform = Arc<dyn Fn(&Rendering) -> Vec<String> + Send + Sync>;

/// Result of rendering one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendering {
    /// Rendered HTML body.
    pub html: String,
    /// Document title (`title` attribute or leading H1 heading).
    pub title: Option<String>,
    /// Document attributes with null values dropped.
    pub attributes: BTreeMap<String, String>,
    /// Tags derived from the `tags` attribute and `public`/`private` flags.
    pub tags: Vec<String>,
    /// Conversion warnings that were reported to the operator.
    pub warnings: Vec<String>,
    /// Path the document was loaded from.
    pub source: PathBuf,
}

impl Rendering {
    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `slug` attribute.
    pub fn slug(&self) -> Option<&str> {
        self.attribute("slug")
    }
}

/// Options passed to the conversion engine.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Use the leading H1 heading as title.
    pub extract_title: bool,
    /// Default attributes; the document's own front matter wins.
    pub attributes: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            extract_title: true,
            attributes: BTreeMap::new(),
        }
    }
}

/// Renders Markdown documents from disk into [`Rendering`]s.
///
/// Every call to [`render`](Self::render) re-reads and re-parses the file.
#[derive(Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
    preprocessor: Option<TextTransform>,
    postprocessor: Option<TextTransform>,
    tag_transform: Option<TagTransform>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field("preprocessor", &self.preprocessor.is_some())
            .field("postprocessor", &self.postprocessor.is_some())
            .field("tag_transform", &self.tag_transform.is_some())
            .finish()
    }
}

impl Renderer {
    /// Create a renderer with default options and no transforms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set conversion engine options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Transform raw document text before conversion.
    #[must_use]
    pub fn with_preprocessor(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.preprocessor = Some(Arc::new(f));
        self
    }

    /// Transform rendered HTML after conversion.
    #[must_use]
    pub fn with_postprocessor(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.postprocessor = Some(Arc::new(f));
        self
    }

    /// Replace derived tags with the return value of `f`.
    ///
    /// `f` sees the complete rendering, including the derived tags.
    #[must_use]
    pub fn with_tag_transform(
        mut self,
        f: impl Fn(&Rendering) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.tag_transform = Some(Arc::new(f));
        self
    }

    /// Render the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Read`] if the file cannot be read and
    /// [`RenderError::FrontMatter`] if its header is not a YAML mapping.
    pub fn render(&self, path: &Path) -> Result<Rendering, RenderError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = match &self.preprocessor {
            Some(f) => f(&raw),
            None => raw,
        };

        let (header, body) = front_matter::split(&text);
        let header = header
            .map(front_matter::parse)
            .transpose()
            .map_err(|message| RenderError::FrontMatter {
                path: path.to_path_buf(),
                message,
            })?
            .unwrap_or_default();

        let base_dir = path.parent().unwrap_or(Path::new("."));
        let mut diagnostics = Vec::new();
        let header_lines = text[..text.len() - body.len()].matches('\n').count();
        let body = expand_includes(body, base_dir, header_lines, &mut diagnostics);

        let converted = engine::convert(&body, self.options.gfm, self.options.extract_title);
        diagnostics.extend(converted.diagnostics);
        let warnings = report_diagnostics(path, diagnostics);

        let html = match &self.postprocessor {
            Some(f) => f(&converted.html),
            None => converted.html,
        };

        let mut attributes = self.options.attributes.clone();
        attributes.extend(intrinsic_attributes(path, base_dir));
        attributes.extend(
            header
                .iter()
                .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone()))),
        );

        let title = attributes.get("title").cloned().or(converted.title);
        if let Some(title) = &title {
            attributes.insert("doctitle".to_owned(), title.clone());
        }

        // Null front-matter keys are dropped from attributes but still count.
        let present = |key: &str| header.contains_key(key) || attributes.contains_key(key);
        let mut tags = split_tags(attributes.get("tags").map_or("", String::as_str));
        for flag in ["public", "private"] {
            if present(flag) {
                tags.push(flag.to_owned());
            }
        }

        let mut rendering = Rendering {
            html,
            title,
            attributes,
            tags,
            warnings,
            source: path.to_path_buf(),
        };
        if let Some(f) = &self.tag_transform {
            rendering.tags = f(&rendering);
        }

        debug!(path = %path.display(), tags = ?rendering.tags, "Rendered document");
        Ok(rendering)
    }
}

/// Drop benign diagnostics and log the rest.
fn report_diagnostics(path: &Path, diagnostics: Vec<String>) -> Vec<String> {
    diagnostics
        .into_iter()
        .filter(|d| !d.contains(BENIGN_WARNING))
        .inspect(|d| warn!("{}: {d}", path.display()))
        .collect()
}

/// Attributes the engine sets for every document.
fn intrinsic_attributes(path: &Path, base_dir: &Path) -> [(String, String); 3] {
    let docname = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    [
        ("docname".to_owned(), docname),
        ("docfile".to_owned(), path.display().to_string()),
        ("docdir".to_owned(), base_dir.display().to_string()),
    ]
}

/// Split a comma-separated tag list, dropping empty entries.
fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
