//! Document-to-post reconciliation.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use inkpost_renderer::{Renderer, Rendering};
use inkpost_wordpress::{CustomField, PostBackend, PostPayload, RemotePost, RemoteTag};
use tracing::{info, warn};

use crate::error::SyncError;
use crate::report::{SyncPlan, SyncReport};
use crate::verify::document_slug;

/// Custom field that receives the JSON snapshot of document attributes by default.
pub const DEFAULT_ATTRIBUTES_FIELD: &str = "document_attributes";

/// Predicate deciding whether a rendered document is synced.
pub type DocumentFilter = Arc<dyn Fn(&Rendering) -> bool + Send + Sync>;

/// Sync behavior switches.
#[derive(Clone)]
pub struct SyncOptions {
    /// Documents rejected by the filter are skipped. `None` accepts all.
    pub filter: Option<DocumentFilter>,
    /// Delete remote posts whose slug matches no synced document.
    pub delete_not_found: bool,
    /// Resolve document tags to remote tags, creating missing ones.
    pub generate_tags: bool,
    /// Status given to created and updated posts.
    pub post_status: String,
    /// Custom field holding the JSON snapshot of document attributes.
    pub attributes_field: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            filter: None,
            delete_not_found: false,
            generate_tags: false,
            post_status: "draft".to_owned(),
            attributes_field: Some(DEFAULT_ATTRIBUTES_FIELD.to_owned()),
        }
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("filter", &self.filter.is_some())
            .field("delete_not_found", &self.delete_not_found)
            .field("generate_tags", &self.generate_tags)
            .field("post_status", &self.post_status)
            .field("attributes_field", &self.attributes_field)
            .finish()
    }
}

/// Reconciles local documents with the remote posts of one post type.
///
/// Remote posts (and tags, when tag generation is on) are fetched once in
/// [`Syncer::new`]. The snapshot is not refreshed during [`Syncer::sync`], so
/// posts created by a run are not visible to later documents of the same run.
pub struct Syncer {
    backend: Box<dyn PostBackend>,
    post_type: String,
    renderer: Renderer,
    options: SyncOptions,
    /// Remote posts keyed by slug.
    posts: HashMap<String, RemotePost>,
    /// Remote tags keyed by lowercased name.
    tags: HashMap<String, RemoteTag>,
}

/// Document ready to be sent.
struct Prepared {
    rendering: Rendering,
    slug: String,
}

impl Syncer {
    /// Create a syncer, fetching the remote inventory.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if listing posts or tags fails.
    pub fn new(
        backend: Box<dyn PostBackend>,
        post_type: impl Into<String>,
        renderer: Renderer,
        options: SyncOptions,
    ) -> Result<Self, SyncError> {
        let post_type = post_type.into();

        // Later duplicates win.
        let posts: HashMap<String, RemotePost> = backend
            .list_posts(&post_type)?
            .into_iter()
            .map(|post| (post.slug.clone(), post))
            .collect();
        info!("Found {} remote {} posts", posts.len(), post_type);

        let tags: HashMap<String, RemoteTag> = if options.generate_tags {
            let tags: HashMap<_, _> = backend
                .list_tags()?
                .into_iter()
                .map(|tag| (tag.name.to_lowercase(), tag))
                .collect();
            info!("Found {} remote tags", tags.len());
            tags
        } else {
            HashMap::new()
        };

        Ok(Self {
            backend,
            post_type,
            renderer,
            options,
            posts,
            tags,
        })
    }

    /// Sync `paths` in order, then delete stale posts if enabled.
    ///
    /// `custom_fields` are attached to every post.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Render`] if a document cannot be rendered and
    /// [`SyncError::Remote`] on the first failed remote call. Changes made
    /// before the failure stay in place.
    pub fn sync(
        &mut self,
        paths: &[impl AsRef<Path>],
        custom_fields: &[CustomField],
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        for path in paths {
            let path = path.as_ref();
            let Some(Prepared { rendering, slug }) = self.prepare(path)? else {
                report.skipped.push(path.to_path_buf());
                continue;
            };

            let tag_ids = if self.options.generate_tags {
                self.resolve_tags(&rendering.tags)?
            } else {
                Vec::new()
            };
            let mut payload = self.payload(&rendering, &slug, tag_ids, custom_fields);

            if let Some(remote) = self.posts.get(&slug) {
                carry_forward_field_ids(&mut payload.custom_fields, &remote.custom_fields);
                info!("Updating '{}' ({}) from {}", slug, remote.id, path.display());
                self.backend
                    .update_post(&self.post_type, remote.id, &payload)?;
                report.updated.push(slug.clone());
            } else {
                info!("Creating '{}' from {}", slug, path.display());
                let id = self.backend.create_post(&self.post_type, &payload)?;
                info!("Created '{}' as {}", slug, id);
                report.created.push(slug.clone());
            }

            report.processed.insert(slug);
        }

        if self.options.delete_not_found {
            for (slug, id) in self.stale_posts(&report.processed) {
                info!("Deleting '{}' ({})", slug, id);
                self.backend.delete_post(&self.post_type, id)?;
                report.deleted.push(slug);
            }
        }

        Ok(report)
    }

    /// Compute what [`Syncer::sync`] would do without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Render`] if a document cannot be rendered.
    pub fn plan(&self, paths: &[impl AsRef<Path>]) -> Result<SyncPlan, SyncError> {
        let mut plan = SyncPlan::default();
        let mut processed = BTreeSet::new();
        let mut new_tags = BTreeSet::new();

        for path in paths {
            let path = path.as_ref();
            let Some(Prepared { rendering, slug }) = self.prepare(path)? else {
                plan.skipped.push(path.to_path_buf());
                continue;
            };

            if self.options.generate_tags {
                for tag in &rendering.tags {
                    let key = tag.to_lowercase();
                    if !self.tags.contains_key(&key) && new_tags.insert(key) {
                        plan.new_tags.push(tag.clone());
                    }
                }
            }

            if self.posts.contains_key(&slug) {
                plan.update.push(slug.clone());
            } else {
                plan.create.push(slug.clone());
            }
            processed.insert(slug);
        }

        if self.options.delete_not_found {
            plan.delete = self
                .stale_posts(&processed)
                .into_iter()
                .map(|(slug, _)| slug)
                .collect();
        }

        Ok(plan)
    }

    /// Render a document and decide whether it takes part in the run.
    fn prepare(&self, path: &Path) -> Result<Option<Prepared>, SyncError> {
        let rendering = self.renderer.render(path)?;

        if let Some(filter) = &self.options.filter
            && !filter(&rendering)
        {
            info!("Skipping {}: rejected by filter", path.display());
            return Ok(None);
        }

        let Some(slug) = document_slug(&rendering).map(ToOwned::to_owned) else {
            warn!("Skipping {}: no slug", path.display());
            return Ok(None);
        };

        Ok(Some(Prepared { rendering, slug }))
    }

    /// Map tag names to remote ids, creating tags the remote lacks.
    fn resolve_tags(&mut self, names: &[String]) -> Result<Vec<u64>, SyncError> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let key = name.to_lowercase();
            let id = if let Some(tag) = self.tags.get(&key) {
                tag.id
            } else {
                info!("Creating tag '{}'", name);
                let tag = self.backend.create_tag(name)?;
                let id = tag.id;
                self.tags.insert(key, tag);
                id
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    fn payload(
        &self,
        rendering: &Rendering,
        slug: &str,
        tag_ids: Vec<u64>,
        custom_fields: &[CustomField],
    ) -> PostPayload {
        let mut fields = custom_fields.to_vec();
        if let Some(field) = &self.options.attributes_field {
            let snapshot = serde_json::json!(rendering.attributes).to_string();
            fields.retain(|f| &f.key != field);
            fields.push(CustomField::new(field.clone(), snapshot));
        }

        PostPayload {
            title: rendering.title.clone().unwrap_or_else(|| slug.to_owned()),
            content: rendering.html.clone(),
            slug: slug.to_owned(),
            status: self.options.post_status.clone(),
            date: rendering
                .attribute("date")
                .or_else(|| rendering.attribute("revdate"))
                .map(ToOwned::to_owned),
            tag_ids,
            custom_fields: fields,
        }
    }

    /// Remote posts not among `processed`, sorted by slug.
    fn stale_posts(&self, processed: &BTreeSet<String>) -> Vec<(String, u64)> {
        let mut stale: Vec<(String, u64)> = self
            .posts
            .values()
            .filter(|post| !processed.contains(&post.slug))
            .map(|post| (post.slug.clone(), post.id))
            .collect();
        stale.sort();
        stale
    }
}

/// Reuse remote field ids so updates replace fields instead of appending.
fn carry_forward_field_ids(fields: &mut [CustomField], remote: &[CustomField]) {
    for field in fields.iter_mut().filter(|f| f.id.is_none()) {
        field.id = remote
            .iter()
            .find(|r| r.key == field.key)
            .and_then(|r| r.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{Call, FakeBackend, write_doc};

    fn syncer(backend: &FakeBackend, options: SyncOptions) -> Syncer {
        Syncer::new(Box::new(backend.clone()), "post", Renderer::new(), options).unwrap()
    }

    fn doc(dir: &TempDir, slug: &str) -> std::path::PathBuf {
        write_doc(
            dir.path(),
            &format!("{slug}.md"),
            &format!("---\nslug: {slug}\n---\n# Title {slug}\n\nBody of {slug}.\n"),
        )
    }

    #[test]
    fn test_reconciliation_with_delete() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a", "b", "c"]);
        let (id_a, id_b, id_c) = (backend.id_of("a"), backend.id_of("b"), backend.id_of("c"));
        let paths = [doc(&dir, "a"), doc(&dir, "c"), doc(&dir, "d")];

        let mut syncer = syncer(
            &backend,
            SyncOptions {
                delete_not_found: true,
                ..Default::default()
            },
        );
        let report = syncer.sync(&paths, &[]).unwrap();

        assert_eq!(report.created, vec!["d"]);
        assert_eq!(report.updated, vec!["a", "c"]);
        assert_eq!(report.deleted, vec!["b"]);
        assert_eq!(
            report.processed.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "c", "d"]
        );

        let kinds: Vec<_> = backend
            .calls()
            .into_iter()
            .map(|call| match call {
                Call::Update(id, p) => format!("update {id} {}", p.slug),
                Call::Create(p) => format!("create {}", p.slug),
                Call::Delete(id) => format!("delete {id}"),
                Call::CreateTag(name) => format!("tag {name}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                format!("update {id_a} a"),
                format!("update {id_c} c"),
                "create d".to_owned(),
                format!("delete {id_b}"),
            ]
        );
    }

    #[test]
    fn test_no_delete_by_default() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a", "b"]);

        let report = syncer(&backend, SyncOptions::default())
            .sync(&[doc(&dir, "a")], &[])
            .unwrap();

        assert!(report.deleted.is_empty());
        assert!(
            !backend
                .calls()
                .iter()
                .any(|call| matches!(call, Call::Delete(_)))
        );
    }

    #[test]
    fn test_missing_slug_is_skipped() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let untitled = write_doc(dir.path(), "untitled.md", "# No slug here\n");

        let report = syncer(&backend, SyncOptions::default())
            .sync(&[untitled.clone()], &[])
            .unwrap();

        assert!(backend.calls().is_empty());
        assert!(report.processed.is_empty());
        assert_eq!(report.skipped, vec![untitled]);
    }

    #[test]
    fn test_second_run_updates_with_identical_payload() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let paths = [doc(&dir, "first")];

        syncer(&backend, SyncOptions::default())
            .sync(&paths, &[])
            .unwrap();
        syncer(&backend, SyncOptions::default())
            .sync(&paths, &[])
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        let (Call::Create(created), Call::Update(id, updated)) = (&calls[0], &calls[1]) else {
            panic!("expected create then update, got {calls:?}");
        };
        assert_eq!(*id, backend.id_of("first"));
        assert_eq!(created, updated);
    }

    #[test]
    fn test_payload_contents() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let path = write_doc(
            dir.path(),
            "notes.md",
            "---\nslug: notes\nrevdate: 2024-03-01\n---\n# Release Notes\n\nHello.\n",
        );

        syncer(
            &backend,
            SyncOptions {
                post_status: "publish".to_owned(),
                ..Default::default()
            },
        )
        .sync(&[path], &[CustomField::new("source", "docs")])
        .unwrap();

        let Call::Create(payload) = &backend.calls()[0] else {
            panic!("expected create");
        };
        assert_eq!(payload.title, "Release Notes");
        assert_eq!(payload.slug, "notes");
        assert_eq!(payload.status, "publish");
        assert_eq!(payload.date.as_deref(), Some("2024-03-01"));
        assert!(payload.content.contains("<p>Hello.</p>"));
        assert!(!payload.content.contains("<h1>"));

        assert_eq!(payload.custom_fields[0], CustomField::new("source", "docs"));
        assert_eq!(payload.custom_fields[1].key, DEFAULT_ATTRIBUTES_FIELD);
        let snapshot: serde_json::Value =
            serde_json::from_str(&payload.custom_fields[1].value).unwrap();
        assert_eq!(snapshot["slug"], "notes");
        assert_eq!(snapshot["doctitle"], "Release Notes");
    }

    #[test]
    fn test_date_attribute_wins_over_revdate() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let path = write_doc(
            dir.path(),
            "dated.md",
            "---\nslug: dated\ndate: 2024-05-01\nrevdate: 2023-01-01\n---\n",
        );

        syncer(
            &backend,
            SyncOptions {
                attributes_field: None,
                ..Default::default()
            },
        )
        .sync(&[path], &[])
        .unwrap();

        let Call::Create(payload) = &backend.calls()[0] else {
            panic!("expected create");
        };
        assert_eq!(payload.date.as_deref(), Some("2024-05-01"));
        assert!(payload.custom_fields.is_empty());
    }

    #[test]
    fn test_custom_field_ids_carried_forward() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a"]);
        backend.state.borrow_mut().posts[0].custom_fields = vec![
            CustomField {
                id: Some("77".to_owned()),
                key: DEFAULT_ATTRIBUTES_FIELD.to_owned(),
                value: "{}".to_owned(),
            },
            CustomField {
                id: Some("78".to_owned()),
                key: "unrelated".to_owned(),
                value: "x".to_owned(),
            },
        ];

        syncer(&backend, SyncOptions::default())
            .sync(&[doc(&dir, "a")], &[CustomField::new("source", "docs")])
            .unwrap();

        let Call::Update(_, payload) = &backend.calls()[0] else {
            panic!("expected update");
        };
        let ids: Vec<_> = payload
            .custom_fields
            .iter()
            .map(|f| (f.key.as_str(), f.id.as_deref()))
            .collect();
        assert_eq!(
            ids,
            vec![("source", None), (DEFAULT_ATTRIBUTES_FIELD, Some("77"))]
        );
    }

    #[test]
    fn test_generate_tags_creates_missing() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        backend.state.borrow_mut().tags.push(RemoteTag {
            id: 500,
            name: "rust".to_owned(),
        });
        let path = write_doc(
            dir.path(),
            "tagged.md",
            "---\nslug: tagged\ntags: Rust, NewTag, newtag\n---\n",
        );

        let report = syncer(
            &backend,
            SyncOptions {
                generate_tags: true,
                ..Default::default()
            },
        )
        .sync(&[path], &[])
        .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0], Call::CreateTag("NewTag".to_owned()));
        let new_id = backend.state.borrow().tags[1].id;
        let Call::Create(payload) = &calls[1] else {
            panic!("expected create after tag, got {calls:?}");
        };
        assert_eq!(payload.tag_ids, vec![500, new_id]);
        assert_eq!(calls.len(), 2);
        assert_eq!(report.created, vec!["tagged"]);
    }

    #[test]
    fn test_tags_ignored_without_generation() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let path = write_doc(dir.path(), "t.md", "---\nslug: t\ntags: one\n---\n");

        syncer(&backend, SyncOptions::default())
            .sync(&[path], &[])
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let Call::Create(payload) = &calls[0] else {
            panic!("expected create");
        };
        assert!(payload.tag_ids.is_empty());
    }

    #[test]
    fn test_filter_skips_documents() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let draft = write_doc(dir.path(), "draft.md", "---\nslug: draft\nwip: yes\n---\n");
        let ready = doc(&dir, "ready");

        let report = syncer(
            &backend,
            SyncOptions {
                filter: Some(Arc::new(|r: &Rendering| r.attribute("wip").is_none())),
                ..Default::default()
            },
        )
        .sync(&[draft.clone(), ready], &[])
        .unwrap();

        assert_eq!(report.skipped, vec![draft]);
        assert_eq!(report.created, vec!["ready"]);
    }

    #[test]
    fn test_remote_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a"]);
        backend.state.borrow_mut().fail_update = Some(backend.id_of("a"));

        let err = syncer(&backend, SyncOptions::default())
            .sync(&[doc(&dir, "a"), doc(&dir, "later")], &[])
            .unwrap_err();

        assert!(matches!(err, SyncError::Remote(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_failed_delete_stops_deleting() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a", "b", "c"]);
        backend.state.borrow_mut().fail_delete = Some(backend.id_of("b"));

        let err = syncer(
            &backend,
            SyncOptions {
                delete_not_found: true,
                ..Default::default()
            },
        )
        .sync(&[doc(&dir, "a")], &[])
        .unwrap_err();

        assert!(matches!(err, SyncError::Remote(_)));
        assert!(
            !backend
                .calls()
                .iter()
                .any(|call| matches!(call, Call::Delete(_)))
        );
        let remaining: Vec<_> = backend
            .state
            .borrow()
            .posts
            .iter()
            .map(|p| p.slug.clone())
            .collect();
        assert_eq!(remaining, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unreadable_document_aborts() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::default();

        let err = syncer(&backend, SyncOptions::default())
            .sync(&[dir.path().join("missing.md")], &[])
            .unwrap_err();

        assert!(matches!(err, SyncError::Render(_)));
    }

    #[test]
    fn test_plan_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["a", "b", "c"]);
        let tagged = write_doc(
            dir.path(),
            "d.md",
            "---\nslug: d\ntags: Fresh, fresh\n---\n",
        );
        let paths = [doc(&dir, "a"), doc(&dir, "c"), tagged];

        let plan = syncer(
            &backend,
            SyncOptions {
                delete_not_found: true,
                generate_tags: true,
                ..Default::default()
            },
        )
        .plan(&paths)
        .unwrap();

        assert_eq!(
            plan,
            SyncPlan {
                create: vec!["d".to_owned()],
                update: vec!["a".to_owned(), "c".to_owned()],
                delete: vec!["b".to_owned()],
                new_tags: vec!["Fresh".to_owned()],
                skipped: Vec::new(),
            }
        );
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_duplicate_remote_slugs_last_wins() {
        let dir = TempDir::new().unwrap();
        let backend = FakeBackend::with_slugs(&["dup", "dup"]);
        let last_id = backend.state.borrow().posts[1].id;

        syncer(&backend, SyncOptions::default())
            .sync(&[doc(&dir, "dup")], &[])
            .unwrap();

        assert!(matches!(&backend.calls()[0], Call::Update(id, _) if *id == last_id));
    }
}
