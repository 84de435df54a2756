//! Test helpers: an in-memory backend that records every call.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use inkpost_wordpress::{PostBackend, PostPayload, RemotePost, RemoteTag, WordPressError};

pub(crate) fn write_doc(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    CreateTag(String),
    Create(PostPayload),
    Update(u64, PostPayload),
    Delete(u64),
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub posts: Vec<RemotePost>,
    pub tags: Vec<RemoteTag>,
    pub calls: Vec<Call>,
    pub next_id: u64,
    /// Fail the update of this post id.
    pub fail_update: Option<u64>,
    /// Fail the deletion of this post id.
    pub fail_delete: Option<u64>,
}

/// Backend whose state is shared with the test through `Rc<RefCell<_>>`.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    /// Backend holding posts with the given slugs, ids starting at 1.
    pub fn with_slugs(slugs: &[&str]) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.borrow_mut();
            for slug in slugs {
                state.next_id += 1;
                let id = state.next_id;
                state.posts.push(RemotePost {
                    id,
                    slug: (*slug).to_owned(),
                    title: String::new(),
                    status: "publish".to_owned(),
                    custom_fields: Vec::new(),
                });
            }
        }
        backend
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn id_of(&self, slug: &str) -> u64 {
        self.state
            .borrow()
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| p.id)
            .unwrap()
    }
}

impl PostBackend for FakeBackend {
    fn list_posts(&self, _post_type: &str) -> Result<Vec<RemotePost>, WordPressError> {
        Ok(self.state.borrow().posts.clone())
    }

    fn list_tags(&self) -> Result<Vec<RemoteTag>, WordPressError> {
        Ok(self.state.borrow().tags.clone())
    }

    fn create_tag(&self, name: &str) -> Result<RemoteTag, WordPressError> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let tag = RemoteTag {
            id: state.next_id,
            name: name.to_owned(),
        };
        state.tags.push(tag.clone());
        state.calls.push(Call::CreateTag(name.to_owned()));
        Ok(tag)
    }

    fn create_post(&self, _post_type: &str, post: &PostPayload) -> Result<u64, WordPressError> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.posts.push(RemotePost {
            id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            status: post.status.clone(),
            custom_fields: post.custom_fields.clone(),
        });
        state.calls.push(Call::Create(post.clone()));
        Ok(id)
    }

    fn update_post(
        &self,
        _post_type: &str,
        id: u64,
        post: &PostPayload,
    ) -> Result<(), WordPressError> {
        let mut state = self.state.borrow_mut();
        if state.fail_update == Some(id) {
            return Err(WordPressError::Http {
                status: 500,
                body: "internal error".to_owned(),
            });
        }
        state.calls.push(Call::Update(id, post.clone()));
        Ok(())
    }

    fn delete_post(&self, _post_type: &str, id: u64) -> Result<(), WordPressError> {
        let mut state = self.state.borrow_mut();
        if state.fail_delete == Some(id) {
            return Err(WordPressError::Http {
                status: 500,
                body: "internal error".to_owned(),
            });
        }
        state.posts.retain(|p| p.id != id);
        state.calls.push(Call::Delete(id));
        Ok(())
    }
}
