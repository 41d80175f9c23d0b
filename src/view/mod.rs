//! In-memory projection of the site document: the node tree the page is
//! rendered from.
//!
//! Every `render` is a full replace of the lists and starts a new
//! generation. Media slots start out pending and are patched once their blob
//! key has been looked up; a lookup that finishes after a newer render, or
//! whose node is gone, is discarded.

pub mod reorder;
pub mod resolve;

use serde::Serialize;

use crate::site::fields::Field;
use crate::site::model::{MediaKind, MediaRef, SiteDocument};

pub use self::reorder::{apply_order, canonical_order, drag_reorder, drop_index, move_order, Span};
pub use self::resolve::{resolve_all, MediaTask, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub(crate) u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaState {
    Pending,
    Ready { src: String, content_type: String },
    Missing,
}

#[derive(Debug, Clone)]
pub struct MediaSlot {
    pub node: NodeId,
    pub key: Option<String>,
    fallback_url: Option<String>,
    pub state: MediaState,
}

impl MediaSlot {
    pub fn src(&self) -> Option<&str> {
        match &self.state {
            MediaState::Ready { src, .. } => Some(src),
            _ => None,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(&self.state, MediaState::Ready { content_type, .. }
            if MediaKind::from_content_type(content_type) == Some(MediaKind::Video))
    }

    pub fn is_pending(&self) -> bool {
        self.state == MediaState::Pending
    }

    fn resolve(&mut self, meta: Option<crate::store::BlobMeta>) {
        self.state = match (meta, &self.key, self.fallback_url.take()) {
            (Some(meta), Some(key), _) => MediaState::Ready {
                src: media_path(key),
                content_type: meta.content_type,
            },
            (None, _, Some(url)) => ready_url(url),
            _ => MediaState::Missing,
        };
    }
}

pub fn media_path(key: &str) -> String {
    format!("/media/{}", key)
}

fn ready_url(url: String) -> MediaState {
    let content_type = mime_guess::from_path(&url)
        .first_or_octet_stream()
        .to_string();
    MediaState::Ready {
        src: url,
        content_type,
    }
}

#[derive(Debug, Clone)]
pub struct BoundField {
    pub path: &'static str,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ProjectNode {
    pub node: NodeId,
    pub id: String,
    pub source_index: usize,
    pub title: String,
    pub subtitle: String,
    pub timeline: String,
    pub date: String,
    pub roles: String,
    pub tools: Vec<String>,
    pub summary: String,
    pub details: String,
    pub cover: Option<MediaSlot>,
    pub gallery: Vec<MediaSlot>,
}

impl ProjectNode {
    /// Two-digit display number, e.g. `01`.
    pub fn number(&self) -> String {
        format!("{:02}", self.source_index + 1)
    }

    pub fn cover_src(&self) -> Option<&str> {
        self.cover.as_ref().and_then(MediaSlot::src)
    }

    pub fn gallery_srcs(&self) -> Vec<&str> {
        self.gallery.iter().filter_map(MediaSlot::src).collect()
    }

    /// `(key, src)` of every gallery image that resolved.
    pub fn gallery_items(&self) -> Vec<(&str, &str)> {
        self.gallery
            .iter()
            .filter_map(|slot| Some((slot.key.as_deref()?, slot.src()?)))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CreativeNode {
    pub node: NodeId,
    pub id: String,
    pub kind: MediaKind,
    pub caption: String,
    pub created_at: String,
    pub media: MediaSlot,
}

#[derive(Debug, Clone)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Projection {
    generation: u64,
    next_node: u64,
    fields: Vec<BoundField>,
    reel: Option<MediaSlot>,
    profile: Option<MediaSlot>,
    projects: Vec<ProjectNode>,
    creative: Vec<CreativeNode>,
    skills: Vec<SkillGroup>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace every node with a fresh projection of `doc`.
    pub fn render(&mut self, doc: &SiteDocument) {
        self.generation += 1;

        self.fields = Field::ALL
            .into_iter()
            .map(|field| BoundField {
                path: field.path(),
                text: field.get(doc).to_string(),
            })
            .collect();

        self.reel = self.media_slot(&doc.media.demo_video);
        self.profile = self.media_slot(&doc.media.profile_image);

        let mut projects = Vec::with_capacity(doc.projects.len());
        for (index, project) in doc.projects.iter().enumerate() {
            let cover = project.cover_key.clone().map(|key| self.key_slot(key));
            let gallery = project
                .gallery_keys
                .iter()
                .map(|key| self.key_slot(key.clone()))
                .collect();
            projects.push(ProjectNode {
                node: self.next_id(),
                id: project.id.clone(),
                source_index: index,
                title: project.title.clone(),
                subtitle: project.subtitle.clone(),
                timeline: project.timeline.clone(),
                date: project.date.clone(),
                roles: project.roles.join(", "),
                tools: project.tools.clone(),
                summary: project.summary.clone(),
                details: project.details.clone(),
                cover,
                gallery,
            });
        }
        self.projects = projects;

        let mut creative = Vec::with_capacity(doc.creative.len());
        for post in &doc.creative {
            let media = self.key_slot(post.key.clone());
            creative.push(CreativeNode {
                node: self.next_id(),
                id: post.id.clone(),
                kind: post.kind,
                caption: post.caption.clone(),
                created_at: post.created_at.clone(),
                media,
            });
        }
        self.creative = creative;

        self.skills = doc
            .skills
            .iter()
            .map(|(category, skills)| SkillGroup {
                category: category.clone(),
                skills: skills.clone(),
            })
            .collect();

        tracing::debug!(
            generation = self.generation,
            projects = self.projects.len(),
            creative = self.creative.len(),
            "Rendered projection"
        );
    }

    /// Update the text shown for one bound field without a full render.
    pub fn set_field_text(&mut self, path: &str, text: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.path == path) {
            field.text = text.to_string();
        }
    }

    pub fn field_text(&self, path: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.text.as_str())
    }

    pub fn fields(&self) -> &[BoundField] {
        &self.fields
    }

    pub fn reel(&self) -> Option<&MediaSlot> {
        self.reel.as_ref()
    }

    pub fn profile(&self) -> Option<&MediaSlot> {
        self.profile.as_ref()
    }

    pub fn projects(&self) -> &[ProjectNode] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&ProjectNode> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn creative(&self) -> &[CreativeNode] {
        &self.creative
    }

    pub fn skills(&self) -> &[SkillGroup] {
        &self.skills
    }

    /// Document indices of the project nodes, in the order they are shown.
    pub fn live_order(&self) -> Vec<usize> {
        self.projects.iter().map(|p| p.source_index).collect()
    }

    /// Every slot still waiting on a blob lookup.
    pub fn pending(&self) -> Vec<MediaTask> {
        self.slots()
            .filter(|slot| slot.is_pending())
            .filter_map(|slot| {
                slot.key.as_ref().map(|key| MediaTask {
                    generation: self.generation,
                    node: slot.node,
                    key: key.clone(),
                })
            })
            .collect()
    }

    /// Patch resolved slots. Returns how many results were applied.
    pub fn apply(&mut self, results: Vec<Resolution>) -> usize {
        let mut applied = 0;
        for result in results {
            if result.generation != self.generation {
                tracing::debug!(
                    node = %result.node,
                    stale = result.generation,
                    current = self.generation,
                    "Discarding stale media resolution"
                );
                continue;
            }
            let Some(slot) = self.slots_mut().find(|s| s.node == result.node) else {
                tracing::debug!(node = %result.node, "Media node detached, discarding");
                continue;
            };
            if slot.key.as_deref() != Some(result.key.as_str()) || !slot.is_pending() {
                continue;
            }
            if result.meta.is_none() {
                tracing::debug!(key = %result.key, "Broken media reference omitted");
            }
            slot.resolve(result.meta);
            applied += 1;
        }
        applied
    }

    fn slots(&self) -> impl Iterator<Item = &MediaSlot> {
        self.reel
            .iter()
            .chain(self.profile.iter())
            .chain(
                self.projects
                    .iter()
                    .flat_map(|p| p.cover.iter().chain(p.gallery.iter())),
            )
            .chain(self.creative.iter().map(|c| &c.media))
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut MediaSlot> {
        self.reel
            .iter_mut()
            .chain(self.profile.iter_mut())
            .chain(
                self.projects
                    .iter_mut()
                    .flat_map(|p| p.cover.iter_mut().chain(p.gallery.iter_mut())),
            )
            .chain(self.creative.iter_mut().map(|c| &mut c.media))
    }

    fn next_id(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(self.next_node)
    }

    fn key_slot(&mut self, key: String) -> MediaSlot {
        MediaSlot {
            node: self.next_id(),
            key: Some(key),
            fallback_url: None,
            state: MediaState::Pending,
        }
    }

    fn media_slot(&mut self, media: &MediaRef) -> Option<MediaSlot> {
        if media.is_empty() {
            return None;
        }
        let node = self.next_id();
        let state = match (&media.key, &media.url) {
            (Some(_), _) => MediaState::Pending,
            (None, Some(url)) => ready_url(url.clone()),
            (None, None) => MediaState::Missing,
        };
        Some(MediaSlot {
            node,
            key: media.key.clone(),
            fallback_url: media.url.clone(),
            state,
        })
    }
}
