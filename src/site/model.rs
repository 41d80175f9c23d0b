//! The persisted site document and its parts.
//!
//! Every struct carries `#[serde(default)]` so partial or older documents
//! load without error: a missing field is just an empty one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteDocument {
    pub personal: Personal,
    pub hero: Hero,
    pub about: About,
    pub media: Media,
    pub projects: Vec<Project>,
    pub creative: Vec<CreativePost>,
    pub skills: BTreeMap<String, Vec<String>>,
    /// Values committed through dotted paths that have no typed field.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Personal {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hero {
    pub headline: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct About {
    pub title: String,
    pub intro: String,
    pub journey: String,
    pub vision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Media {
    pub demo_video: MediaRef,
    pub profile_image: MediaRef,
}

/// Either a local blob key, a remote URL, or both. The key wins when both resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MediaRef {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.url.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub timeline: String,
    pub date: String,
    pub roles: Vec<String>,
    pub tools: Vec<String>,
    pub summary: String,
    pub details: String,
    pub cover_key: Option<String>,
    pub gallery_keys: Vec<String>,
}

impl Project {
    /// Every blob key this project owns, cover first.
    pub fn blob_keys(&self) -> Vec<String> {
        self.cover_key
            .iter()
            .chain(self.gallery_keys.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Classify a media type such as `image/png` or `video/mp4`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let top = content_type.split('/').next()?.trim();
        if top.eq_ignore_ascii_case("image") {
            Some(MediaKind::Image)
        } else if top.eq_ignore_ascii_case("video") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreativePost {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub caption: String,
    pub key: String,
    pub created_at: String,
}

impl SiteDocument {
    /// Placeholder content shown before anything has been saved.
    pub fn starter() -> Self {
        let mut doc = SiteDocument::default();
        doc.personal.name = "Your Name".to_string();
        doc.personal.location = "Somewhere, Earth".to_string();
        doc.hero.headline = "I make things people remember.".to_string();
        doc.hero.subtitle = "Switch on edit mode to tell your own story.".to_string();
        doc.about.title = "Hello!".to_string();
        doc.skills.insert("Tools".to_string(), Vec::new());
        doc
    }

    /// Give every project and creative post without an id a fresh one.
    /// Returns true when anything changed.
    pub fn ensure_ids(&mut self) -> bool {
        let mut changed = false;
        let mut seen = std::collections::HashSet::new();
        for project in &mut self.projects {
            if project.id.is_empty() || !seen.insert(project.id.clone()) {
                project.id = new_id();
                seen.insert(project.id.clone());
                changed = true;
            }
        }
        seen.clear();
        for post in &mut self.creative {
            if post.id.is_empty() || !seen.insert(post.id.clone()) {
                post.id = new_id();
                seen.insert(post.id.clone());
                changed = true;
            }
        }
        changed
    }

    pub fn project_index(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    pub fn creative_index(&self, id: &str) -> Option<usize> {
        self.creative.iter().position(|p| p.id == id)
    }

    /// Every blob key referenced anywhere in the document.
    pub fn referenced_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        keys.extend(self.media.demo_video.key.iter().cloned());
        keys.extend(self.media.profile_image.key.iter().cloned());
        for project in &self.projects {
            keys.extend(project.blob_keys());
        }
        keys.extend(self.creative.iter().map(|p| p.key.clone()));
        keys
    }
}

pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
