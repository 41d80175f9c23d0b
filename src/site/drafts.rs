//! Editor forms for projects and creative posts.
//!
//! A draft is a detached copy: editing it never touches the document until
//! it is submitted, so a cancelled edit leaves stored state alone.

use serde::{Deserialize, Serialize};

use super::model::{CreativePost, Project};
use super::SiteError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    pub title: String,
    pub subtitle: String,
    pub timeline: String,
    pub date: String,
    /// Comma separated.
    pub roles: String,
    /// Comma separated.
    pub tools: String,
    pub summary: String,
    pub details: String,
}

impl ProjectDraft {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            subtitle: project.subtitle.clone(),
            timeline: project.timeline.clone(),
            date: project.date.clone(),
            roles: project.roles.join(", "),
            tools: project.tools.join(", "),
            summary: project.summary.clone(),
            details: project.details.clone(),
        }
    }

    /// Apply the draft on top of `base`, keeping its id and media keys.
    pub fn apply(self, base: Project) -> Result<Project, SiteError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(SiteError::Validation("Project title is required.".into()));
        }
        Ok(Project {
            title,
            subtitle: self.subtitle.trim().to_string(),
            timeline: self.timeline.trim().to_string(),
            date: self.date.trim().to_string(),
            roles: split_list(&self.roles),
            tools: split_list(&self.tools),
            summary: self.summary.trim().to_string(),
            details: self.details.trim().to_string(),
            ..base
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeDraft {
    pub caption: String,
}

impl CreativeDraft {
    pub fn from_post(post: &CreativePost) -> Self {
        Self {
            caption: post.caption.clone(),
        }
    }

    pub fn apply(self, base: CreativePost) -> CreativePost {
        CreativePost {
            caption: self.caption.trim().to_string(),
            ..base
        }
    }
}

/// Split a comma separated field into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list(" Maya, Houdini ,, Substance Painter ,"),
            vec!["Maya", "Houdini", "Substance Painter"]
        );
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn draft_from_project_joins_lists() {
        let project = Project {
            title: "Reel".into(),
            roles: vec!["Lead".into(), "Editor".into()],
            tools: vec!["Nuke".into()],
            ..Project::default()
        };
        let draft = ProjectDraft::from_project(&project);
        assert_eq!(draft.roles, "Lead, Editor");
        assert_eq!(draft.tools, "Nuke");
    }

    #[test]
    fn apply_keeps_identity_and_media() {
        let base = Project {
            id: "p1".into(),
            title: "Old".into(),
            cover_key: Some("cover-1".into()),
            gallery_keys: vec!["gallery-1".into()],
            ..Project::default()
        };
        let draft = ProjectDraft {
            title: "  New title ".into(),
            roles: "Director, Editor".into(),
            ..ProjectDraft::from_project(&base)
        };
        let project = draft.apply(base).unwrap();
        assert_eq!(project.id, "p1");
        assert_eq!(project.title, "New title");
        assert_eq!(project.roles, vec!["Director", "Editor"]);
        assert_eq!(project.cover_key.as_deref(), Some("cover-1"));
        assert_eq!(project.gallery_keys, vec!["gallery-1"]);
    }

    #[test]
    fn blank_title_is_a_validation_failure() {
        let err = ProjectDraft {
            title: "   ".into(),
            ..ProjectDraft::blank()
        }
        .apply(Project::default())
        .unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn editing_a_draft_does_not_touch_the_source() {
        let project = Project {
            title: "Keep".into(),
            ..Project::default()
        };
        let mut draft = ProjectDraft::from_project(&project);
        draft.title = "Changed".into();
        assert_eq!(project.title, "Keep");
    }

    #[test]
    fn creative_draft_trims_caption() {
        let post = CreativePost {
            id: "c1".into(),
            caption: "old".into(),
            ..CreativePost::default()
        };
        let updated = CreativeDraft {
            caption: "  sunset  ".into(),
        }
        .apply(post);
        assert_eq!(updated.id, "c1");
        assert_eq!(updated.caption, "sunset");
    }
}
