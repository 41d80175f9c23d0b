//! The single owned application state: the site document, the stores it
//! is persisted to, and the projection rendered from it.
//!
//! Every mutation builds the next document, saves it, and only then swaps
//! it in and re-renders. A failed save leaves the previous document and
//! projection untouched.

pub mod drafts;
pub mod fields;
pub mod model;

use std::sync::Arc;

use crate::store::{generate_key, Blob, BlobStore, DocumentStore, StoreError};
use crate::view::{self, Projection, Span};

use self::drafts::{CreativeDraft, ProjectDraft};
use self::fields::{FieldPath, FieldPathError};
use self::model::{new_id, CreativePost, MediaKind, MediaRef, Project, SiteDocument};

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldPathError> for SiteError {
    fn from(e: FieldPathError) -> Self {
        SiteError::Validation(e.to_string())
    }
}

pub type SiteResult<T> = Result<T, SiteError>;

/// Which standalone media reference of the document to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlotName {
    DemoVideo,
    ProfileImage,
}

impl MediaSlotName {
    pub fn kind(self) -> MediaKind {
        match self {
            MediaSlotName::DemoVideo => MediaKind::Video,
            MediaSlotName::ProfileImage => MediaKind::Image,
        }
    }

    fn key_prefix(self) -> &'static str {
        match self {
            MediaSlotName::DemoVideo => "video",
            MediaSlotName::ProfileImage => "profile",
        }
    }

    fn get(self, doc: &SiteDocument) -> &MediaRef {
        match self {
            MediaSlotName::DemoVideo => &doc.media.demo_video,
            MediaSlotName::ProfileImage => &doc.media.profile_image,
        }
    }

    fn get_mut(self, doc: &mut SiteDocument) -> &mut MediaRef {
        match self {
            MediaSlotName::DemoVideo => &mut doc.media.demo_video,
            MediaSlotName::ProfileImage => &mut doc.media.profile_image,
        }
    }
}

pub struct Site {
    doc: SiteDocument,
    documents: DocumentStore,
    blobs: Arc<dyn BlobStore>,
    view: Projection,
    edit_mode: bool,
}

impl Site {
    /// Load the stored document (or the starter one) and render it.
    pub fn open(documents: DocumentStore, blobs: Arc<dyn BlobStore>) -> SiteResult<Self> {
        let (mut doc, stored) = match documents.load()? {
            Some(doc) => (doc, true),
            None => (SiteDocument::starter(), false),
        };
        if doc.ensure_ids() && stored {
            tracing::info!("Assigned ids to legacy site entries");
            documents.save(&doc)?;
        }

        let mut view = Projection::new();
        view.render(&doc);

        Ok(Self {
            doc,
            documents,
            blobs,
            view,
            edit_mode: false,
        })
    }

    pub fn document(&self) -> &SiteDocument {
        &self.doc
    }

    pub fn projection(&self) -> &Projection {
        &self.view
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.view
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn blobs(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.blobs)
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        tracing::info!(edit_mode = self.edit_mode, "Edit mode toggled");
        self.edit_mode
    }

    /// Persist `next` and make it current.
    fn commit(&mut self, next: SiteDocument) -> SiteResult<()> {
        self.documents.save(&next)?;
        self.doc = next;
        self.view.render(&self.doc);
        Ok(())
    }

    /// Re-read the stored document, e.g. after an import.
    pub fn reload(&mut self) -> SiteResult<()> {
        let mut doc = self.documents.load()?.unwrap_or_else(SiteDocument::starter);
        if doc.ensure_ids() {
            self.documents.save(&doc)?;
        }
        self.doc = doc;
        self.view.render(&self.doc);
        Ok(())
    }

    /// Delete blobs nobody references anymore. Failures are logged and ignored.
    async fn discard_blobs(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.blobs.delete(key).await {
                tracing::warn!(key = %key, "Failed to delete blob: {}", e);
            }
        }
    }

    /// Store `blob` under a fresh key, returning the key.
    async fn store_blob(&self, prefix: &str, blob: Blob) -> SiteResult<String> {
        let key = generate_key(prefix);
        self.blobs.put(&key, blob).await?;
        Ok(key)
    }

    /// Commit `next` after new blobs were stored; on failure the new blobs are removed again.
    async fn commit_with_blobs(&mut self, next: SiteDocument, new_keys: &[String]) -> SiteResult<()> {
        if let Err(e) = self.commit(next) {
            self.discard_blobs(new_keys).await;
            return Err(e);
        }
        Ok(())
    }

    // --- Editable fields ---

    /// Commit edited text at a dotted path. Returns the trimmed value stored.
    pub fn commit_field(&mut self, path: &str, text: &str) -> SiteResult<String> {
        let path = FieldPath::parse(path)?;
        let value = text.trim().to_string();

        let mut next = self.doc.clone();
        path.write(&mut next, value.clone());
        self.documents.save(&next)?;
        self.doc = next;

        let path = path.as_string();
        self.view.set_field_text(&path, &value);
        tracing::debug!(path = %path, "Committed field");
        Ok(value)
    }

    // --- Projects ---

    pub fn project(&self, id: &str) -> SiteResult<&Project> {
        self.doc
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(SiteError::NotFound("Project"))
    }

    pub fn create_project(&mut self, draft: ProjectDraft) -> SiteResult<String> {
        let project = draft.apply(Project {
            id: new_id(),
            ..Project::default()
        })?;
        let id = project.id.clone();

        let mut next = self.doc.clone();
        next.projects.push(project);
        self.commit(next)?;
        tracing::info!(project = %id, "Project created");
        Ok(id)
    }

    pub fn update_project(&mut self, id: &str, draft: ProjectDraft) -> SiteResult<()> {
        let index = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;
        let project = draft.apply(self.doc.projects[index].clone())?;

        let mut next = self.doc.clone();
        next.projects[index] = project;
        self.commit(next)
    }

    /// Remove a project and every blob it references.
    ///
    /// Blob deletion is best-effort: the entry is removed even if a blob
    /// could not be deleted.
    pub async fn delete_project(&mut self, id: &str) -> SiteResult<Project> {
        let index = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;
        let project = self.doc.projects[index].clone();

        self.discard_blobs(&project.blob_keys()).await;

        let mut next = self.doc.clone();
        next.projects.remove(index);
        self.commit(next)?;
        tracing::info!(project = %id, index, "Project deleted");
        Ok(project)
    }

    /// Set the project order from ids read back from the page.
    pub fn reorder_projects(&mut self, ids: &[String]) -> SiteResult<()> {
        let live: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.doc.project_index(id))
            .collect();
        self.apply_project_order(&live)
    }

    /// Move one project to position `to`.
    pub fn move_project(&mut self, id: &str, to: usize) -> SiteResult<()> {
        let from = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;
        let order = view::move_order(self.doc.projects.len(), from, to);
        self.apply_project_order(&order)
    }

    /// Drop a dragged project card at `pointer_y`, given the extents of all
    /// cards as currently shown.
    pub fn drop_project(&mut self, id: &str, pointer_y: f64, spans: &[Span]) -> SiteResult<()> {
        let live = self.view.live_order();
        let dragged = self
            .view
            .projects()
            .iter()
            .position(|p| p.id == id)
            .ok_or(SiteError::NotFound("Project"))?;
        let order = view::drag_reorder(&live, dragged, spans, pointer_y).ok_or_else(|| {
            SiteError::Validation(format!(
                "Expected {} card positions, got {}",
                live.len(),
                spans.len()
            ))
        })?;
        self.apply_project_order(&order)
    }

    fn apply_project_order(&mut self, live: &[usize]) -> SiteResult<()> {
        let order = view::canonical_order(live, self.doc.projects.len());
        let mut next = self.doc.clone();
        next.projects = view::apply_order(&self.doc.projects, &order);
        self.commit(next)
    }

    /// Replace a project's cover. The previous cover blob is deleted.
    pub async fn set_project_cover(&mut self, id: &str, blob: Blob) -> SiteResult<String> {
        let index = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;
        let key = self.store_blob("cover", blob).await?;

        let mut next = self.doc.clone();
        let previous = next.projects[index].cover_key.replace(key.clone());
        self.commit_with_blobs(next, std::slice::from_ref(&key)).await?;

        if let Some(previous) = previous {
            self.discard_blobs(&[previous]).await;
        }
        Ok(key)
    }

    pub async fn add_gallery_images(&mut self, id: &str, blobs: Vec<Blob>) -> SiteResult<Vec<String>> {
        let index = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;

        let mut keys = Vec::with_capacity(blobs.len());
        for blob in blobs {
            match self.store_blob("gallery", blob).await {
                Ok(key) => keys.push(key),
                Err(e) => {
                    self.discard_blobs(&keys).await;
                    return Err(e);
                }
            }
        }

        let mut next = self.doc.clone();
        next.projects[index].gallery_keys.extend(keys.iter().cloned());
        self.commit_with_blobs(next, &keys).await?;
        Ok(keys)
    }

    pub async fn remove_gallery_image(&mut self, id: &str, key: &str) -> SiteResult<()> {
        let index = self
            .doc
            .project_index(id)
            .ok_or(SiteError::NotFound("Project"))?;
        let position = self.doc.projects[index]
            .gallery_keys
            .iter()
            .position(|k| k == key)
            .ok_or(SiteError::NotFound("Gallery image"))?;

        let mut next = self.doc.clone();
        let removed = next.projects[index].gallery_keys.remove(position);
        self.commit(next)?;
        self.discard_blobs(&[removed]).await;
        Ok(())
    }

    // --- Creative posts ---

    /// Store a new post at the front of the list.
    pub async fn create_creative(&mut self, blob: Blob, draft: CreativeDraft) -> SiteResult<String> {
        let kind = MediaKind::from_content_type(&blob.content_type).ok_or_else(|| {
            SiteError::Validation("Please upload an image or video file.".into())
        })?;
        let key = self.store_blob(kind.as_str(), blob).await?;

        let post = draft.apply(CreativePost {
            id: new_id(),
            kind,
            caption: String::new(),
            key: key.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        let id = post.id.clone();

        let mut next = self.doc.clone();
        next.creative.insert(0, post);
        self.commit_with_blobs(next, std::slice::from_ref(&key)).await?;
        tracing::info!(post = %id, kind = kind.as_str(), "Creative post created");
        Ok(id)
    }

    /// Edit a post in place, optionally swapping its media.
    pub async fn update_creative(
        &mut self,
        id: &str,
        draft: CreativeDraft,
        replacement: Option<Blob>,
    ) -> SiteResult<()> {
        let index = self
            .doc
            .creative_index(id)
            .ok_or(SiteError::NotFound("Creative post"))?;
        let mut post = draft.apply(self.doc.creative[index].clone());

        let mut previous = None;
        let mut new_keys = Vec::new();
        if let Some(blob) = replacement {
            let kind = MediaKind::from_content_type(&blob.content_type).ok_or_else(|| {
                SiteError::Validation("Please upload an image or video file.".into())
            })?;
            let key = self.store_blob(kind.as_str(), blob).await?;
            previous = Some(std::mem::replace(&mut post.key, key.clone()));
            post.kind = kind;
            new_keys.push(key);
        }

        let mut next = self.doc.clone();
        next.creative[index] = post;
        self.commit_with_blobs(next, &new_keys).await?;

        if let Some(previous) = previous {
            self.discard_blobs(&[previous]).await;
        }
        Ok(())
    }

    pub async fn delete_creative(&mut self, id: &str) -> SiteResult<CreativePost> {
        let index = self
            .doc
            .creative_index(id)
            .ok_or(SiteError::NotFound("Creative post"))?;
        let post = self.doc.creative[index].clone();

        self.discard_blobs(std::slice::from_ref(&post.key)).await;

        let mut next = self.doc.clone();
        next.creative.remove(index);
        self.commit(next)?;
        Ok(post)
    }

    // --- Demo reel and profile image ---

    /// Replace a slot's media. The previous blob and any published URL for
    /// it are dropped.
    pub async fn set_media(&mut self, slot: MediaSlotName, blob: Blob) -> SiteResult<String> {
        let key = self.store_blob(slot.key_prefix(), blob).await?;

        let mut next = self.doc.clone();
        let previous = std::mem::replace(
            slot.get_mut(&mut next),
            MediaRef {
                key: Some(key.clone()),
                url: None,
            },
        )
        .key;
        self.commit_with_blobs(next, std::slice::from_ref(&key)).await?;

        if let Some(previous) = previous {
            self.discard_blobs(&[previous]).await;
        }
        Ok(key)
    }

    /// Point a media slot at a remote URL (e.g. after publishing).
    pub fn set_media_url(&mut self, slot: MediaSlotName, url: String) -> SiteResult<()> {
        let mut next = self.doc.clone();
        slot.get_mut(&mut next).url = Some(url);
        self.commit(next)
    }

    pub async fn clear_media(&mut self, slot: MediaSlotName) -> SiteResult<()> {
        if slot.get(&self.doc).is_empty() {
            return Ok(());
        }
        let mut next = self.doc.clone();
        let previous = std::mem::take(slot.get_mut(&mut next));
        self.commit(next)?;
        if let Some(key) = previous.key {
            self.discard_blobs(&[key]).await;
        }
        Ok(())
    }

    // --- Skills ---

    /// Set a category's skills from a comma separated list.
    pub fn set_skills(&mut self, category: &str, skills: &str) -> SiteResult<Vec<String>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(SiteError::Validation("Skill category is required.".into()));
        }
        let skills = drafts::split_list(skills);

        let mut next = self.doc.clone();
        next.skills.insert(category.to_string(), skills.clone());
        self.commit(next)?;
        Ok(skills)
    }

    pub fn remove_skill_category(&mut self, category: &str) -> SiteResult<()> {
        if !self.doc.skills.contains_key(category) {
            return Err(SiteError::NotFound("Skill category"));
        }
        let mut next = self.doc.clone();
        next.skills.remove(category);
        self.commit(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::MemoryBlobStore;

    fn open_site() -> (Site, DocumentStore, Arc<MemoryBlobStore>) {
        let pool = db::memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        let documents = DocumentStore::new(pool);
        let blobs = Arc::new(MemoryBlobStore::new());
        let site = Site::open(documents.clone(), blobs.clone()).unwrap();
        (site, documents, blobs)
    }

    fn draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.into(),
            ..ProjectDraft::blank()
        }
    }

    fn png() -> Blob {
        Blob::new("image/png", vec![1u8, 2, 3])
    }

    fn titles(site: &Site) -> Vec<String> {
        site.document()
            .projects
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }

    #[test]
    fn opens_with_starter_document() {
        let (site, documents, _) = open_site();
        assert_eq!(site.document(), &SiteDocument::starter());
        assert!(documents.load().unwrap().is_none());
    }

    #[test]
    fn open_assigns_ids_to_legacy_entries() {
        let pool = db::memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        let documents = DocumentStore::new(pool);
        let mut legacy = SiteDocument::default();
        legacy.projects.push(Project {
            title: "No id".into(),
            ..Project::default()
        });
        documents.save(&legacy).unwrap();

        let site = Site::open(documents.clone(), Arc::new(MemoryBlobStore::new())).unwrap();
        let id = &site.document().projects[0].id;
        assert!(!id.is_empty());
        assert_eq!(&documents.load().unwrap().unwrap().projects[0].id, id);
    }

    #[test]
    fn commit_field_persists_and_updates_bound_text() {
        let (mut site, documents, _) = open_site();
        site.commit_field("personal.name", "  Jane Doe ").unwrap();

        assert_eq!(documents.load().unwrap().unwrap().personal.name, "Jane Doe");
        assert_eq!(
            site.projection().field_text("personal.name"),
            Some("Jane Doe")
        );
    }

    #[test]
    fn commit_field_rejects_bad_paths_without_saving() {
        let (mut site, documents, _) = open_site();
        let err = site.commit_field("personal..name", "x").unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
        assert!(documents.load().unwrap().is_none());
    }

    #[test]
    fn create_update_project() {
        let (mut site, documents, _) = open_site();
        let id = site.create_project(draft("Volcano")).unwrap();
        site.update_project(
            &id,
            ProjectDraft {
                tools: "Maya, Houdini".into(),
                ..draft("Volcano II")
            },
        )
        .unwrap();

        let stored = documents.load().unwrap().unwrap();
        assert_eq!(stored.projects.len(), 1);
        assert_eq!(stored.projects[0].id, id);
        assert_eq!(stored.projects[0].title, "Volcano II");
        assert_eq!(stored.projects[0].tools, vec!["Maya", "Houdini"]);
        assert_eq!(site.projection().projects()[0].title, "Volcano II");
    }

    #[test]
    fn invalid_update_leaves_document_untouched() {
        let (mut site, documents, _) = open_site();
        let id = site.create_project(draft("Keep")).unwrap();
        let before = documents.load().unwrap();

        assert!(site.update_project(&id, draft(" ")).is_err());
        assert_eq!(documents.load().unwrap(), before);
        assert_eq!(titles(&site), vec!["Keep"]);
    }

    #[test]
    fn unknown_project_is_not_found() {
        let (mut site, _, _) = open_site();
        assert!(matches!(
            site.update_project("nope", draft("x")),
            Err(SiteError::NotFound("Project"))
        ));
    }

    #[tokio::test]
    async fn delete_project_removes_entry_and_blobs() {
        let (mut site, documents, blobs) = open_site();
        site.create_project(draft("A")).unwrap();
        let id = site.create_project(draft("B")).unwrap();
        site.create_project(draft("C")).unwrap();

        let cover = site.set_project_cover(&id, png()).await.unwrap();
        let gallery = site
            .add_gallery_images(&id, vec![png(), png()])
            .await
            .unwrap();
        assert_eq!(blobs.len(), 3);

        let removed = site.delete_project(&id).await.unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(titles(&site), vec!["A", "C"]);
        assert_eq!(documents.load().unwrap().unwrap().projects.len(), 2);

        for key in std::iter::once(cover).chain(gallery) {
            assert!(blobs.get(&key).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn replacing_cover_deletes_previous_blob() {
        let (mut site, _, blobs) = open_site();
        let id = site.create_project(draft("A")).unwrap();
        let first = site.set_project_cover(&id, png()).await.unwrap();
        let second = site.set_project_cover(&id, png()).await.unwrap();

        assert!(blobs.get(&first).await.unwrap().is_none());
        assert!(blobs.get(&second).await.unwrap().is_some());
        assert_eq!(
            site.document().projects[0].cover_key.as_deref(),
            Some(second.as_str())
        );
    }

    #[tokio::test]
    async fn removing_one_gallery_image() {
        let (mut site, _, blobs) = open_site();
        let id = site.create_project(draft("A")).unwrap();
        let keys = site
            .add_gallery_images(&id, vec![png(), png()])
            .await
            .unwrap();

        site.remove_gallery_image(&id, &keys[0]).await.unwrap();
        assert_eq!(site.document().projects[0].gallery_keys, vec![keys[1].clone()]);
        assert_eq!(blobs.len(), 1);
        assert!(matches!(
            site.remove_gallery_image(&id, "missing").await,
            Err(SiteError::NotFound(_))
        ));
    }

    #[test]
    fn move_project_to_front_middle_end() {
        for (to, expected) in [
            (0, vec!["C", "A", "B"]),
            (1, vec!["A", "C", "B"]),
            (2, vec!["A", "B", "C"]),
        ] {
            let (mut site, documents, _) = open_site();
            for title in ["A", "B", "C"] {
                site.create_project(draft(title)).unwrap();
            }
            let id = site.document().projects[2].id.clone();
            site.move_project(&id, to).unwrap();
            assert_eq!(titles(&site), expected);
            let stored: Vec<String> = documents
                .load()
                .unwrap()
                .unwrap()
                .projects
                .into_iter()
                .map(|p| p.title)
                .collect();
            assert_eq!(stored, expected);
        }
    }

    #[test]
    fn drop_project_uses_card_midpoints() {
        let (mut site, _, _) = open_site();
        for title in ["A", "B", "C"] {
            site.create_project(draft(title)).unwrap();
        }
        let spans: Vec<Span> = (0..3)
            .map(|i| Span {
                top: i as f64 * 100.0,
                height: 100.0,
            })
            .collect();

        let a = site.document().projects[0].id.clone();
        site.drop_project(&a, 290.0, &spans).unwrap();
        assert_eq!(titles(&site), vec!["B", "C", "A"]);
        assert_eq!(site.projection().live_order(), vec![0, 1, 2]);

        let err = site.drop_project(&a, 0.0, &spans[..2]).unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn reorder_from_page_ids_dedupes_and_keeps_all() {
        let (mut site, _, _) = open_site();
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|t| site.create_project(draft(t)).unwrap())
            .collect();

        site.reorder_projects(&[
            ids[1].clone(),
            ids[1].clone(),
            "unknown".into(),
            ids[0].clone(),
        ])
        .unwrap();
        assert_eq!(titles(&site), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn creative_posts_are_prepended() {
        let (mut site, _, _) = open_site();
        let first = site
            .create_creative(png(), CreativeDraft { caption: "one".into() })
            .await
            .unwrap();
        let second = site
            .create_creative(
                Blob::new("video/mp4", vec![0u8; 4]),
                CreativeDraft { caption: "two".into() },
            )
            .await
            .unwrap();

        let posts = &site.document().creative;
        assert_eq!(posts[0].id, second);
        assert_eq!(posts[0].kind, MediaKind::Video);
        assert_eq!(posts[1].id, first);
        assert_eq!(posts[1].kind, MediaKind::Image);
    }

    #[tokio::test]
    async fn creative_rejects_non_media() {
        let (mut site, _, blobs) = open_site();
        let err = site
            .create_creative(
                Blob::new("application/pdf", vec![1u8]),
                CreativeDraft::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn update_creative_replaces_media_and_caption() {
        let (mut site, _, blobs) = open_site();
        let id = site
            .create_creative(png(), CreativeDraft { caption: "one".into() })
            .await
            .unwrap();
        let old_key = site.document().creative[0].key.clone();

        site.update_creative(
            &id,
            CreativeDraft { caption: "edited".into() },
            Some(Blob::new("video/webm", vec![5u8])),
        )
        .await
        .unwrap();

        let post = &site.document().creative[0];
        assert_eq!(post.caption, "edited");
        assert_eq!(post.kind, MediaKind::Video);
        assert_ne!(post.key, old_key);
        assert!(blobs.get(&old_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_creative_removes_blob() {
        let (mut site, _, blobs) = open_site();
        let id = site
            .create_creative(png(), CreativeDraft::default())
            .await
            .unwrap();
        site.delete_creative(&id).await.unwrap();
        assert!(site.document().creative.is_empty());
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn demo_video_replace_and_clear() {
        let (mut site, _, blobs) = open_site();
        let first = site
            .set_media(MediaSlotName::DemoVideo, Blob::new("video/mp4", vec![1u8]))
            .await
            .unwrap();
        let second = site
            .set_media(MediaSlotName::DemoVideo, Blob::new("video/mp4", vec![2u8]))
            .await
            .unwrap();
        assert!(blobs.get(&first).await.unwrap().is_none());
        assert_eq!(
            site.document().media.demo_video.key.as_deref(),
            Some(second.as_str())
        );

        site.clear_media(MediaSlotName::DemoVideo).await.unwrap();
        assert!(site.document().media.demo_video.is_empty());
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn replacing_published_media_drops_its_url() {
        let (mut site, store, _) = open_site();
        site.set_media(MediaSlotName::DemoVideo, Blob::new("video/mp4", vec![1u8]))
            .await
            .unwrap();
        site.set_media_url(MediaSlotName::DemoVideo, "https://cdn.example.com/old.mp4".into())
            .unwrap();

        let key = site
            .set_media(MediaSlotName::DemoVideo, Blob::new("video/mp4", vec![2u8]))
            .await
            .unwrap();
        let demo = &site.document().media.demo_video;
        assert_eq!(demo.key.as_deref(), Some(key.as_str()));
        assert!(demo.url.is_none());
        assert!(store.load().unwrap().unwrap().media.demo_video.url.is_none());
    }

    #[test]
    fn skills_set_and_remove() {
        let (mut site, _, _) = open_site();
        let skills = site.set_skills("3D", "Maya, Houdini, ").unwrap();
        assert_eq!(skills, vec!["Maya", "Houdini"]);
        assert_eq!(site.projection().skills().len(), 2);

        site.remove_skill_category("3D").unwrap();
        assert!(!site.document().skills.contains_key("3D"));
        assert!(site.remove_skill_category("3D").is_err());
        assert!(site.set_skills("  ", "x").is_err());
    }

    #[test]
    fn edit_mode_toggles() {
        let (mut site, _, _) = open_site();
        assert!(!site.edit_mode());
        assert!(site.toggle_edit_mode());
        assert!(!site.toggle_edit_mode());
    }
}
