use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::site::{Site, SiteResult};
use crate::store::{BlobStore, DocumentStore, SqliteBlobStore};
use crate::upload::{CloudUploader, ProgressTracker};
use crate::view;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub site: Arc<Mutex<Site>>,
    pub progress: ProgressTracker,
    pub cloud: Arc<CloudUploader>,
}

impl AppState {
    /// Open the site on top of `db`, which must already be migrated.
    pub fn build(db: DbPool, config: Config) -> SiteResult<Self> {
        let blobs: Arc<dyn BlobStore> = Arc::new(SqliteBlobStore::new(db.clone()));
        let site = Site::open(DocumentStore::new(db.clone()), blobs)?;
        let cloud = CloudUploader::new(&config.cloud);
        if !cloud.is_configured() {
            tracing::info!("Cloud publishing disabled (no endpoint/token configured)");
        }

        Ok(Self {
            db,
            config,
            site: Arc::new(Mutex::new(site)),
            progress: ProgressTracker::new(),
            cloud: Arc::new(cloud),
        })
    }

    /// Resolve every pending media slot of the current projection.
    ///
    /// Lookups run without holding the site lock. Results from a projection
    /// that was replaced in the meantime are dropped by `Projection::apply`.
    pub async fn refresh_media(&self) -> usize {
        let (tasks, blobs) = {
            let site = self.site.lock().await;
            (site.projection().pending(), site.blobs())
        };
        if tasks.is_empty() {
            return 0;
        }
        let results = view::resolve_all(blobs.as_ref(), tasks).await;
        let mut site = self.site.lock().await;
        site.projection_mut().apply(results)
    }
}
