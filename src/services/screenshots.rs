//! Screenshot Store
//!
//! Read access to the main and extra (debug) screenshot queues. Capture and
//! deletion belong to the host; the queue mutators here exist so the host can
//! feed the store.
//!
//! A batch is loaded with all existence checks and reads in flight at once.
//! Unreadable entries are dropped from the batch instead of failing it.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::future::join_all;
use interview_assist_llm::ImageData;
use tracing::{debug, warn};

use crate::utils::error::{AppError, AppResult};

/// Accepted screenshot extensions and the MIME type sent for each
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// Read-only view of the screenshot queues
#[async_trait]
pub trait ScreenshotStore: Send + Sync {
    /// Paths of the main (problem) queue, in capture order
    fn queue(&self) -> Vec<PathBuf>;

    /// Paths of the extra (debug) queue, in capture order
    fn extra_queue(&self) -> Vec<PathBuf>;

    async fn exists(&self, path: &Path) -> bool;

    /// File contents, base64-encoded
    async fn image_base64(&self, path: &Path) -> AppResult<String>;
}

/// A screenshot ready to attach to a vision request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedScreenshot {
    pub path: PathBuf,
    pub media_type: &'static str,
    pub data: String,
}

impl LoadedScreenshot {
    pub fn into_image(self) -> ImageData {
        ImageData::new(self.media_type, self.data)
    }
}

/// Screenshots on the local filesystem
#[derive(Debug, Default)]
pub struct FileScreenshotStore {
    queue: RwLock<Vec<PathBuf>>,
    extra: RwLock<Vec<PathBuf>>,
}

impl FileScreenshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose main queue is `paths`
    pub fn with_queue(paths: Vec<PathBuf>) -> Self {
        Self {
            queue: RwLock::new(paths),
            extra: RwLock::new(Vec::new()),
        }
    }

    /// Build both queues from the image files in two directories.
    ///
    /// A missing directory yields an empty queue.
    pub async fn from_dirs(main_dir: &Path, extra_dir: &Path) -> AppResult<Self> {
        Ok(Self {
            queue: RwLock::new(scan_dir(main_dir).await?),
            extra: RwLock::new(scan_dir(extra_dir).await?),
        })
    }

    pub fn enqueue(&self, path: PathBuf) {
        if let Ok(mut queue) = self.queue.write() {
            queue.push(path);
        }
    }

    pub fn enqueue_extra(&self, path: PathBuf) {
        if let Ok(mut extra) = self.extra.write() {
            extra.push(path);
        }
    }

    pub fn clear_queue(&self) {
        if let Ok(mut queue) = self.queue.write() {
            queue.clear();
        }
    }

    pub fn clear_extra_queue(&self) {
        if let Ok(mut extra) = self.extra.write() {
            extra.clear();
        }
    }
}

#[async_trait]
impl ScreenshotStore for FileScreenshotStore {
    fn queue(&self) -> Vec<PathBuf> {
        self.queue.read().map(|q| q.clone()).unwrap_or_default()
    }

    fn extra_queue(&self) -> Vec<PathBuf> {
        self.extra.read().map(|q| q.clone()).unwrap_or_default()
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn image_base64(&self, path: &Path) -> AppResult<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(STANDARD.encode(bytes))
    }
}

/// MIME type for a screenshot path, `None` for non-image files
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, media_type)| *media_type)
}

/// Image files directly inside `dir`, sorted by file name
async fn scan_dir(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if media_type_for(&path).is_some() {
            paths.push(path);
        }
    }
    paths.sort();
    debug!(dir = %dir.display(), count = paths.len(), "scanned screenshot directory");
    Ok(paths)
}

async fn load_one(store: &dyn ScreenshotStore, path: &Path) -> Option<LoadedScreenshot> {
    if !store.exists(path).await {
        warn!(path = %path.display(), "screenshot missing, skipping");
        return None;
    }
    // Host-queued paths are not pre-filtered
    let Some(media_type) = media_type_for(path) else {
        warn!(path = %path.display(), "not a supported image type, skipping");
        return None;
    };
    match store.image_base64(path).await {
        Ok(data) => Some(LoadedScreenshot {
            path: path.to_path_buf(),
            media_type,
            data,
        }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "screenshot unreadable, skipping");
            None
        }
    }
}

/// Load `paths` concurrently, keeping order and dropping failures.
///
/// Fails with [`AppError::NoValidScreenshots`] only when nothing survives.
pub async fn load_batch(
    store: &dyn ScreenshotStore,
    paths: &[PathBuf],
) -> AppResult<Vec<LoadedScreenshot>> {
    let loaded: Vec<LoadedScreenshot> = join_all(paths.iter().map(|path| load_one(store, path)))
        .await
        .into_iter()
        .flatten()
        .collect();

    debug!(requested = paths.len(), loaded = loaded.len(), "loaded screenshot batch");
    if loaded.is_empty() {
        return Err(AppError::no_valid_screenshots());
    }
    Ok(loaded)
}
