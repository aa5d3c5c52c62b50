//! Review persistence backed by a single JSON file holding an array of
//! reviews.
//!
//! The file is read once on [`ReviewStore::open`]; every append rewrites it
//! whole through a sibling temp file and a rename. Appends are serialized by
//! an async mutex, so concurrent requests never interleave writes.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use idmap_core::{CoreError, NewReview, Review, ReviewFilter};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("review store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("review store at {path} is not a JSON array of reviews: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid review: {0}")]
    Validation(#[from] CoreError),
}

#[derive(Debug)]
pub struct ReviewStore {
    path: PathBuf,
    reviews: Mutex<Vec<Review>>,
}

impl ReviewStore {
    /// Loads the store at `path`. A missing file is an empty store; it is
    /// created on the first append. Files written by the earlier service
    /// (integer ids, extra fields) load as-is.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] if the file exists but cannot be read.
    /// - [`StoreError::Json`] if it does not hold a JSON array of reviews.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let reviews = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(path = %path.display(), count = reviews.len(), "review store opened");
        Ok(Self {
            path,
            reviews: Mutex::new(reviews),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All reviews, oldest first.
    pub async fn list(&self) -> Vec<Review> {
        self.reviews.lock().await.clone()
    }

    /// Reviews matching `filter`, oldest first.
    pub async fn list_filtered(&self, filter: &ReviewFilter) -> Vec<Review> {
        if filter.is_empty() {
            return self.list().await;
        }
        self.reviews
            .lock()
            .await
            .iter()
            .filter(|review| filter.matches(review))
            .cloned()
            .collect()
    }

    /// Validates `new`, stamps it with a fresh id and the current time, and
    /// persists it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if the review fails validation; nothing
    ///   is written.
    /// - [`StoreError::Io`] / [`StoreError::Json`] if persisting fails; the
    ///   in-memory list is left unchanged.
    pub async fn append(&self, new: NewReview) -> Result<Review, StoreError> {
        new.validate()?;
        let review = Review::from_new(new, Utc::now());

        let mut reviews = self.reviews.lock().await;
        reviews.push(review.clone());
        if let Err(err) = self.persist(&reviews).await {
            reviews.pop();
            tracing::error!(path = %self.path.display(), error = %err, "failed to save review");
            return Err(err);
        }

        tracing::info!(id = %review.id, place = %review.body.place_name, "review saved");
        Ok(review)
    }

    async fn persist(&self, reviews: &[Review]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(reviews).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(io_err)
    }
}
