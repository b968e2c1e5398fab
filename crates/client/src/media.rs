//! Profile image capture and upload.
//!
//! The pipeline is pick, normalize, upload, resolve the durable URL, merge
//! it into the profile record. Each step runs to completion before the
//! next starts; a merge failure after a successful upload deletes the
//! uploaded blob so no orphan remains, and the caller sees the failure as
//! if nothing happened.
//!
//! Picking and normalizing are platform concerns (camera roll, image
//! codec) behind [`ImageSource`]; this crate only fixes the parameters
//! they must honor.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use hidden_fork_core::{AccountId, AccountKind};

use crate::backend::storage::profile_image_path;
use crate::error::Result;
use crate::state::AppState;

/// Longest edge of an uploaded profile image, in pixels.
pub const MAX_IMAGE_WIDTH: u32 = 1024;

/// JPEG quality factor applied during normalization.
pub const JPEG_QUALITY: f32 = 0.7;

/// An image chosen by the user, before normalization.
#[derive(Debug, Clone)]
pub struct PickedImage {
    /// Raw bytes as the platform handed them over.
    pub bytes: Vec<u8>,
    /// MIME type reported by the platform.
    pub content_type: String,
}

/// A normalized image ready for upload.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Encoded bytes, at most [`MAX_IMAGE_WIDTH`] wide, compressed with
    /// [`JPEG_QUALITY`].
    pub bytes: Vec<u8>,
    /// MIME type of the encoded bytes.
    pub content_type: String,
}

/// Platform seam for picking and normalizing images.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Let the user pick an image. `None` means they cancelled, which ends
    /// the flow without an error.
    async fn pick(&self) -> Result<Option<PickedImage>>;

    /// Downscale to [`MAX_IMAGE_WIDTH`] and re-encode at [`JPEG_QUALITY`].
    ///
    /// # Errors
    ///
    /// Implementations surface decode failures through [`crate::AppError`].
    async fn normalize(&self, image: PickedImage) -> Result<NormalizedImage>;
}

/// Outcome of the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The user cancelled the picker; nothing changed.
    Cancelled,
    /// The image is uploaded and its URL is merged into the profile.
    Updated {
        /// Durable URL now stored on the profile.
        url: String,
    },
}

/// Profile image upload flow.
#[derive(Clone)]
pub struct MediaService {
    state: AppState,
}

impl MediaService {
    /// Create the service over shared state.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run the full pick-normalize-upload-merge flow for a profile image.
    ///
    /// On a merge failure the uploaded blob is deleted before the error is
    /// returned; the stored profile keeps whatever image URL it had. A
    /// failure of the compensating delete itself is logged and swallowed -
    /// the original merge error is the one the caller needs.
    ///
    /// # Errors
    ///
    /// [`crate::AppError::Store`] from any step of the pipeline; picker
    /// cancellation is [`UploadOutcome::Cancelled`], not an error.
    #[instrument(skip(self, source), fields(account_id = %account_id, kind = %kind))]
    pub async fn set_profile_image(
        &self,
        kind: AccountKind,
        account_id: &AccountId,
        source: &dyn ImageSource,
    ) -> Result<UploadOutcome> {
        let Some(picked) = source.pick().await? else {
            return Ok(UploadOutcome::Cancelled);
        };
        let normalized = source.normalize(picked).await?;

        let path = profile_image_path(account_id);
        let blobs = self.state.blobs();
        blobs
            .upload(&path, normalized.bytes, &normalized.content_type)
            .await?;
        let url = blobs.download_url(&path).await?;

        let mut patch = Map::new();
        patch.insert("profileImageUrl".to_string(), Value::String(url.clone()));
        let merged = self
            .state
            .documents()
            .merge(kind.collection(), account_id.as_str(), patch)
            .await;

        if let Err(merge_err) = merged {
            error!(error = %merge_err, "profile merge failed after upload; deleting blob");
            if let Err(delete_err) = blobs.delete(&path).await {
                warn!(error = %delete_err, "compensating delete failed; blob may be orphaned");
            }
            return Err(merge_err.into());
        }

        info!(%url, "profile image updated");
        Ok(UploadOutcome::Updated { url })
    }
}
