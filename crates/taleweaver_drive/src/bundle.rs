//! Publishing a finished run: video, thumbnail and metadata in one folder.

use crate::client::DriveClient;
use std::path::Path;
use taleweaver_core::{UploadReceipt, VideoMetadata};
use taleweaver_error::{JsonError, TaleweaverResult};
use tracing::{info, instrument, warn};

/// Name given to the uploaded video.
pub const VIDEO_UPLOAD_NAME: &str = "story_video.mp4";
/// Name given to the uploaded thumbnail.
pub const THUMBNAIL_UPLOAD_NAME: &str = "thumbnail.jpg";
/// Name given to the uploaded metadata.
pub const METADATA_UPLOAD_NAME: &str = "metadata.json";

/// Folder for a run: the title, or `default_folder` when it is blank.
pub fn folder_name<'a>(metadata: Option<&'a VideoMetadata>, default_folder: &'a str) -> &'a str {
    metadata
        .map(|m| m.title.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(default_folder)
}

impl DriveClient {
    /// Create a folder and upload the video, thumbnail and metadata into it.
    ///
    /// The video must upload; thumbnail and metadata failures are logged and
    /// left out of the receipt.
    #[instrument(skip_all, fields(video = %video.display()))]
    pub async fn upload_video_bundle(
        &self,
        video: &Path,
        metadata: Option<&VideoMetadata>,
        thumbnail: Option<&Path>,
        default_folder: &str,
    ) -> TaleweaverResult<UploadReceipt> {
        let folder = folder_name(metadata, default_folder);
        let folder_id = self.create_folder(folder, None).await?;

        let uploaded = self
            .upload_file(video, VIDEO_UPLOAD_NAME, "video/mp4", Some(folder_id.as_str()))
            .await?;

        let mut thumbnail_id = None;
        if let Some(path) = thumbnail {
            match self
                .upload_file(path, THUMBNAIL_UPLOAD_NAME, "image/jpeg", Some(folder_id.as_str()))
                .await
            {
                Ok(file) => thumbnail_id = Some(file.id),
                Err(e) => warn!(error = %e, "Thumbnail upload failed"),
            }
        }

        let mut metadata_id = None;
        if let Some(meta) = metadata {
            match self.upload_metadata(meta, &folder_id).await {
                Ok(id) => metadata_id = Some(id),
                Err(e) => warn!(error = %e, "Metadata upload failed"),
            }
        }

        info!(folder = %folder, folder_id = %folder_id, video_id = %uploaded.id, "Published run to Drive");
        Ok(UploadReceipt::new(
            folder_id,
            uploaded.id,
            uploaded.web_content_link,
            metadata_id,
            thumbnail_id,
        ))
    }

    async fn upload_metadata(&self, meta: &VideoMetadata, folder_id: &str) -> TaleweaverResult<String> {
        let json = serde_json::to_string_pretty(meta).map_err(|e| JsonError::new(METADATA_UPLOAD_NAME, e))?;
        let file = self
            .upload_text(&json, METADATA_UPLOAD_NAME, Some(folder_id))
            .await?;
        Ok(file.id)
    }
}
