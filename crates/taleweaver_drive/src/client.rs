//! Drive v3 REST client.

use crate::credentials::{AuthorizedUser, TokenSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use taleweaver_config::DriveConfig;
use taleweaver_error::{DriveError, DriveErrorKind, TaleweaverResult};
use tracing::{debug, info, instrument, warn};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Host serving public download links.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://drive.google.com";

/// Name of the folder created and removed by [`DriveClient::check_access`].
pub const PROBE_FOLDER_NAME: &str = "Test Folder - Delete Me";

const REQUEST_TIMEOUT_SECS: u64 = 600;

/// A file or folder as reported by Drive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File id
    pub id: String,
    /// Display name, when requested
    #[serde(default)]
    pub name: Option<String>,
    /// Direct download link, when requested
    #[serde(default)]
    pub web_content_link: Option<String>,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

fn request_error(e: reqwest::Error) -> DriveError {
    DriveError::new(DriveErrorKind::Request(e.to_string()))
}

fn upload_error(name: &str, message: impl Into<String>) -> DriveError {
    DriveError::new(DriveErrorKind::Upload {
        name: name.to_string(),
        message: message.into(),
    })
}

/// Body text of a successful response, or an API error.
async fn checked_body(response: reqwest::Response) -> Result<String, DriveError> {
    let status = response.status();
    let body = response.text().await.map_err(request_error)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(DriveError::new(DriveErrorKind::Api {
            status_code: status.as_u16(),
            message: body,
        }))
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, DriveError> {
    serde_json::from_str(body).map_err(|e| {
        DriveError::new(DriveErrorKind::Request(format!(
            "unexpected Drive response: {}",
            e
        )))
    })
}

/// Absolute session URL from a `Location` header.
fn resolve_location(api_base: &str, location: &str) -> String {
    if location.starts_with('/') {
        format!("{}{}", api_base.trim_end_matches('/'), location)
    } else {
        location.to_string()
    }
}

/// MIME type used for text uploads, by file extension.
pub fn text_mime(name: &str) -> &'static str {
    if name.ends_with(".json") {
        "application/json"
    } else {
        "text/plain"
    }
}

/// Download a publicly shared Drive file to `dest`.
///
/// Large files answer the first request with a confirmation cookie; the
/// download is repeated with that token when present.
#[instrument(skip(http, dest), fields(dest = %dest.display()))]
pub async fn download_shared_file(
    http: &reqwest::Client,
    download_base: &str,
    file_id: &str,
    dest: &Path,
) -> TaleweaverResult<()> {
    let url = format!("{}/uc", download_base.trim_end_matches('/'));
    let response = http
        .get(&url)
        .query(&[("id", file_id), ("export", "download")])
        .send()
        .await
        .map_err(request_error)?;

    let confirm = response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let (name, value) = cookie.split(';').next()?.split_once('=')?;
            name.trim()
                .starts_with("download_warning")
                .then(|| value.trim().to_string())
        });

    let response = match confirm {
        Some(token) => {
            debug!("Confirming large-file download");
            http.get(&url)
                .query(&[("id", file_id), ("export", "download"), ("confirm", token.as_str())])
                .send()
                .await
                .map_err(request_error)?
        }
        None => response,
    };

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DriveError::new(DriveErrorKind::Api {
            status_code: status.as_u16(),
            message,
        })
        .into());
    }
    let bytes = response.bytes().await.map_err(request_error)?;
    tokio::fs::write(dest, &bytes).await.map_err(|e| {
        DriveError::new(DriveErrorKind::Credentials(format!(
            "cannot write {}: {}",
            dest.display(),
            e
        )))
    })?;
    info!(bytes = bytes.len(), "Downloaded shared file");
    Ok(())
}

/// Authenticated Drive client.
pub struct DriveClient {
    http: reqwest::Client,
    api_base: String,
    auth: TokenSource,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    /// Client for `api_base` acting as `user`.
    pub fn new(user: AuthorizedUser, api_base: impl Into<String>) -> TaleweaverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(request_error)?;
        Ok(Self {
            auth: TokenSource::new(http.clone(), user),
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client from configuration, fetching the token file first if it is
    /// missing and a shared copy is configured.
    pub async fn from_config(config: &DriveConfig) -> TaleweaverResult<Self> {
        if !config.token_path.exists() {
            match config.token_file_id() {
                Some(file_id) => {
                    info!(path = %config.token_path.display(), "Token file missing, downloading shared copy");
                    let http = reqwest::Client::new();
                    download_shared_file(&http, DEFAULT_DOWNLOAD_BASE, file_id, &config.token_path)
                        .await?;
                }
                None => {
                    return Err(DriveError::new(DriveErrorKind::Credentials(format!(
                        "{} not found and no shared token file configured",
                        config.token_path.display()
                    )))
                    .into());
                }
            }
        }
        let user = AuthorizedUser::load(&config.token_path).await?;
        Self::new(user, config.api_base.as_str())
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base)
    }

    async fn bearer(&self) -> TaleweaverResult<String> {
        Ok(format!("Bearer {}", self.auth.access_token().await?))
    }

    /// Create a folder, optionally inside `parent`, returning its id.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str, parent: Option<&str>) -> TaleweaverResult<String> {
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME),
            parents: parent.into_iter().collect(),
        };
        let response = self
            .http
            .post(self.files_url())
            .query(&[("fields", "id")])
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .json(&metadata)
            .send()
            .await
            .map_err(request_error)?;
        let folder: DriveFile = parse_body(&checked_body(response).await?)?;
        info!(folder_id = %folder.id, "Created Drive folder");
        Ok(folder.id)
    }

    /// Upload bytes with a resumable session.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_bytes(
        &self,
        name: &str,
        mime: &str,
        bytes: Vec<u8>,
        parent: Option<&str>,
    ) -> TaleweaverResult<DriveFile> {
        let metadata = FileMetadata {
            name,
            mime_type: None,
            parents: parent.into_iter().collect(),
        };
        let bearer = self.bearer().await?;
        let start = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.api_base))
            .query(&[("uploadType", "resumable"), ("fields", "id,webContentLink")])
            .header(reqwest::header::AUTHORIZATION, &bearer)
            .header("X-Upload-Content-Type", mime)
            .header("X-Upload-Content-Length", bytes.len().to_string())
            .json(&metadata)
            .send()
            .await
            .map_err(request_error)?;

        let status = start.status();
        let location = start
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|l| resolve_location(&self.api_base, l));
        if !status.is_success() {
            let message = start.text().await.unwrap_or_default();
            return Err(DriveError::new(DriveErrorKind::Api {
                status_code: status.as_u16(),
                message,
            })
            .into());
        }
        let Some(session) = location else {
            return Err(upload_error(name, "no upload session location returned").into());
        };
        debug!(session = %session, "Started resumable upload");

        let response = self
            .http
            .put(&session)
            .header(reqwest::header::AUTHORIZATION, &bearer)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;
        let file: DriveFile = parse_body(&checked_body(response).await?)?;
        info!(file_id = %file.id, "Uploaded file");
        Ok(file)
    }

    /// Upload a local file under `name`.
    pub async fn upload_file(
        &self,
        path: &Path,
        name: &str,
        mime: &str,
        parent: Option<&str>,
    ) -> TaleweaverResult<DriveFile> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| upload_error(name, format!("{}: {}", path.display(), e)))?;
        self.upload_bytes(name, mime, bytes, parent).await
    }

    /// Upload text content as a file.
    pub async fn upload_text(
        &self,
        content: &str,
        name: &str,
        parent: Option<&str>,
    ) -> TaleweaverResult<DriveFile> {
        self.upload_bytes(name, text_mime(name), content.as_bytes().to_vec(), parent)
            .await
    }

    /// Delete a file or folder.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> TaleweaverResult<()> {
        let response = self
            .http
            .delete(format!("{}/{}", self.files_url(), file_id))
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await
            .map_err(request_error)?;
        checked_body(response).await?;
        Ok(())
    }

    /// First `page_size` files visible to the user.
    pub async fn list_files(&self, page_size: u32) -> TaleweaverResult<Vec<DriveFile>> {
        let response = self
            .http
            .get(self.files_url())
            .query(&[
                ("pageSize", page_size.to_string()),
                ("fields", "nextPageToken, files(id, name)".to_string()),
            ])
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await
            .map_err(request_error)?;
        let list: FileList = parse_body(&checked_body(response).await?)?;
        Ok(list.files)
    }

    /// Verify read and write access by listing files, then creating and
    /// deleting a probe folder. Returns the number of files listed.
    #[instrument(skip(self))]
    pub async fn check_access(&self) -> TaleweaverResult<usize> {
        let files = self.list_files(10).await?;
        for file in &files {
            debug!(id = %file.id, name = file.name.as_deref().unwrap_or(""), "Visible file");
        }
        let probe = self.create_folder(PROBE_FOLDER_NAME, None).await?;
        if let Err(e) = self.delete_file(&probe).await {
            warn!(error = %e, folder_id = %probe, "Could not remove probe folder");
            return Err(e);
        }
        info!(files = files.len(), "Drive access verified");
        Ok(files.len())
    }
}
