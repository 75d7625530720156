//! Google Drive publishing for Taleweaver.
//!
//! Authenticates with an authorized-user token file, refreshing access
//! tokens as needed, and uploads finished videos together with their
//! thumbnail and metadata through the Drive v3 REST API.

#![warn(missing_docs)]

mod bundle;
mod client;
mod credentials;

pub use bundle::{METADATA_UPLOAD_NAME, THUMBNAIL_UPLOAD_NAME, VIDEO_UPLOAD_NAME, folder_name};
pub use client::{
    DEFAULT_DOWNLOAD_BASE, DriveClient, DriveFile, FOLDER_MIME, PROBE_FOLDER_NAME,
    download_shared_file, text_mime,
};
pub use credentials::{AccessToken, AuthorizedUser, DEFAULT_TOKEN_URI, TokenSource};
