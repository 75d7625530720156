#![allow(dead_code)]

pub mod stub_server;

use taleweaver_drive::{AuthorizedUser, DriveClient};

pub use stub_server::{CannedResponse, StubServer};

/// Token response the stub hands out for refreshes.
pub fn token_response() -> CannedResponse {
    CannedResponse::json(200, r#"{"access_token": "tok-1", "expires_in": 3600, "token_type": "Bearer"}"#)
}

/// Credentials whose token endpoint is the stub server.
pub fn user_for(server: &StubServer) -> AuthorizedUser {
    AuthorizedUser::from_json(&format!(
        r#"{{"client_id": "cid", "client_secret": "csecret", "refresh_token": "rtok", "token_uri": "{}/token"}}"#,
        server.base_url
    ))
    .unwrap()
}

pub fn client_for(server: &StubServer) -> DriveClient {
    DriveClient::new(user_for(server), server.base_url.clone()).unwrap()
}

/// Start and finish of a resumable upload returning `id`.
pub fn upload_responses(session: &str, id: &str) -> [CannedResponse; 2] {
    [
        CannedResponse::json(200, "").with_header("location", format!("/upload/session/{}", session)),
        CannedResponse::json(200, format!(r#"{{"id": "{}"}}"#, id)),
    ]
}
