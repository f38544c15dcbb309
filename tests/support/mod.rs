//! Shared fixtures for tests that talk to a fake WebUI daemon.

#![allow(dead_code)]

use url::Url;
use utorrent_webapi::ConnectionParams;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GUI_PATH: &str = "/gui/";
pub const TOKEN_PAGE: &str = "/gui/token.html";
pub const GUID: &str = "abc123";
pub const OK_BODY: &str = r#"{"build":30303}"#;

/// A 19-field row the daemon reports for a started torrent.
pub const ROW_UBUNTU: &str =
    r#"["AAAA",201,"ubuntu.iso",1000,500,500,250,500,10,20,60,"linux",1,5,2,9,65536,1,500]"#;
pub const ROW_DEBIAN: &str =
    r#"["BBBB",136,"debian.iso",2000,1000,2000,0,0,0,0,0,"",0,0,0,0,0,0,0]"#;

/// Handshake body wrapping `token` the way `token.html` does.
#[must_use]
pub fn token_page(token: &str) -> String {
    format!("<html><div id='token' style='display:none;'>{token}</div></html>")
}

/// Full list snapshot carrying `rows` and cache id `cid`.
#[must_use]
pub fn list_body(rows: &[&str], cid: &str) -> String {
    format!(
        r#"{{"build":30303,"label":[],"torrents":[{}],"torrentc":"{cid}"}}"#,
        rows.join(",")
    )
}

/// Successful response carrying a full list snapshot.
#[must_use]
pub fn list_response(rows: &[&str], cid: &str) -> ResponseTemplate {
    let body = list_body(rows, cid);
    ResponseTemplate::new(200).set_body_string(body)
}

/// Handshake response for `token` that sets the session cookie.
#[must_use]
pub fn handshake(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Set-Cookie", format!("GUID={GUID}; path=/").as_str())
        .set_body_string(token_page(token))
}

/// Mounts a handshake endpoint that always hands out `token`.
pub async fn mount_handshake(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PAGE))
        .respond_with(handshake(token))
        .mount(server)
        .await;
}

/// Connection parameters pointing at the mock server.
#[must_use]
pub fn params_for(server: &MockServer) -> ConnectionParams {
    let (host, port) = host_port(server);
    ConnectionParams::new(host, port)
}

/// Host and port of the mock server.
#[must_use]
pub fn host_port(server: &MockServer) -> (String, u16) {
    let uri = Url::parse(&server.uri()).expect("mock server URI is valid");
    let host = uri
        .host_str()
        .expect("mock server URI has a host")
        .to_string();
    let port = uri.port().expect("mock server URI has a port");
    (host, port)
}
