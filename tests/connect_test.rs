//! Connection and drive-resolution contract tests against a mock authority
//! and Graph server.

use mockito::Server;
use sp_drive::{connect, ConnectConfig, ConnectOptions, Error};

fn mocked_config(server_url: &str, tenant: &str, app_id: &str, site_url: &str) -> ConnectConfig {
    ConnectConfig::new(site_url, tenant, app_id).with_options(ConnectOptions {
        authority_host: Some(server_url.to_string()),
        graph_base: Some(server_url.to_string()),
        scopes: None,
    })
}

#[tokio::test]
async fn connect_requires_site_url() {
    let config = ConnectConfig::new("", "contoso.onmicrosoft.com", "app-1");
    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn connect_requires_tenant() {
    let config = ConnectConfig::new("https://x.sharepoint.com/sites/a", "", "abc");
    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn connect_requires_app_id() {
    let config = ConnectConfig::new("https://x.sharepoint.com/sites/a", "tenant", "");
    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn connect_rejects_scope_override() {
    let mut config = ConnectConfig::new("https://x.sharepoint.com/sites/a", "tenant", "abc");
    config.options.scopes = Some(vec!["Files.ReadWrite.All".to_string()]);
    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::SecurityPolicy(_)));
}

#[tokio::test]
async fn connect_rejects_malformed_site_url() {
    let config = ConnectConfig::new("x.sharepoint.com/sites/a", "tenant", "abc");
    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn connect_resolves_site_and_reuses_the_session() {
    let mut server = Server::new_async().await;

    // The interactive exchange must run exactly once for the process-wide
    // session; the second connect below reuses the cached token.
    let device = server
        .mock("POST", "/tenant-a/oauth2/v2.0/devicecode")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"device_code":"dc-1","user_code":"ABC123","verification_uri":"https://login.example/device","expires_in":900,"interval":0,"message":"enter ABC123"}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let token = server
        .mock("POST", "/tenant-a/oauth2/v2.0/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access_token":"at-1","token_type":"Bearer","expires_in":3600,"refresh_token":"rt-1","scope":"https://graph.microsoft.com/Files.ReadWrite"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let site_mock = server
        .mock("GET", "/sites/x.sharepoint.com:/sites/a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"x.sharepoint.com,11,22","displayName":"A"}"#)
        .expect(2)
        .create_async()
        .await;
    let drives = server
        .mock("GET", "/sites/x.sharepoint.com,11,22/drives")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"value":[{"id":"d9","name":"Documents","driveType":"documentLibrary"},{"id":"d10","name":"Archive","driveType":"documentLibrary"}]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let config = mocked_config(
        &server.url(),
        "tenant-a",
        "app-session-reuse",
        "https://x.sharepoint.com/sites/a",
    );

    let site = connect(&config).await.unwrap();
    assert_eq!(site.id(), "x.sharepoint.com,11,22");

    let drive = site.drive("Documents").await.unwrap();
    assert_eq!(drive.id(), "d9");

    let err = site.drive("Missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Second connect: no second device-code prompt.
    let again = connect(&config).await.unwrap();
    assert_eq!(again.id(), site.id());

    device.assert_async().await;
    token.assert_async().await;
    site_mock.assert_async().await;
    drives.assert_async().await;
}

#[tokio::test]
async fn connect_unknown_site_is_not_found() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/tenant-b/oauth2/v2.0/devicecode")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"device_code":"dc-2","user_code":"XYZ789","verification_uri":"https://login.example/device","expires_in":900,"interval":0}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/tenant-b/oauth2/v2.0/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access_token":"at-2","token_type":"Bearer","expires_in":3600,"scope":"https://graph.microsoft.com/Files.ReadWrite"}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/sites/x.sharepoint.com:/sites/gone")
        .with_status(404)
        .with_body(r#"{"error":{"code":"itemNotFound","message":"site not found"}}"#)
        .create_async()
        .await;

    let config = mocked_config(
        &server.url(),
        "tenant-b",
        "app-not-found",
        "https://x.sharepoint.com/sites/gone",
    );

    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn connect_declined_sign_in_is_authentication_error() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/tenant-c/oauth2/v2.0/devicecode")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"device_code":"dc-3","user_code":"NOPE","verification_uri":"https://login.example/device","expires_in":900,"interval":0}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/tenant-c/oauth2/v2.0/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"error":"authorization_declined","error_description":"the user declined the sign-in"}"#,
        )
        .create_async()
        .await;

    let config = mocked_config(
        &server.url(),
        "tenant-c",
        "app-declined",
        "https://x.sharepoint.com/sites/a",
    );

    let err = connect(&config).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
}
