//! 凭证获取流程：已保存令牌、刷新、缺少密钥文件

use broadcast_scheduler::error::AuthError;
use broadcast_scheduler::infrastructure::{
    CredentialProvider, CredentialStore, FileCredentialStore, OAuthProvider, StoredToken,
};
use broadcast_scheduler::Config;
use chrono::{TimeDelta, Utc};
use mockito::{Matcher, Server};
use std::path::Path;

fn config(dir: &Path) -> Config {
    Config {
        client_secrets_file: dir.join("client_secret.json"),
        token_file: dir.join("token.json"),
        ..Config::default()
    }
}

fn write_secrets(dir: &Path, token_uri: &str) {
    let secrets = serde_json::json!({
        "installed": {
            "client_id": "cliente.apps.googleusercontent.com",
            "client_secret": "segredo",
            "auth_uri": "https://accounts.example.com/o/oauth2/auth",
            "token_uri": token_uri,
            "redirect_uris": ["http://localhost"]
        }
    });
    std::fs::write(dir.join("client_secret.json"), secrets.to_string()).unwrap();
}

fn token(access: &str, refresh: Option<&str>, expires_in_secs: i64) -> StoredToken {
    StoredToken {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: Some(Utc::now() + TimeDelta::seconds(expires_in_secs)),
        scope: "https://www.googleapis.com/auth/youtube".to_string(),
    }
}

#[tokio::test]
async fn test_valid_stored_token_skips_network() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = FileCredentialStore::new(&config.token_file);
    let saved = token("ainda-valido", Some("r-1"), 3600);
    store.save(&saved).await.unwrap();

    // 没有密钥文件也能直接使用已保存的令牌
    let provider = OAuthProvider::new(config, store);
    let token = provider.access_token().await.unwrap();
    assert_eq!(token, saved);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_saved() {
    let mut server = Server::new_async().await;
    let refresh = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "r-1".into()),
            Matcher::UrlEncoded("client_id".into(), "cliente.apps.googleusercontent.com".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"novo","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_secrets(dir.path(), &format!("{}/token", server.url()));
    let config = config(dir.path());
    let store = FileCredentialStore::new(&config.token_file);
    store.save(&token("velho", Some("r-1"), -10)).await.unwrap();

    let provider = OAuthProvider::new(config.clone(), FileCredentialStore::new(&config.token_file));
    let token = provider.access_token().await.unwrap();

    refresh.assert_async().await;
    assert_eq!(token.access_token, "novo");
    assert_eq!(token.refresh_token.as_deref(), Some("r-1"));
    assert!(token.expires_at.unwrap() > Utc::now());

    let reloaded = store.load().await.unwrap().unwrap();
    assert_eq!(reloaded, token);
}

#[tokio::test]
async fn test_refresh_rejected_is_fatal() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_secrets(dir.path(), &format!("{}/token", server.url()));
    let config = config(dir.path());
    let store = FileCredentialStore::new(&config.token_file);
    store.save(&token("velho", Some("revogado"), -10)).await.unwrap();

    let provider = OAuthProvider::new(config, store);
    let err = provider.acquire_client().await.err().unwrap();
    match err {
        AuthError::RefreshFailed(message) => assert!(message.contains("invalid_grant")),
        other => panic!("expected refresh failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_client_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let provider = OAuthProvider::new(config.clone(), FileCredentialStore::new(&config.token_file));

    let err = provider.acquire_client().await.err().unwrap();
    assert!(matches!(err, AuthError::ClientSecretsNotFound(ref path) if path == &config.client_secrets_file));
}
