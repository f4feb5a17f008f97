//! OAuth 凭证提供者 - 基础设施层
//!
//! 流程：读取本地令牌 → 有效则直接使用 → 过期且有刷新令牌则刷新 →
//! 否则走已安装应用授权流程（本地回环接收授权码）。结果写回 `CredentialStore`。

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::api::{BroadcastApi, YouTubeClient};
use crate::config::Config;
use crate::error::AuthError;
use crate::infrastructure::credential_store::{CredentialStore, StoredToken};
use crate::infrastructure::loopback;

/// 管理直播所需的授权范围
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// 提供已授权的 API 客户端
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    type Client: BroadcastApi;

    async fn acquire_client(&self) -> Result<Self::Client, AuthError>;
}

/// `client_secret.json` 中的客户端信息
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// 读取 Google 控制台下载的密钥文件（`installed` 或 `web` 格式）
    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::ClientSecretsNotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(AuthError::InvalidClientSecrets(format!("{}: {}", path.display(), e)))
            }
        };

        let file: SecretsFile = serde_json::from_str(&content)
            .map_err(|e| AuthError::InvalidClientSecrets(e.to_string()))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::InvalidClientSecrets("faltam as seções installed ou web".to_string()))
    }

    /// 生成用户授权页面地址
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", YOUTUBE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AuthError::InvalidClientSecrets(format!("auth_uri inválido: {}", e)))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// 基于 OAuth 2.0 的凭证提供者
pub struct OAuthProvider<S: CredentialStore> {
    config: Config,
    store: S,
    http: Client,
}

impl<S: CredentialStore> OAuthProvider<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self {
            config,
            store,
            http: Client::new(),
        }
    }

    /// 获取有效令牌（必要时刷新或重新授权），并保存
    pub async fn access_token(&self) -> Result<StoredToken, AuthError> {
        let stored = self.store.load().await?;

        if let Some(token) = &stored {
            if self.store.is_valid(token) {
                info!("🔑 使用已保存的凭证");
                return Ok(token.clone());
            }
        }

        let secrets = ClientSecrets::load(&self.config.client_secrets_file).await?;

        let token = match stored.and_then(|t| t.refresh_token) {
            Some(refresh_token) => {
                info!("🔄 凭证已过期，正在刷新...");
                self.refresh(&secrets, refresh_token).await?
            }
            None => {
                info!("🔐 正在获取新的凭证...");
                self.authorize(&secrets).await?
            }
        };

        self.store.save(&token).await?;
        Ok(token)
    }

    async fn refresh(
        &self,
        secrets: &ClientSecrets,
        refresh_token: String,
    ) -> Result<StoredToken, AuthError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        self.request_token(secrets, &form, Some(refresh_token.clone()), AuthError::RefreshFailed)
            .await
    }

    async fn authorize(&self, secrets: &ClientSecrets) -> Result<StoredToken, AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| AuthError::AuthorizationFailed(format!("não foi possível abrir a porta local: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::AuthorizationFailed(e.to_string()))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}", port);
        let auth_url = secrets.authorization_url(&redirect_uri)?;

        info!("🔐 Abra o endereço abaixo no navegador e autorize o acesso ao YouTube:");
        info!("{}", auth_url);
        info!(
            "⏳ 等待浏览器授权回调 (端口 {}, 最长 {} 秒)",
            port,
            loopback::AUTHORIZATION_TIMEOUT.as_secs()
        );

        let code = loopback::receive_code(listener).await?;
        debug!("已收到授权码");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        self.request_token(secrets, &form, None, AuthError::AuthorizationFailed)
            .await
    }

    async fn request_token(
        &self,
        secrets: &ClientSecrets,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
        on_error: fn(String) -> AuthError,
    ) -> Result<StoredToken, AuthError> {
        let response = self.http.post(&secrets.token_uri).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("令牌接口返回 HTTP {}", status);
            return Err(on_error(format!("HTTP {}: {}", status.as_u16(), body.trim())));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| on_error(format!("resposta de token inválida: {}", e)))?;

        Ok(StoredToken {
            access_token: parsed.access_token,
            // 刷新响应通常不带新的刷新令牌，沿用旧的
            refresh_token: parsed.refresh_token.or(previous_refresh),
            expires_at: parsed
                .expires_in
                .map(|secs| Utc::now() + TimeDelta::seconds(secs)),
            scope: parsed.scope.unwrap_or_else(|| YOUTUBE_SCOPE.to_string()),
        })
    }
}

#[async_trait]
impl<S: CredentialStore> CredentialProvider for OAuthProvider<S> {
    type Client = YouTubeClient;

    async fn acquire_client(&self) -> Result<YouTubeClient, AuthError> {
        let token = self.access_token().await?;
        Ok(YouTubeClient::new(&self.config, token.access_token))
    }
}
