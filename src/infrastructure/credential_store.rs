//! 令牌存储 - 基础设施层
//!
//! 只暴露 load / save / is_valid 能力，不关心令牌从哪里来。

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::AuthError;

/// 过期前预留的秒数
const EXPIRY_MARGIN_SECS: i64 = 60;

/// 保存到本地的 OAuth 令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scope: String,
}

impl StoredToken {
    /// 令牌在 `now` 之后至少还有一分钟有效期
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at - TimeDelta::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

/// 令牌存储能力
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredToken>, AuthError>;

    async fn save(&self, token: &StoredToken) -> Result<(), AuthError>;

    fn is_valid(&self, token: &StoredToken) -> bool {
        token.is_valid_at(Utc::now())
    }
}

/// 以 JSON 文件保存令牌
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn storage_error(&self, source: std::io::Error) -> AuthError {
        AuthError::TokenStorage {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StoredToken>, AuthError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("令牌文件不存在: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.storage_error(e)),
        };

        let token = serde_json::from_str(&content)
            .map_err(|e| AuthError::InvalidToken(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(token))
    }

    async fn save(&self, token: &StoredToken) -> Result<(), AuthError> {
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        // 含刷新令牌，只允许当前用户读写
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| self.storage_error(e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| self.storage_error(e))?;
        file.flush().await.map_err(|e| self.storage_error(e))?;

        // 已存在的旧文件不会因 mode 改变权限
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.storage_error(e))?;
        }
        debug!("令牌已保存: {}", self.path.display());
        Ok(())
    }
}
