//! 远程转播 API 的能力接口
//!
//! 编排层只依赖这个 trait，不关心背后是 YouTube 还是测试替身。

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use std::fmt;
use std::path::Path;

use crate::error::ApiError;
use crate::models::broadcast::BroadcastRequest;

/// 隐私状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Unlisted,
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 创建转播所需的元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMetadata {
    pub title: String,
    pub description: String,
    pub scheduled_start: DateTime<Utc>,
}

impl BroadcastMetadata {
    pub fn from_request(request: &BroadcastRequest, offset: FixedOffset) -> Self {
        Self {
            title: request.title.clone(),
            description: request.description.clone(),
            scheduled_start: request.scheduled_start(offset),
        }
    }

    /// RFC 3339 UTC 格式，例如 `2023-04-15T23:00:00Z`
    pub fn start_time_rfc3339(&self) -> String {
        self.scheduled_start
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// 已创建的转播
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBroadcast {
    pub id: String,
    pub watch_url: String,
}

/// 由观看链接模板和转播 ID 生成链接，模板中的 `{id}` 会被替换
pub fn watch_url(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

/// 远程转播 API
#[async_trait]
pub trait BroadcastApi: Send + Sync {
    /// 以「不公开」状态创建转播，并绑定一个直播流
    async fn create_unlisted_broadcast(
        &self,
        meta: &BroadcastMetadata,
    ) -> Result<CreatedBroadcast, ApiError>;

    /// 上传封面
    async fn set_thumbnail(&self, broadcast_id: &str, image: &Path) -> Result<(), ApiError>;

    /// 修改隐私状态
    async fn set_visibility(
        &self,
        broadcast_id: &str,
        visibility: Visibility,
    ) -> Result<(), ApiError>;
}
