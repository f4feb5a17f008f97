//! YouTube Data API v3 客户端
//!
//! 持有已授权的 HTTP 会话（访问令牌只读共享），实现 `BroadcastApi`。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::api::broadcast_api::{
    watch_url, BroadcastApi, BroadcastMetadata, CreatedBroadcast, Visibility,
};
use crate::config::Config;
use crate::error::ApiError;

/// YouTube 客户端
pub struct YouTubeClient {
    http: Client,
    api_base_url: String,
    upload_base_url: String,
    watch_url_template: String,
    access_token: String,
}

impl YouTubeClient {
    /// 使用配置和访问令牌创建客户端
    pub fn new(config: &Config, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            watch_url_template: config.watch_url_template.clone(),
            access_token: access_token.into(),
        }
    }

    /// 创建直播流
    async fn insert_stream(&self, title: &str) -> Result<String, ApiError> {
        let endpoint = "liveStreams.insert";
        let body = json!({
            "snippet": { "title": title },
            "cdn": {
                "frameRate": "variable",
                "ingestionType": "rtmp",
                "resolution": "variable"
            }
        });

        let request = self
            .http
            .post(format!("{}/liveStreams", self.api_base_url))
            .query(&[("part", "snippet,cdn")])
            .json(&body);

        let response = self.send(endpoint, request).await?;
        extract_id(endpoint, &response)
    }

    /// 把直播流绑定到转播
    async fn bind_stream(&self, broadcast_id: &str, stream_id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(format!("{}/liveBroadcasts/bind", self.api_base_url))
            .query(&[
                ("part", "id,contentDetails"),
                ("id", broadcast_id),
                ("streamId", stream_id),
            ]);

        self.send("liveBroadcasts.bind", request).await?;
        Ok(())
    }

    /// 发送请求并把非 2xx 响应映射为 `ApiError`
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        debug!("调用 {}", endpoint);

        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(classify(endpoint, status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl BroadcastApi for YouTubeClient {
    async fn create_unlisted_broadcast(
        &self,
        meta: &BroadcastMetadata,
    ) -> Result<CreatedBroadcast, ApiError> {
        let endpoint = "liveBroadcasts.insert";
        let body = json!({
            "snippet": {
                "title": meta.title,
                "description": meta.description,
                "scheduledStartTime": meta.start_time_rfc3339()
            },
            "status": {
                "privacyStatus": Visibility::Unlisted.as_str()
            },
            "contentDetails": {
                "enableAutoStart": true,
                "enableAutoStop": true
            }
        });

        let request = self
            .http
            .post(format!("{}/liveBroadcasts", self.api_base_url))
            .query(&[("part", "snippet,status,contentDetails")])
            .json(&body);

        let response = self.send(endpoint, request).await?;
        let broadcast_id = extract_id(endpoint, &response)?;
        debug!("转播已创建: {}", broadcast_id);

        let stream_id = self
            .insert_stream(&meta.title)
            .await
            .map_err(|e| left_unbound(e, &broadcast_id))?;
        self.bind_stream(&broadcast_id, &stream_id)
            .await
            .map_err(|e| left_unbound(e, &broadcast_id))?;
        debug!("直播流 {} 已绑定到转播 {}", stream_id, broadcast_id);

        Ok(CreatedBroadcast {
            watch_url: watch_url(&self.watch_url_template, &broadcast_id),
            id: broadcast_id,
        })
    }

    async fn set_thumbnail(&self, broadcast_id: &str, image: &Path) -> Result<(), ApiError> {
        let bytes = fs::read(image).await.map_err(|source| ApiError::ImageRead {
            path: image.to_path_buf(),
            source,
        })?;
        info!("🖼️ 上传封面 {} ({} 字节)", image.display(), bytes.len());

        let request = self
            .http
            .post(format!("{}/thumbnails/set", self.upload_base_url))
            .query(&[("videoId", broadcast_id)])
            .header(reqwest::header::CONTENT_TYPE, mime_for(image))
            .body(bytes);

        self.send("thumbnails.set", request).await?;
        Ok(())
    }

    async fn set_visibility(
        &self,
        broadcast_id: &str,
        visibility: Visibility,
    ) -> Result<(), ApiError> {
        // 先确认转播存在
        let endpoint = "liveBroadcasts.list";
        let request = self
            .http
            .get(format!("{}/liveBroadcasts", self.api_base_url))
            .query(&[("part", "status"), ("id", broadcast_id)]);
        let listing = self.send(endpoint, request).await?;

        let found = listing
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| !items.is_empty())
            .unwrap_or(false);
        if !found {
            return Err(ApiError::NotFound {
                endpoint: endpoint.to_string(),
                message: format!("transmissão {} não encontrada", broadcast_id),
            });
        }

        let body = json!({
            "id": broadcast_id,
            "status": { "privacyStatus": visibility.as_str() }
        });
        let request = self
            .http
            .put(format!("{}/liveBroadcasts", self.api_base_url))
            .query(&[("part", "status")])
            .json(&body);

        self.send("liveBroadcasts.update", request).await?;
        Ok(())
    }
}

/// 转播已创建但没有绑定直播流，需要用户手动处理
fn left_unbound(error: ApiError, broadcast_id: &str) -> ApiError {
    warn!("⚠️ 转播 {} 已创建，但直播流未绑定: {}", broadcast_id, error);
    error.with_note(&format!(
        "(a transmissão {} foi criada sem stream vinculado e continua no canal)",
        broadcast_id
    ))
}

fn extract_id(endpoint: &str, response: &Value) -> Result<String, ApiError> {
    response
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: "resposta sem o campo id".to_string(),
        })
}

/// 从 Google 的错误响应中提取 `error.message`，否则使用原始响应
fn classify(endpoint: &str, status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());
    let endpoint = endpoint.to_string();

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { endpoint, message },
        StatusCode::FORBIDDEN => ApiError::Forbidden { endpoint, message },
        StatusCode::NOT_FOUND => ApiError::NotFound { endpoint, message },
        _ => ApiError::Status {
            endpoint,
            status: status.as_u16(),
            message,
        },
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
