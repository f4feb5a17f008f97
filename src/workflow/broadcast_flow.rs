//! 转播处理流程 - 流程层
//!
//! 核心职责：定义"一场转播"的完整处理流程
//!
//! 流程顺序：
//! 1. create（不公开）→ 失败则整条记录失败
//! 2. thumbnail（有封面时）→ 失败只记录，保留已创建的转播
//! 3. publish（全局开关）→ 失败只记录，保留已创建的转播

use chrono::FixedOffset;
use tracing::{error, info, warn};

use crate::api::{BroadcastApi, BroadcastMetadata, Visibility};
use crate::error::StageFailure;
use crate::models::broadcast::BroadcastRequest;
use crate::models::outcome::{ScheduleOutcome, Stage};
use crate::workflow::broadcast_ctx::BroadcastCtx;

/// 转播处理流程
///
/// - 只处理单场转播，不出现批次
/// - 不持有 API 会话，由调用方传入
/// - 永远返回一个结果，不向外抛错
pub struct BroadcastFlow {
    utc_offset: FixedOffset,
    publish: bool,
}

impl BroadcastFlow {
    pub fn new(utc_offset: FixedOffset, publish: bool) -> Self {
        Self { utc_offset, publish }
    }

    pub async fn run<A: BroadcastApi + ?Sized>(
        &self,
        api: &A,
        request: BroadcastRequest,
        ctx: &BroadcastCtx,
    ) -> ScheduleOutcome {
        // ========== 阶段 1: 创建 ==========
        let meta = BroadcastMetadata::from_request(&request, self.utc_offset);
        info!("{} 📅 创建转播，开始时间 {}", ctx, meta.start_time_rfc3339());

        let created = match api.create_unlisted_broadcast(&meta).await {
            Ok(created) => created,
            Err(e) => {
                error!("{} ❌ 创建失败: {}", ctx, e);
                return ScheduleOutcome::Failed {
                    request,
                    failure: StageFailure::new(Stage::Create, &e),
                };
            }
        };
        info!("{} ✓ 已创建: {}", ctx, created.watch_url);

        let mut stage_failures = Vec::new();

        // ========== 阶段 2: 封面 ==========
        match &request.cover_image {
            Some(image) => match api.set_thumbnail(&created.id, image).await {
                Ok(()) => info!("{} ✓ 封面已设置", ctx),
                Err(e) => {
                    warn!("{} ⚠️ 封面设置失败: {}", ctx, e);
                    stage_failures.push(StageFailure::new(Stage::Thumbnail, &e));
                }
            },
            None => info!("{} 没有封面，跳过", ctx),
        }

        // ========== 阶段 3: 公开 ==========
        let mut made_public = false;
        if self.publish {
            match api.set_visibility(&created.id, Visibility::Public).await {
                Ok(()) => {
                    made_public = true;
                    info!("{} ✓ 已设为公开", ctx);
                }
                Err(e) => {
                    warn!("{} ⚠️ 设为公开失败: {}", ctx, e);
                    stage_failures.push(StageFailure::new(Stage::Publish, &e));
                }
            }
        }

        ScheduleOutcome::Scheduled {
            request,
            broadcast_id: created.id,
            watch_url: created.watch_url,
            made_public,
            stage_failures,
        }
    }
}
