//! 批次调度器 - 编排层
//!
//! 按输入顺序逐场执行 `BroadcastFlow`，每场转播的失败互不影响。
//! 报告长度和顺序始终与输入批次一致。

use chrono::FixedOffset;
use tracing::info;

use crate::api::BroadcastApi;
use crate::models::broadcast::BroadcastRecordBatch;
use crate::models::outcome::{ScheduleOutcome, ScheduleReport};
use crate::utils::logging;
use crate::workflow::{BroadcastCtx, BroadcastFlow};

/// 调度选项
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    pub utc_offset: FixedOffset,
    /// 创建后是否设为公开
    pub publish: bool,
}

/// 依次调度整个批次
pub async fn schedule_batch<A: BroadcastApi + ?Sized>(
    api: &A,
    batch: BroadcastRecordBatch,
    options: ScheduleOptions,
) -> ScheduleReport {
    let total = batch.len();
    let flow = BroadcastFlow::new(options.utc_offset, options.publish);
    let mut outcomes = Vec::with_capacity(total);

    logging::log_schedule_start(total, options.publish);

    for (idx, request) in batch.into_iter().enumerate() {
        let ctx = BroadcastCtx::new(idx + 1, total, request.title.clone());
        logging::log_record_start(&ctx, &request);

        let outcome = flow.run(api, request, &ctx).await;
        log_outcome(&ctx, &outcome);
        outcomes.push(outcome);
    }

    ScheduleReport::new(outcomes)
}

fn log_outcome(ctx: &BroadcastCtx, outcome: &ScheduleOutcome) {
    match outcome {
        ScheduleOutcome::Scheduled { stage_failures, .. } if stage_failures.is_empty() => {
            info!("{} ✅ 完成", ctx)
        }
        ScheduleOutcome::Scheduled { stage_failures, .. } => {
            info!("{} ⚠️ 已创建，但有 {} 个阶段失败", ctx, stage_failures.len())
        }
        ScheduleOutcome::Failed { failure, .. } => info!("{} ❌ {}", ctx, failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BroadcastMetadata, CreatedBroadcast, Visibility};
    use crate::error::ApiError;
    use crate::models::outcome::Stage;
    use crate::models::BroadcastRequest;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// 按标题注入失败的测试替身
    #[derive(Default)]
    struct FakeApi {
        fail_create: Vec<String>,
        fail_thumbnail: bool,
        fail_publish: bool,
        calls: Mutex<Vec<String>>,
    }

    fn api_error() -> ApiError {
        ApiError::Forbidden {
            endpoint: "fake".to_string(),
            message: "quotaExceeded".to_string(),
        }
    }

    #[async_trait]
    impl BroadcastApi for FakeApi {
        async fn create_unlisted_broadcast(
            &self,
            meta: &BroadcastMetadata,
        ) -> Result<CreatedBroadcast, ApiError> {
            self.calls.lock().unwrap().push(format!("create:{}", meta.title));
            if self.fail_create.contains(&meta.title) {
                return Err(api_error());
            }
            let id = format!("id-{}", meta.title.replace(' ', "-"));
            Ok(CreatedBroadcast {
                watch_url: format!("https://youtube.com/watch?v={}", id),
                id,
            })
        }

        async fn set_thumbnail(&self, broadcast_id: &str, _image: &Path) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(format!("thumbnail:{}", broadcast_id));
            if self.fail_thumbnail {
                Err(api_error())
            } else {
                Ok(())
            }
        }

        async fn set_visibility(
            &self,
            broadcast_id: &str,
            visibility: Visibility,
        ) -> Result<(), ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", visibility, broadcast_id));
            if self.fail_publish {
                Err(api_error())
            } else {
                Ok(())
            }
        }
    }

    fn batch(n: usize, with_covers: bool) -> BroadcastRecordBatch {
        (1..=n)
            .map(|i| {
                let cover = with_covers.then(|| PathBuf::from(format!("capas/{}.png", i)));
                BroadcastRequest::new(
                    format!("Culto {}", i),
                    "Pr. Paulo",
                    NaiveDate::from_ymd_opt(2030, 5, i as u32).unwrap(),
                    NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
                )
                .with_cover(cover)
            })
            .collect()
    }

    fn options(publish: bool) -> ScheduleOptions {
        ScheduleOptions {
            utc_offset: FixedOffset::west_opt(4 * 3600).unwrap(),
            publish,
        }
    }

    #[tokio::test]
    async fn test_create_failure_is_isolated() {
        let api = FakeApi {
            fail_create: vec!["Culto 2".to_string()],
            ..Default::default()
        };
        let input = batch(3, false);
        let report = schedule_batch(&api, input.clone(), options(false)).await;

        assert_eq!(report.len(), 3);
        let titles: Vec<_> = report.iter().map(|o| o.request().title.clone()).collect();
        assert_eq!(titles, vec!["Culto 1", "Culto 2", "Culto 3"]);

        assert!(matches!(report.outcomes()[0], ScheduleOutcome::Scheduled { .. }));
        match &report.outcomes()[1] {
            ScheduleOutcome::Failed { failure, .. } => assert_eq!(failure.stage, Stage::Create),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(matches!(report.outcomes()[2], ScheduleOutcome::Scheduled { .. }));

        let calls = api.calls.lock().unwrap();
        assert!(calls.contains(&"create:Culto 3".to_string()));
    }

    #[tokio::test]
    async fn test_thumbnail_failure_keeps_link_and_still_publishes() {
        let api = FakeApi {
            fail_thumbnail: true,
            ..Default::default()
        };
        let report = schedule_batch(&api, batch(1, true), options(true)).await;

        let outcome = &report.outcomes()[0];
        assert!(outcome.is_partial());
        assert!(!outcome.watch_url().unwrap().is_empty());
        match outcome {
            ScheduleOutcome::Scheduled {
                made_public,
                stage_failures,
                ..
            } => {
                assert!(*made_public);
                assert_eq!(stage_failures.len(), 1);
                assert_eq!(stage_failures[0].stage, Stage::Thumbnail);
            }
            other => panic!("expected scheduled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_identity() {
        let api = FakeApi {
            fail_publish: true,
            ..Default::default()
        };
        let report = schedule_batch(&api, batch(2, false), options(true)).await;

        for outcome in &report {
            match outcome {
                ScheduleOutcome::Scheduled {
                    broadcast_id,
                    made_public,
                    stage_failures,
                    ..
                } => {
                    assert!(broadcast_id.starts_with("id-"));
                    assert!(!made_public);
                    assert_eq!(stage_failures[0].stage, Stage::Publish);
                }
                other => panic!("expected scheduled, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_skips_thumbnail_and_publish_when_not_requested() {
        let api = FakeApi::default();
        let report = schedule_batch(&api, batch(2, false), options(false)).await;

        assert!(report.iter().all(|o| !o.is_partial() && !o.is_failed()));
        let calls = api.calls.lock().unwrap();
        assert_eq!(*calls, vec!["create:Culto 1".to_string(), "create:Culto 2".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = schedule_batch(&FakeApi::default(), Vec::new(), options(true)).await;
        assert!(report.is_empty());
    }
}
