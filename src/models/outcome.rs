use serde::Serialize;
use std::fmt;

use crate::error::StageFailure;
use crate::models::broadcast::BroadcastRequest;

/// 远程调度的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Create,
    Thumbnail,
    Publish,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Create => "create",
            Stage::Thumbnail => "thumbnail",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单场转播的最终结果，构建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// 已创建；`stage_failures` 非空表示封面或公开阶段失败（部分成功）
    Scheduled {
        request: BroadcastRequest,
        broadcast_id: String,
        watch_url: String,
        made_public: bool,
        stage_failures: Vec<StageFailure>,
    },
    /// 创建阶段失败
    Failed {
        request: BroadcastRequest,
        failure: StageFailure,
    },
}

impl ScheduleOutcome {
    pub fn request(&self) -> &BroadcastRequest {
        match self {
            ScheduleOutcome::Scheduled { request, .. } | ScheduleOutcome::Failed { request, .. } => {
                request
            }
        }
    }

    pub fn watch_url(&self) -> Option<&str> {
        match self {
            ScheduleOutcome::Scheduled { watch_url, .. } => Some(watch_url),
            ScheduleOutcome::Failed { .. } => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ScheduleOutcome::Scheduled { stage_failures, .. } if !stage_failures.is_empty())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScheduleOutcome::Failed { .. })
    }

    /// 该结果涉及的所有失败
    pub fn failures(&self) -> Vec<&StageFailure> {
        match self {
            ScheduleOutcome::Scheduled { stage_failures, .. } => stage_failures.iter().collect(),
            ScheduleOutcome::Failed { failure, .. } => vec![failure],
        }
    }
}

/// 有序的调度报告，长度和顺序与输入批次一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    outcomes: Vec<ScheduleOutcome>,
}

impl ScheduleReport {
    pub fn new(outcomes: Vec<ScheduleOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ScheduleOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleOutcome> {
        self.outcomes.iter()
    }
}

impl<'a> IntoIterator for &'a ScheduleReport {
    type Item = &'a ScheduleOutcome;
    type IntoIter = std::slice::Iter<'a, ScheduleOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
