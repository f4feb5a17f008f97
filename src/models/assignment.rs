use std::path::PathBuf;

use crate::error::BindingMismatch;
use crate::models::broadcast::{BroadcastRecordBatch, BroadcastRequest};

/// 单条封面配对：批次中的位置 → 封面文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAssignment {
    /// 0 起始的批次位置
    pub index: usize,
    pub title: String,
    pub image: Option<PathBuf>,
}

impl ImageAssignment {
    pub fn file_name(&self) -> Option<String> {
        self.image
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }
}

/// 封面配对预览
///
/// 只是待确认的数据，调用 `bind` 之后配对才生效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPreview {
    pub assignments: Vec<ImageAssignment>,
    pub warning: Option<BindingMismatch>,
}

impl BindingPreview {
    /// 空预览：所有转播都没有封面
    pub fn without_covers(batch: &[BroadcastRequest]) -> Self {
        let assignments = batch
            .iter()
            .enumerate()
            .map(|(index, r)| ImageAssignment {
                index,
                title: r.title.clone(),
                image: None,
            })
            .collect();
        Self {
            assignments,
            warning: None,
        }
    }

    pub fn bound_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.image.is_some()).count()
    }

    /// 确认后把封面写入批次
    pub fn bind(&self, batch: BroadcastRecordBatch) -> BroadcastRecordBatch {
        batch
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                let cover = self
                    .assignments
                    .get(index)
                    .and_then(|a| a.image.clone());
                request.with_cover(cover)
            })
            .collect()
    }
}
