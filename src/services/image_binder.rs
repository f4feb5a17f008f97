//! 封面配对服务 - 业务能力层
//!
//! 按文件名的自然顺序列出目录中的图片，并按位置与批次配对。
//! 结果只是预览，需要调用方确认后再 `BindingPreview::bind`。

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{BinderError, BindingMismatch};
use crate::models::assignment::{BindingPreview, ImageAssignment};
use crate::models::broadcast::BroadcastRequest;

/// 封面配对服务
pub struct ImageBinder {
    extensions: Vec<String>,
}

impl ImageBinder {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// 列出目录中的图片（自然排序）
    pub async fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, BinderError> {
        let read_failed = |source| BinderError::ReadFailed {
            path: dir.to_path_buf(),
            source,
        };

        if !fs::try_exists(dir).await.map_err(read_failed)? {
            return Err(BinderError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut images = Vec::new();
        let mut entries = fs::read_dir(dir).await.map_err(read_failed)?;

        while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && self.is_image(&path) {
                images.push(path);
            } else {
                debug!("跳过非图片文件: {}", path.display());
            }
        }

        images.sort_by(|a, b| natural_cmp(&file_name_of(a), &file_name_of(b)));
        Ok(images)
    }

    /// 生成配对预览
    pub async fn preview(
        &self,
        batch: &[BroadcastRequest],
        dir: &Path,
    ) -> Result<BindingPreview, BinderError> {
        let images = self.list_images(dir).await?;
        info!(
            "📁 封面目录 {} 中找到 {} 张图片，转播 {} 场",
            dir.display(),
            images.len(),
            batch.len()
        );
        Ok(pair(batch, images))
    }

    fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x == &e.to_lowercase()))
            .unwrap_or(false)
    }
}

/// 按位置配对，并给出数量不一致的警告
pub fn pair(batch: &[BroadcastRequest], images: Vec<PathBuf>) -> BindingPreview {
    let records = batch.len();
    let image_count = images.len();

    let mut images = images.into_iter();
    let assignments: Vec<ImageAssignment> = batch
        .iter()
        .enumerate()
        .map(|(index, request)| ImageAssignment {
            index,
            title: request.title.clone(),
            image: images.next(),
        })
        .collect();
    let extras: Vec<String> = images.map(|p| file_name_of(&p)).collect();

    let warning = match image_count.cmp(&records) {
        Ordering::Less => Some(BindingMismatch::MissingCovers {
            records,
            images: image_count,
            uncovered: (image_count + 1..=records).collect(),
        }),
        Ordering::Greater => Some(BindingMismatch::ExtraImages {
            records,
            images: image_count,
            ignored: extras,
        }),
        Ordering::Equal => None,
    };

    if let Some(w) = &warning {
        warn!("⚠️ {}", w);
    }

    BindingPreview {
        assignments,
        warning,
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 自然顺序比较：数字段按数值比较，其余按字符比较；相等时退回字节序
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let n1 = take_digits(&mut left);
                let n2 = take_digits(&mut right);
                let t1 = n1.trim_start_matches('0');
                let t2 = n2.trim_start_matches('0');
                let ord = t1.len().cmp(&t2.len()).then_with(|| t1.cmp(t2));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}
