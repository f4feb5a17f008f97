//! 日志工具模块
//!
//! 初始化 tracing 订阅者，并提供日志格式化和输出的辅助函数

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::models::broadcast::BroadcastRequest;
use crate::orchestrator::aggregator::ReportSummary;
use crate::workflow::BroadcastCtx;

/// 初始化日志：终端 + 运行日志文件
///
/// `RUST_LOG` 优先；否则 `verbose` 时为 debug，平时为 info。
pub fn init(log_file_path: &Path, verbose: bool) -> Result<()> {
    let file = init_log_file(log_file_path)?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))?;

    Ok(())
}

/// 创建运行日志文件并写入表头
fn init_log_file(log_file_path: &Path) -> Result<File> {
    let mut file = File::create(log_file_path)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path.display()))?;
    let log_header = format!(
        "{}\n转播调度日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    file.write_all(log_header.as_bytes())?;
    Ok(file)
}

/// 记录程序启动信息
pub fn log_startup(utc_offset_hours: i32) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 转播批量调度");
    info!("🕒 输入时区: UTC{:+}", utc_offset_hours);
    info!("{}", "=".repeat(60));
}

/// 记录调度开始
pub fn log_schedule_start(total: usize, publish: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始调度 {} 场转播", total);
    info!("📢 创建后设为公开: {}", if publish { "是" } else { "否" });
    info!("{}", "=".repeat(60));
}

/// 记录单场转播开始
pub fn log_record_start(ctx: &BroadcastCtx, request: &BroadcastRequest) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 讲员: {}", ctx, request.presenter);
    info!("{} 日期: {} {}", ctx, request.date_text(), request.time_text());
    if let Some(cover) = &request.cover_image {
        info!("{} 封面: {}", ctx, cover.display());
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &ReportSummary, log_file_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.scheduled, summary.total);
    info!("⚠️ 部分失败: {}", summary.partially_failed);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
