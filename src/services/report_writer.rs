//! 结果写入服务 - 业务能力层
//!
//! 只负责"把汇总结果写成文本文件"能力，不关心流程

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::orchestrator::aggregator::{AggregatedReport, ReportLine};

/// 结果写入服务
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入结果文件（覆盖）
    pub async fn write(&self, report: &AggregatedReport) -> Result<()> {
        let content = render(report);
        debug!("写入结果文件: {} ({} 字节)", self.path.display(), content.len());

        fs::write(&self.path, content)
            .await
            .with_context(|| format!("无法写入结果文件: {}", self.path.display()))?;
        Ok(())
    }
}

/// 渲染为人类可读的文本
pub fn render(report: &AggregatedReport) -> String {
    let mut out = String::from("=== RESULTADO DO AGENDAMENTO DE TRANSMISSÕES ===\n\n");

    for line in &report.lines {
        render_line(&mut out, line);
        out.push('\n');
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "Resumo: {} agendadas, {} com falhas parciais, {} falharam, {} públicas (total {})",
        s.scheduled, s.partially_failed, s.failed, s.made_public, s.total
    );
    out
}

fn render_line(out: &mut String, line: &ReportLine) {
    let _ = writeln!(out, "Transmissão #{}", line.index);
    let _ = writeln!(out, "Título: {}", line.title);
    let _ = writeln!(out, "Pregador: {}", line.presenter);
    let _ = writeln!(out, "Data: {}", line.date);
    let _ = writeln!(out, "Horário: {}", line.time);
    let _ = writeln!(out, "Status: {}", line.status.label());
    if let Some(link) = &line.link {
        let _ = writeln!(out, "Link: {}", link);
    }
    if line.made_public {
        let _ = writeln!(out, "Visibilidade: pública");
    }
    for (stage, reason) in &line.failures {
        let _ = writeln!(out, "Falha ({}): {}", stage, reason);
    }
}
