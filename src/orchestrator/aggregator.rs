//! 结果汇总
//!
//! 只读遍历 `ScheduleReport`，生成便于显示和导出的行与统计，不修改任何结果。

use crate::models::outcome::{ScheduleOutcome, ScheduleReport};

/// 单行的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Scheduled,
    PartiallyFailed,
    Failed,
}

impl LineStatus {
    /// 报告中显示的文字
    pub fn label(self) -> &'static str {
        match self {
            LineStatus::Scheduled => "agendada",
            LineStatus::PartiallyFailed => "agendada com falhas",
            LineStatus::Failed => "falhou",
        }
    }
}

/// 报告中的一行（对应一场转播）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// 1 起始的批次位置
    pub index: usize,
    pub title: String,
    pub presenter: String,
    pub date: String,
    pub time: String,
    pub status: LineStatus,
    pub link: Option<String>,
    pub made_public: bool,
    /// `(阶段, 原因)`
    pub failures: Vec<(String, String)>,
}

/// 汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub scheduled: usize,
    pub partially_failed: usize,
    pub failed: usize,
    pub made_public: usize,
}

/// 可显示、可导出的汇总结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedReport {
    pub lines: Vec<ReportLine>,
    pub summary: ReportSummary,
}

/// 把调度报告折叠为汇总结果
pub fn aggregate(report: &ScheduleReport) -> AggregatedReport {
    report
        .iter()
        .enumerate()
        .fold(AggregatedReport::default(), |mut acc, (idx, outcome)| {
            let line = to_line(idx + 1, outcome);
            acc.summary.total += 1;
            match line.status {
                LineStatus::Scheduled => acc.summary.scheduled += 1,
                LineStatus::PartiallyFailed => acc.summary.partially_failed += 1,
                LineStatus::Failed => acc.summary.failed += 1,
            }
            if line.made_public {
                acc.summary.made_public += 1;
            }
            acc.lines.push(line);
            acc
        })
}

fn to_line(index: usize, outcome: &ScheduleOutcome) -> ReportLine {
    let request = outcome.request();
    let status = if outcome.is_failed() {
        LineStatus::Failed
    } else if outcome.is_partial() {
        LineStatus::PartiallyFailed
    } else {
        LineStatus::Scheduled
    };
    let made_public = matches!(outcome, ScheduleOutcome::Scheduled { made_public: true, .. });

    ReportLine {
        index,
        title: request.title.clone(),
        presenter: request.presenter.clone(),
        date: request.date_text(),
        time: request.time_text(),
        status,
        link: outcome.watch_url().map(str::to_string),
        made_public,
        failures: outcome
            .failures()
            .into_iter()
            .map(|f| (f.stage.to_string(), f.message.clone()))
            .collect(),
    }
}
