//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用主流程
//! - 管理应用生命周期（初始化、运行）
//! - 串起采集、封面、授权、调度、导出各个阶段
//! - 持有凭证提供者
//!
//! ### `scheduler` - 批次调度器
//! - 按输入顺序逐场执行 `BroadcastFlow`
//! - 单场失败不影响其他转播
//!
//! ### `aggregator` - 结果汇总
//! - 把 `ScheduleReport` 折叠为可显示、可导出的行和统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (整个运行)
//!     ↓
//! scheduler (处理 Vec<BroadcastRequest>)
//!     ↓
//! workflow::BroadcastFlow (处理单场转播)
//!     ↓
//! api::BroadcastApi (create / thumbnail / publish)
//!     ↓
//! infrastructure (凭证：CredentialProvider)
//! ```

pub mod aggregator;
pub mod batch_processor;
pub mod scheduler;

// 重新导出主要类型
pub use aggregator::{aggregate, AggregatedReport, LineStatus, ReportLine, ReportSummary};
pub use batch_processor::App;
pub use scheduler::{schedule_batch, ScheduleOptions};
