//! # Broadcast Scheduler
//!
//! 批量创建 YouTube 预定直播的命令行工具
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有凭证这一稀缺资源，只暴露能力
//! - `OAuthProvider` - 读取/刷新/申请令牌，产出已授权的客户端
//! - `FileCredentialStore` - 本地令牌文件
//!
//! ### ② 业务能力层（Services / API）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `RecordParser` - 文本 → 校验过的转播记录
//! - `ImageBinder` - 封面目录 → 按位置配对预览
//! - `ReportWriter` - 写结果文件
//! - `api/` - `BroadcastApi` 及其 YouTube 实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一场转播"的完整处理流程
//! - `BroadcastCtx` - 上下文封装（序号 + 标题）
//! - `BroadcastFlow` - 流程编排（create → thumbnail → publish）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用主流程
//! - `orchestrator/scheduler` - 批次调度，单场失败相互隔离
//! - `orchestrator/aggregator` - 结果汇总
//!
//! `console/` 是薄的终端交互层，`models/` 是各层共用的数据类型。

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{BroadcastApi, YouTubeClient};
pub use config::Config;
pub use error::{ApiError, AuthError, BinderError, BindingMismatch, StageFailure, ValidationError};
pub use infrastructure::{CredentialProvider, CredentialStore, OAuthProvider};
pub use models::{BroadcastRecordBatch, BroadcastRequest, ScheduleOutcome, ScheduleReport};
pub use orchestrator::{schedule_batch, App, ScheduleOptions};
pub use workflow::{BroadcastCtx, BroadcastFlow};
