use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 默认配置文件名，可用 `SCHEDULER_CONFIG` 指定其他路径
pub const DEFAULT_CONFIG_FILE: &str = "scheduler.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google 控制台下载的 OAuth 客户端密钥
    pub client_secrets_file: PathBuf,
    /// 本地保存的令牌
    pub token_file: PathBuf,
    /// YouTube Data API 地址
    pub api_base_url: String,
    /// 封面上传地址
    pub upload_base_url: String,
    /// 观看链接模板，`{id}` 会被替换为转播 ID
    pub watch_url_template: String,
    /// 输入日期时间所在时区相对 UTC 的小时数
    pub utc_offset_hours: i32,
    /// 视为封面的文件扩展名
    pub image_extensions: Vec<String>,
    /// 默认结果文件
    pub results_file: PathBuf,
    /// 运行日志文件
    pub output_log_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_secrets_file: PathBuf::from("client_secret.json"),
            token_file: PathBuf::from("token.json"),
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            upload_base_url: "https://www.googleapis.com/upload/youtube/v3".to_string(),
            watch_url_template: "https://youtube.com/watch?v={id}".to_string(),
            utc_offset_hours: -4,
            image_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            results_file: PathBuf::from("resultados.txt"),
            output_log_file: PathBuf::from("agendamento.log"),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 读取配置文件（如存在），再叠加环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var("SCHEDULER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let base = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        let config = base.with_env();
        config.utc_offset()?;
        Ok(config)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 从 TOML 文件读取，缺失的键使用默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    fn with_env(self) -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Self {
            client_secrets_file: env("CLIENT_SECRETS_FILE").map(PathBuf::from).unwrap_or(self.client_secrets_file),
            token_file: env("TOKEN_FILE").map(PathBuf::from).unwrap_or(self.token_file),
            api_base_url: env("YOUTUBE_API_BASE_URL").unwrap_or(self.api_base_url),
            upload_base_url: env("YOUTUBE_UPLOAD_BASE_URL").unwrap_or(self.upload_base_url),
            watch_url_template: env("WATCH_URL_TEMPLATE").unwrap_or(self.watch_url_template),
            utc_offset_hours: env("UTC_OFFSET_HOURS").and_then(|v| v.parse().ok()).unwrap_or(self.utc_offset_hours),
            image_extensions: env("IMAGE_EXTENSIONS")
                .map(|v| v.split(',').map(|e| e.trim().to_string()).filter(|e| !e.is_empty()).collect())
                .unwrap_or(self.image_extensions),
            results_file: env("RESULTS_FILE").map(PathBuf::from).unwrap_or(self.results_file),
            output_log_file: env("OUTPUT_LOG_FILE").map(PathBuf::from).unwrap_or(self.output_log_file),
            verbose_logging: env("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 输入时区
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("无效的时区偏移: {} 小时", self.utc_offset_hours))
    }
}
