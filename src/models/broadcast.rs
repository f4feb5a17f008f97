use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 区块中的四个必填字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Title,
    Presenter,
    Date,
    Time,
}

impl Field {
    /// 区块中的固定顺序
    pub const ALL: [Field; 4] = [Field::Title, Field::Presenter, Field::Date, Field::Time];

    /// 标签关键字（批量文本格式中的写法）
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Título",
            Field::Presenter => "Pregador",
            Field::Date => "Data",
            Field::Time => "Horário",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 逐项采集的原始字段（交互模式）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub title: String,
    pub presenter: String,
    pub date: String,
    pub time: String,
}

impl FieldSet {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Presenter => &self.presenter,
            Field::Date => &self.date,
            Field::Time => &self.time,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Presenter => self.presenter = value,
            Field::Date => self.date = value,
            Field::Time => self.time = value,
        }
    }
}

/// 一场待创建的转播
///
/// 标题和讲员在构建时已去除首尾空白且非空，日期和时间已严格校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub presenter: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// 整批共用的自定义描述，可以为空
    pub description: String,
    /// 绑定后的封面路径
    pub cover_image: Option<PathBuf>,
}

impl BroadcastRequest {
    pub fn new(
        title: impl Into<String>,
        presenter: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            presenter: presenter.into(),
            date,
            time,
            description: String::new(),
            cover_image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cover(mut self, cover: Option<PathBuf>) -> Self {
        self.cover_image = cover;
        self
    }

    /// 按给定时区偏移把本地日期时间换算为 UTC 开始时间
    pub fn scheduled_start(&self, offset: FixedOffset) -> DateTime<Utc> {
        let local = self.date.and_time(self.time);
        let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    pub fn date_text(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    pub fn time_text(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// 序列化为批量文本的四行区块
    pub fn to_block(&self) -> String {
        format!(
            "{}: {}\n{}: {}\n{}: {}\n{}: {}",
            Field::Title,
            self.title,
            Field::Presenter,
            self.presenter,
            Field::Date,
            self.date_text(),
            Field::Time,
            self.time_text()
        )
    }
}

/// 有序的转播批次，顺序决定封面配对和报告顺序
pub type BroadcastRecordBatch = Vec<BroadcastRequest>;
