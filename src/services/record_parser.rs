//! 记录解析服务 - 业务能力层
//!
//! 把粘贴的批量文本或逐项采集的字段转换为校验过的 `BroadcastRequest`。
//! 本模块没有副作用（只写日志），交互循环由 console 负责。

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use phf::phf_map;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::broadcast::{BroadcastRecordBatch, BroadcastRequest, Field, FieldSet};

/// 折叠大小写和重音之后的标签 → 字段
static LABELS: phf::Map<&'static str, Field> = phf_map! {
    "titulo" => Field::Title,
    "pregador" => Field::Presenter,
    "data" => Field::Date,
    "horario" => Field::Time,
};

const DATE_FORMAT_HINT: &str = "DD/MM/AAAA";
const TIME_FORMAT_HINT: &str = "HH:MM";

/// 批量解析结果：有效记录 + 被排除区块的错误
#[derive(Debug, Default)]
pub struct BatchParse {
    pub records: BroadcastRecordBatch,
    pub errors: Vec<ValidationError>,
}

impl BatchParse {
    /// 非空区块总数
    pub fn block_count(&self) -> usize {
        self.records.len() + self.errors.len()
    }
}

/// 开始时间已经过去的记录（非致命警告）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastSchedule {
    /// 1 起始的批次位置
    pub index: usize,
    pub title: String,
    pub start: DateTime<Utc>,
}

/// 记录解析服务
pub struct RecordParser {
    date_shape: Regex,
    time_shape: Regex,
}

impl RecordParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            date_shape: Regex::new(r"^\d{2}/\d{2}/\d{4}$")?,
            time_shape: Regex::new(r"^\d{2}:\d{2}$")?,
        })
    }

    /// 解析整段批量文本
    ///
    /// 出错的区块被排除并记录错误，后续区块继续解析。
    pub fn parse_batch(&self, text: &str) -> BatchParse {
        let mut parse = BatchParse::default();

        for (idx, lines) in split_blocks(text).iter().enumerate() {
            let block = idx + 1;
            match self.parse_block(block, lines) {
                Ok(record) => {
                    debug!("区块 {} 解析成功: {}", block, record.title);
                    parse.records.push(record);
                }
                Err(e) => {
                    warn!("⚠️ 区块 {} 被忽略: {}", block, e);
                    parse.errors.push(e);
                }
            }
        }

        parse
    }

    /// 校验一组逐项采集的字段
    pub fn validate_fields(
        &self,
        block: usize,
        fields: &FieldSet,
    ) -> std::result::Result<BroadcastRequest, ValidationError> {
        let at = |field: Field| move |kind| ValidationError::new(block, field, kind);

        let title = validate_text(&fields.title).map_err(at(Field::Title))?;
        let presenter = validate_text(&fields.presenter).map_err(at(Field::Presenter))?;
        let date = self.parse_date(&fields.date).map_err(at(Field::Date))?;
        let time = self.parse_time(&fields.time).map_err(at(Field::Time))?;

        Ok(BroadcastRequest::new(title, presenter, date, time))
    }

    /// 校验单个字段的原始值（交互模式逐项重试用）
    pub fn check_field(&self, field: Field, raw: &str) -> std::result::Result<(), ValidationErrorKind> {
        match field {
            Field::Title | Field::Presenter => validate_text(raw).map(|_| ()),
            Field::Date => self.parse_date(raw).map(|_| ()),
            Field::Time => self.parse_time(raw).map(|_| ()),
        }
    }

    /// 严格解析 `DD/MM/AAAA`
    pub fn parse_date(&self, raw: &str) -> std::result::Result<NaiveDate, ValidationErrorKind> {
        let value = raw.trim();
        let malformed = || ValidationErrorKind::Malformed {
            raw: value.to_string(),
            expected: DATE_FORMAT_HINT,
        };
        if value.is_empty() {
            return Err(ValidationErrorKind::Empty);
        }
        if !self.date_shape.is_match(value) {
            return Err(malformed());
        }
        NaiveDate::parse_from_str(value, "%d/%m/%Y").map_err(|_| malformed())
    }

    /// 严格解析 `HH:MM`
    pub fn parse_time(&self, raw: &str) -> std::result::Result<NaiveTime, ValidationErrorKind> {
        let value = raw.trim();
        let malformed = || ValidationErrorKind::Malformed {
            raw: value.to_string(),
            expected: TIME_FORMAT_HINT,
        };
        if value.is_empty() {
            return Err(ValidationErrorKind::Empty);
        }
        if !self.time_shape.is_match(value) {
            return Err(malformed());
        }
        NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| malformed())
    }

    fn parse_block(
        &self,
        block: usize,
        lines: &[&str],
    ) -> std::result::Result<BroadcastRequest, ValidationError> {
        let mut found: [Option<String>; 4] = Default::default();

        for line in lines {
            let Some((label, value)) = line.split_once(':') else {
                warn!("区块 {} 中无法识别的行已忽略: {}", block, line);
                continue;
            };
            let Some(field) = LABELS.get(fold_label(label).as_str()).copied() else {
                warn!("区块 {} 中未知的标签已忽略: {}", block, label.trim());
                continue;
            };

            let slot = &mut found[slot_of(field)];
            if slot.is_some() {
                return Err(ValidationError::new(
                    block,
                    field,
                    ValidationErrorKind::Duplicate {
                        raw: value.trim().to_string(),
                    },
                ));
            }
            *slot = Some(value.trim().to_string());
        }

        let mut fields = FieldSet::default();
        for field in Field::ALL {
            match found[slot_of(field)].take() {
                Some(value) => fields.set(field, value),
                None => {
                    return Err(ValidationError::new(
                        block,
                        field,
                        ValidationErrorKind::Missing,
                    ))
                }
            }
        }

        self.validate_fields(block, &fields)
    }
}

/// 找出开始时间早于 `now` 的记录
pub fn past_schedule_warnings(
    batch: &[BroadcastRequest],
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Vec<PastSchedule> {
    batch
        .iter()
        .enumerate()
        .filter_map(|(idx, request)| {
            let start = request.scheduled_start(offset);
            (start <= now).then(|| PastSchedule {
                index: idx + 1,
                title: request.title.clone(),
                start,
            })
        })
        .collect()
}

fn validate_text(raw: &str) -> std::result::Result<String, ValidationErrorKind> {
    let value = raw.trim();
    if value.is_empty() {
        Err(ValidationErrorKind::Empty)
    } else {
        Ok(value.to_string())
    }
}

fn slot_of(field: Field) -> usize {
    match field {
        Field::Title => 0,
        Field::Presenter => 1,
        Field::Date => 2,
        Field::Time => 3,
    }
}

/// 按空行切分区块；连续空行视为一个分隔符，只含空白的区块不计数
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// 小写并去掉葡语常见重音
fn fold_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        // 分解形式的重音符号（如 macOS 粘贴的文本）
        .filter(|c| !matches!(c, '\u{300}'..='\u{36F}'))
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
