//! 错误类型
//!
//! - `ValidationError`：批量文本中某个区块不合法，只影响该区块
//! - `BinderError` / `BindingMismatch`：封面目录错误与数量不一致警告
//! - `AuthError`：凭证获取失败，终止整个运行
//! - `ApiError`：单个转播、单个阶段的远程调用失败，不向外传播

use std::path::PathBuf;
use thiserror::Error;

use crate::models::broadcast::Field;
use crate::models::outcome::Stage;

/// 区块校验错误
///
/// `block` 从 1 开始计数，只统计非空区块；交互模式下为第几条转播。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bloco {block}, campo \"{field}\": {kind}")]
pub struct ValidationError {
    pub block: usize,
    pub field: Field,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(block: usize, field: Field, kind: ValidationErrorKind) -> Self {
        Self { block, field, kind }
    }
}

/// 校验错误的具体原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("campo ausente")]
    Missing,
    #[error("o valor não pode ser vazio")]
    Empty,
    #[error("formato inválido {raw:?} (esperado {expected})")]
    Malformed { raw: String, expected: &'static str },
    #[error("campo repetido {raw:?}")]
    Duplicate { raw: String },
}

/// 封面目录读取错误
#[derive(Debug, Error)]
pub enum BinderError {
    #[error("a pasta de capas não foi encontrada: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("não foi possível ler a pasta de capas {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 封面与转播数量不一致（警告，不是错误）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingMismatch {
    /// 封面少于转播，末尾的转播没有封面（1 起始的序号）
    MissingCovers { records: usize, images: usize, uncovered: Vec<usize> },
    /// 封面多于转播，多余的文件被忽略
    ExtraImages { records: usize, images: usize, ignored: Vec<String> },
}

impl std::fmt::Display for BindingMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingMismatch::MissingCovers { records, images, uncovered } => write!(
                f,
                "há {} capas para {} transmissões; ficarão sem capa as transmissões {:?}",
                images, records, uncovered
            ),
            BindingMismatch::ExtraImages { records, images, ignored } => write!(
                f,
                "há {} capas para {} transmissões; arquivos ignorados: {}",
                images,
                records,
                ignored.join(", ")
            ),
        }
    }
}

/// 凭证获取错误（致命）
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("arquivo de segredos do cliente não encontrado: {}", .0.display())]
    ClientSecretsNotFound(PathBuf),
    #[error("arquivo de segredos do cliente inválido: {0}")]
    InvalidClientSecrets(String),
    #[error("falha ao ler/gravar o arquivo de token ({}): {source}", .path.display())]
    TokenStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("arquivo de token inválido: {0}")]
    InvalidToken(String),
    #[error("falha ao renovar as credenciais: {0}")]
    RefreshFailed(String),
    #[error("falha na autorização: {0}")]
    AuthorizationFailed(String),
    #[error("falha na requisição de token: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 远程 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("falha de rede ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    #[error("autorização expirada ({endpoint}): {message}")]
    Unauthorized { endpoint: String, message: String },
    #[error("cota excedida ou acesso negado ({endpoint}): {message}")]
    Forbidden { endpoint: String, message: String },
    #[error("recurso não encontrado ({endpoint}): {message}")]
    NotFound { endpoint: String, message: String },
    #[error("erro na API do YouTube ({endpoint}): HTTP {status}: {message}")]
    Status { endpoint: String, status: u16, message: String },
    #[error("resposta inesperada da API ({endpoint}): {message}")]
    MalformedResponse { endpoint: String, message: String },
    #[error("não foi possível ler a capa {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// 在错误信息末尾追加说明
    pub fn with_note(mut self, note: &str) -> Self {
        match &mut self {
            ApiError::Transport { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Status { message, .. }
            | ApiError::MalformedResponse { message, .. } => {
                message.push_str(" ");
                message.push_str(note);
            }
            ApiError::ImageRead { .. } => {}
        }
        self
    }
}

/// 某个阶段的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("etapa {stage}: {message}")]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, error: &ApiError) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}
