//! 本地回环授权接收器
//!
//! 在 127.0.0.1 的临时端口上等待 OAuth 重定向，取出授权码。
//! 浏览器的预连接、favicon 等无关请求会被忽略，直到收到带 `code` 或 `error` 的请求。

use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::error::AuthError;

/// 等待用户在浏览器中完成授权的最长时间
pub const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_PAGE: &str = "<html><body><h3>Autorização concluída. Você já pode fechar esta janela.</h3></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Falha na autorização. Volte ao terminal.</h3></body></html>";

/// 一次请求的分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Code(String),
    Denied(String),
    /// 与授权无关的请求
    Unrelated,
}

/// 等待重定向请求并返回其中的授权码
pub async fn receive_code(listener: TcpListener) -> Result<String, AuthError> {
    receive_code_within(listener, AUTHORIZATION_TIMEOUT).await
}

pub async fn receive_code_within(
    listener: TcpListener,
    timeout: Duration,
) -> Result<String, AuthError> {
    tokio::time::timeout(timeout, accept_until_redirect(listener))
        .await
        .map_err(|_| {
            AuthError::AuthorizationFailed(format!(
                "tempo esgotado aguardando a autorização ({}s)",
                timeout.as_secs()
            ))
        })?
}

async fn accept_until_redirect(listener: TcpListener) -> Result<String, AuthError> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(|e| {
            AuthError::AuthorizationFailed(format!("não foi possível receber o redirecionamento: {}", e))
        })?;
        debug!("收到来自 {} 的连接", peer);

        // 单个连接读失败（如预连接后直接关闭）不影响继续等待
        let (line, mut stream) = match read_request_line(stream).await {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                debug!("读取请求失败，继续等待: {}", e);
                continue;
            }
        };

        match classify(&line) {
            Redirect::Code(code) => {
                respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
                return Ok(code);
            }
            Redirect::Denied(reason) => {
                respond(&mut stream, "200 OK", FAILURE_PAGE).await;
                return Err(AuthError::AuthorizationFailed(format!(
                    "acesso negado pelo usuário: {}",
                    reason
                )));
            }
            Redirect::Unrelated => {
                debug!("忽略无关请求: {}", line.trim());
                respond(&mut stream, "404 Not Found", "").await;
            }
        }
    }
}

/// 读取请求行并读完请求头；连接直接关闭时返回 `None`
async fn read_request_line(stream: TcpStream) -> std::io::Result<Option<(String, TcpStream)>> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }

    let mut header = String::new();
    loop {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }

    Ok(Some((request_line, reader.into_inner())))
}

async fn respond(stream: &mut TcpStream, status: &str, page: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        page.len(),
        page
    );
    // 浏览器提前断开不影响结果
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// 分类 `GET /?code=...&scope=... HTTP/1.1`
pub fn classify(request_line: &str) -> Redirect {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return Redirect::Unrelated;
    };
    let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", target)) else {
        return Redirect::Unrelated;
    };

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Redirect::Denied(value.to_string()),
            "code" if !value.is_empty() => code = Some(value.to_string()),
            _ => {}
        }
    }
    code.map(Redirect::Code).unwrap_or(Redirect::Unrelated)
}

/// 从单个请求行中取出授权码
pub fn parse_redirect(request_line: &str) -> Result<String, AuthError> {
    match classify(request_line) {
        Redirect::Code(code) => Ok(code),
        Redirect::Denied(reason) => Err(AuthError::AuthorizationFailed(format!(
            "acesso negado pelo usuário: {}",
            reason
        ))),
        Redirect::Unrelated => Err(AuthError::AuthorizationFailed(
            "o redirecionamento não trouxe o código de autorização".to_string(),
        )),
    }
}
