//! 终端交互的最小封装
//!
//! 对任意 `BufRead` / `Write` 通用，测试时用 `Cursor` 和 `Vec<u8>` 代替标准输入输出。

use std::fmt::Display;
use std::io::{self, BufRead, Read, Stdin, StdinLock, Stdout, Write};

/// 标准输入输出上的提示器
pub type StdPrompter = Prompter<StdinLock<'static>, Stdout>;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl StdPrompter {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Prompter::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 输出一行
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()
    }

    /// 显示提示并读取一行（去掉首尾空白），输入结束时返回 `None`
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// 是/否确认，`s` / `sim` 为是，输入结束视为否
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} (s/n): ", prompt))?;
        Ok(matches!(
            answer.as_deref().map(str::to_lowercase).as_deref(),
            Some("s") | Some("sim")
        ))
    }

    /// 读取直到输入结束（批量粘贴）
    pub fn read_until_eof(&mut self) -> io::Result<String> {
        let mut text = String::new();
        self.input.read_to_string(&mut text)?;
        Ok(text)
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}
