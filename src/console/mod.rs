//! 终端交互层
//!
//! 薄的一层提示与展示，校验和业务判断都在 services 中完成。

pub mod intake;
pub mod prompter;

pub use intake::InputMode;
pub use prompter::{Prompter, StdPrompter};
