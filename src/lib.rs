// 播放器控制核心库

// 模块导出
pub mod artwork;
pub mod command;
pub mod config;
pub mod error;
pub mod player;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{PlayerError, Result};
pub use player::{Action, ActionOutcome, PlayerEngine};
