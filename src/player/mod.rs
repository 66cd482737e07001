// 播放器控制模块
// 状态读取、命令分发与收敛等待

mod convergence;
mod dispatcher;
mod manager;
mod parser;
mod status;
mod types;

pub use convergence::{
    next_track_settled, previous_track_settled, repeat_settled, Clock, Convergence,
    ConvergenceWaiter, SystemClock,
};
pub use dispatcher::Dispatcher;
pub use manager::PlayerEngine;
pub use parser::{
    extract_field, parse_track_metadata, Classifier, ClassifyRule, MatchMode, METADATA_FORMAT,
};
pub use status::{display_player_name, StatusReader};
pub use types::*;
