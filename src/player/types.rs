use serde::{Deserialize, Serialize};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused,
    /// 控制工具运行了，但输出无法识别
    #[default]
    Error,
    /// 当前没有可控制的播放器
    NoPlayer,
}

/// 随机播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleState {
    On,
    Off,
    /// 播放器不支持随机播放
    #[default]
    Unavailable,
}

/// 循环模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatState {
    Off,
    Playlist,
    Track,
    #[default]
    Unavailable,
}

const REPEAT_CYCLE: [RepeatState; 3] = [RepeatState::Off, RepeatState::Playlist, RepeatState::Track];

impl RepeatState {
    /// 循环顺序中的下一个模式，Unavailable 保持不变
    pub fn next(self) -> Self {
        match REPEAT_CYCLE.iter().position(|state| *state == self) {
            Some(index) => REPEAT_CYCLE[(index + 1) % REPEAT_CYCLE.len()],
            None => self,
        }
    }

    /// `playerctl loop` 接受的参数
    pub fn loop_arg(self) -> Option<&'static str> {
        match self {
            RepeatState::Off => Some("None"),
            RepeatState::Playlist => Some("Playlist"),
            RepeatState::Track => Some("Track"),
            RepeatState::Unavailable => None,
        }
    }
}

/// 某一时刻的播放器状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerStatusSnapshot {
    pub playback: PlaybackState,
    pub shuffle: ShuffleState,
    pub repeat: RepeatState,
}

/// 当前曲目信息
///
/// `artist`、`title`、`player_name` 保证非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    /// 本地路径、`file://` URI 或 http(s) URL
    pub artwork_ref: String,
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub player_name: String,
    /// 控制工具报告的播放位置，只做相对比较
    pub position: Option<i64>,
}

/// 用户可以触发的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PlayPause,
    Next,
    Previous,
    ToggleShuffle,
    AdvanceRepeat,
    SetVolume(i64),
    Mute,
    Seek(String),
    SelectPlayer(String),
}

/// 执行操作后的结果
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub status: PlayerStatusSnapshot,
    /// 收敛等待期间最后一次读到的曲目
    pub media: Option<TrackMetadata>,
    /// 只有需要等待收敛的操作才有值
    pub settled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_cycle() {
        assert_eq!(RepeatState::Off.next(), RepeatState::Playlist);
        assert_eq!(RepeatState::Playlist.next(), RepeatState::Track);
        assert_eq!(RepeatState::Track.next(), RepeatState::Off);
        assert_eq!(RepeatState::Unavailable.next(), RepeatState::Unavailable);
        assert_eq!(
            RepeatState::Unavailable.next().next(),
            RepeatState::Unavailable
        );
    }

    #[test]
    fn test_loop_arg() {
        assert_eq!(RepeatState::Off.loop_arg(), Some("None"));
        assert_eq!(RepeatState::Track.loop_arg(), Some("Track"));
        assert_eq!(RepeatState::Unavailable.loop_arg(), None);
    }
}
