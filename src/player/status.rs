use tracing::warn;

use crate::command::CommandRunner;
use crate::config::{ClassifySettings, PlayerSettings};
use crate::error::Result;
use crate::player::parser::{parse_track_metadata, METADATA_FORMAT};
use crate::player::types::{PlaybackState, PlayerStatusSnapshot, TrackMetadata};
use crate::utils::capitalize;

/// 通过 playerctl 读取播放器状态
#[derive(Clone)]
pub struct StatusReader {
    runner: CommandRunner,
    player: PlayerSettings,
    classify: ClassifySettings,
}

impl StatusReader {
    pub fn new(runner: CommandRunner, player: PlayerSettings, classify: ClassifySettings) -> Self {
        Self {
            runner,
            player,
            classify,
        }
    }

    /// 运行一个状态探测命令，命令无法启动时返回 None
    fn probe(&self, subcommand: &str) -> Option<String> {
        let argv = self.player.playerctl_argv([subcommand]);
        match self.runner.run(&argv, false) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("状态探测 {} 失败: {}", subcommand, e);
                None
            }
        }
    }

    /// 读取播放、随机、循环三项状态
    ///
    /// 探测文本永远不会报错：无法识别的输出归类为 Error / Unavailable。
    pub fn player_status(&self) -> PlayerStatusSnapshot {
        let playback = self
            .probe("status")
            .map(|text| self.classify.playback.classify(&text))
            .unwrap_or(self.classify.playback.fallback);
        let shuffle = self
            .probe("shuffle")
            .map(|text| self.classify.shuffle.classify(&text))
            .unwrap_or(self.classify.shuffle.fallback);
        let repeat = self
            .probe("loop")
            .map(|text| self.classify.repeat.classify(&text))
            .unwrap_or(self.classify.repeat.fallback);

        PlayerStatusSnapshot {
            playback,
            shuffle,
            repeat,
        }
    }

    /// 读取当前曲目
    pub fn current_media(&self) -> Result<TrackMetadata> {
        let argv = self
            .player
            .playerctl_argv(["metadata", "--format", METADATA_FORMAT]);
        let output = self.runner.run(&argv, true)?;
        let mut track = parse_track_metadata(&output)?;
        track.player_name = capitalize(&track.player_name);
        Ok(track)
    }

    /// 列出所有已注册的播放器（总线名）
    pub fn list_players(&self) -> Result<Vec<String>> {
        let argv = vec![self.player.playerctl.clone(), "-l".to_string()];
        let output = self.runner.run(&argv, false)?;

        if self.classify.playback.classify(&output) == PlaybackState::NoPlayer {
            return Ok(Vec::new());
        }

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// 总线名的显示名称，例如 `spotify.instance12` -> `Spotify`
pub fn display_player_name(bus_name: &str) -> String {
    capitalize(bus_name.split('.').next().unwrap_or(bus_name))
}
