use tracing::{debug, info};

use crate::command::{argv, CommandRunner};
use crate::config::PlayerSettings;
use crate::error::Result;
use crate::player::types::RepeatState;

/// 命令分发器，每个用户意图对应一条固定的外部命令
///
/// 所有命令都要求退出码为零，失败原样向上传递，由调用方转换为提示信息。
#[derive(Clone)]
pub struct Dispatcher {
    runner: CommandRunner,
    player: PlayerSettings,
}

impl Dispatcher {
    pub fn new(runner: CommandRunner, player: PlayerSettings) -> Self {
        Self { runner, player }
    }

    fn playerctl<'a, I>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.runner.run(&self.player.playerctl_argv(args), true)?;
        Ok(())
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.playerctl(["play-pause"])
    }

    pub fn skip_next(&self) -> Result<()> {
        self.playerctl(["next"])
    }

    pub fn skip_previous(&self) -> Result<()> {
        self.playerctl(["previous"])
    }

    pub fn toggle_shuffle(&self) -> Result<()> {
        self.playerctl(["shuffle", "toggle"])
    }

    /// 切换到 `current` 的下一个循环模式，返回发送的目标模式
    pub fn advance_repeat(&self, current: RepeatState) -> Result<RepeatState> {
        let target = current.next();
        match target.loop_arg() {
            Some(arg) => {
                info!("循环模式 {:?} -> {:?}", current, target);
                self.playerctl(["loop", arg])?;
            }
            None => debug!("播放器不支持循环模式，忽略"),
        }
        Ok(target)
    }

    /// 设置全局音量，超出 [0, 100] 的值会被截断
    pub fn set_global_volume(&self, percent: i64) -> Result<()> {
        let volume = percent.clamp(0, 100);
        info!("设置全局音量: {}%", volume);
        let volume_arg = format!("{}%", volume);
        self.runner.run(
            &argv([
                self.player.pactl.as_str(),
                "set-sink-volume",
                "@DEFAULT_SINK@",
                volume_arg.as_str(),
            ]),
            true,
        )?;
        Ok(())
    }

    pub fn mute(&self) -> Result<()> {
        self.set_global_volume(0)
    }

    /// 跳转到指定位置，格式由 playerctl 解释（秒数，或带 +/- 的相对值）
    pub fn seek(&self, position: &str) -> Result<()> {
        self.playerctl(["position", position])
    }

    /// 切换活跃播放器
    ///
    /// playerctld 没有直接"选中播放器"的命令：先暂停全部播放器，再对目标依次
    /// play、pause、play-pause，让它成为最近活跃的播放器。
    pub fn switch_active_player(&self, name: &str) -> Result<()> {
        info!("切换到播放器: {}", name);
        let playerctl = self.player.playerctl.as_str();
        self.runner
            .run(&argv([playerctl, "--all-players", "pause"]), true)?;
        for command in ["play", "pause", "play-pause"] {
            self.runner
                .run(&argv([playerctl, "--player", name, command]), true)?;
        }
        Ok(())
    }
}
