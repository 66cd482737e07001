use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::artwork::ArtworkCache;
use crate::command::{CommandExecutor, CommandRunner, SystemExecutor};
use crate::config::Config;
use crate::error::Result;
use crate::player::convergence::{
    next_track_settled, previous_track_settled, repeat_settled, Clock, ConvergenceWaiter,
    SystemClock,
};
use crate::player::dispatcher::Dispatcher;
use crate::player::status::StatusReader;
use crate::player::types::{
    Action, ActionOutcome, PlayerStatusSnapshot, RepeatState, ShuffleState, TrackMetadata,
};

/// 播放器引擎
/// 对外提供状态查询与操作执行，每个进程构造一次，依赖通过构造函数注入
#[derive(Clone)]
pub struct PlayerEngine {
    status: StatusReader,
    dispatcher: Dispatcher,
    waiter: ConvergenceWaiter,
    artwork: ArtworkCache,
}

impl PlayerEngine {
    /// 使用真实进程与系统时钟创建引擎
    pub fn new(config: &Config) -> Self {
        Self::with_parts(config, Arc::new(SystemExecutor), Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: &Config,
        executor: Arc<dyn CommandExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let runner = CommandRunner::new(executor);
        Self {
            status: StatusReader::new(
                runner.clone(),
                config.player.clone(),
                config.classify.clone(),
            ),
            dispatcher: Dispatcher::new(runner.clone(), config.player.clone()),
            waiter: ConvergenceWaiter::new(
                clock,
                config.convergence.poll_interval(),
                config.convergence.timeout(),
            ),
            artwork: ArtworkCache::new(runner, config.artwork.clone()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn get_player_status(&self) -> PlayerStatusSnapshot {
        self.status.player_status()
    }

    pub fn get_current_media(&self) -> Result<TrackMetadata> {
        self.status.current_media()
    }

    pub fn list_players(&self) -> Result<Vec<String>> {
        self.status.list_players()
    }

    pub fn resolve_artwork(&self, media: &TrackMetadata) -> PathBuf {
        self.artwork.resolve(media)
    }

    /// 执行一个用户操作
    ///
    /// 下一曲、上一曲与循环模式会等待外部状态收敛（或超时）后再返回，
    /// 其余操作发出命令后立即返回。
    pub fn perform(&self, action: Action) -> Result<ActionOutcome> {
        debug!("执行操作: {:?}", action);

        let (media, settled) = match action {
            Action::PlayPause => {
                self.dispatcher.toggle_play_pause()?;
                (None, None)
            }
            Action::Next => self.skip_track(true)?,
            Action::Previous => self.skip_track(false)?,
            Action::ToggleShuffle => {
                let before = self.get_player_status();
                if before.shuffle == ShuffleState::Unavailable {
                    info!("当前播放器不支持随机播放，忽略");
                } else {
                    self.dispatcher.toggle_shuffle()?;
                }
                (None, None)
            }
            Action::AdvanceRepeat => {
                let before = self.get_player_status().repeat;
                if before == RepeatState::Unavailable {
                    info!("当前播放器不支持循环模式，忽略");
                    (None, None)
                } else {
                    self.dispatcher.advance_repeat(before)?;
                    let result = self.waiter.wait_for(
                        || Ok(self.get_player_status().repeat),
                        |now| repeat_settled(before, *now),
                    );
                    (None, Some(result.settled))
                }
            }
            Action::SetVolume(percent) => {
                self.dispatcher.set_global_volume(percent)?;
                (None, None)
            }
            Action::Mute => {
                self.dispatcher.mute()?;
                (None, None)
            }
            Action::Seek(position) => {
                self.dispatcher.seek(&position)?;
                (None, None)
            }
            Action::SelectPlayer(name) => {
                self.dispatcher.switch_active_player(&name)?;
                (None, None)
            }
        };

        Ok(ActionOutcome {
            status: self.get_player_status(),
            media,
            settled,
        })
    }

    /// 切歌并等待标题（或上一曲时的播放位置）变化
    fn skip_track(&self, forward: bool) -> Result<(Option<TrackMetadata>, Option<bool>)> {
        let before = match self.get_current_media() {
            Ok(track) => Some(track),
            Err(e) => {
                debug!("切歌前无法读取当前曲目，不等待收敛: {}", e);
                None
            }
        };

        if forward {
            self.dispatcher.skip_next()?;
        } else {
            self.dispatcher.skip_previous()?;
        }

        let Some(before) = before else {
            return Ok((self.get_current_media().ok(), None));
        };

        let result = self.waiter.wait_for(
            || self.get_current_media(),
            |now| {
                if forward {
                    next_track_settled(&before, now)
                } else {
                    previous_track_settled(&before, now)
                }
            },
        );
        Ok((result.last, Some(result.settled)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::command::argv;
    use crate::error::PlayerError;
    use crate::player::PlaybackState;
    use crate::testing::{failed, metadata_output, ok, FakeClock, FakeExecutor};

    fn engine(fake: Arc<FakeExecutor>, clock: Arc<FakeClock>) -> PlayerEngine {
        PlayerEngine::with_parts(&Config::default(), fake, clock)
    }

    fn is_mutation(argv: &[String], command: &str) -> bool {
        argv.last().map(String::as_str) == Some(command)
    }

    #[test]
    fn test_next_waits_for_title_change() {
        let metadata_polls = Arc::new(AtomicUsize::new(0));
        let polls = metadata_polls.clone();
        let fake = Arc::new(FakeExecutor::new(move |argv| {
            if argv.contains(&"metadata".to_string()) {
                // 切歌前读一次，之后依次返回 A、A、B
                let n = polls.fetch_add(1, Ordering::SeqCst);
                let title = if n < 3 { "A" } else { "B" };
                metadata_output(title, 0)
            } else if is_mutation(argv, "status") {
                ok("Playing")
            } else {
                ok("")
            }
        }));
        let clock = Arc::new(FakeClock::new());

        let outcome = engine(fake.clone(), clock.clone()).perform(Action::Next).unwrap();

        assert_eq!(outcome.settled, Some(true));
        assert_eq!(outcome.media.unwrap().title, "B");
        assert_eq!(outcome.status.playback, PlaybackState::Playing);
        assert_eq!(metadata_polls.load(Ordering::SeqCst), 4);
        assert!(clock.elapsed() < Duration::from_secs(3));
        assert!(fake
            .calls()
            .contains(&argv(["playerctl", "--player", "playerctld", "next"])));
    }

    #[test]
    fn test_previous_accepts_position_reset() {
        let metadata_polls = Arc::new(AtomicUsize::new(0));
        let polls = metadata_polls.clone();
        let fake = Arc::new(FakeExecutor::new(move |argv| {
            if argv.contains(&"metadata".to_string()) {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                let position = if n == 0 { 90_000_000 } else { 1_000 };
                metadata_output("Same", position)
            } else {
                ok("")
            }
        }));

        let outcome = engine(fake, Arc::new(FakeClock::new()))
            .perform(Action::Previous)
            .unwrap();
        assert_eq!(outcome.settled, Some(true));
        assert_eq!(metadata_polls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_next_times_out_softly() {
        let fake = Arc::new(FakeExecutor::new(|argv| {
            if argv.contains(&"metadata".to_string()) {
                metadata_output("Stuck", 0)
            } else {
                ok("")
            }
        }));
        let clock = Arc::new(FakeClock::new());

        let outcome = engine(fake, clock.clone()).perform(Action::Next).unwrap();
        assert_eq!(outcome.settled, Some(false));
        assert_eq!(outcome.media.unwrap().title, "Stuck");
        assert!(clock.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_next_failure_propagates() {
        let fake = Arc::new(FakeExecutor::new(|argv| {
            if is_mutation(argv, "next") {
                failed("Could not execute command")
            } else {
                metadata_output("A", 0)
            }
        }));

        let result = engine(fake, Arc::new(FakeClock::new())).perform(Action::Next);
        assert!(matches!(result, Err(PlayerError::ExternalCommand { .. })));
    }

    #[test]
    fn test_next_without_player_skips_waiting() {
        let fake = Arc::new(FakeExecutor::new(|argv| {
            if argv.contains(&"metadata".to_string()) {
                failed("No players found")
            } else {
                ok("")
            }
        }));
        let clock = Arc::new(FakeClock::new());

        let outcome = engine(fake, clock.clone()).perform(Action::Next).unwrap();
        assert_eq!(outcome.settled, None);
        assert!(outcome.media.is_none());
        assert_eq!(clock.sleeps(), 0);
    }

    #[test]
    fn test_repeat_advances_and_waits() {
        let loop_polls = Arc::new(AtomicUsize::new(0));
        let polls = loop_polls.clone();
        let fake = Arc::new(FakeExecutor::new(move |argv| {
            if is_mutation(argv, "loop") {
                // 第一次读取是操作前的快照，之后两次仍是旧值
                let n = polls.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    ok("None")
                } else {
                    ok("Playlist")
                }
            } else {
                ok("")
            }
        }));

        let outcome = engine(fake.clone(), Arc::new(FakeClock::new()))
            .perform(Action::AdvanceRepeat)
            .unwrap();

        assert_eq!(outcome.settled, Some(true));
        assert_eq!(outcome.status.repeat, RepeatState::Playlist);
        assert!(fake
            .calls()
            .contains(&argv(["playerctl", "--player", "playerctld", "loop", "Playlist"])));
    }

    #[test]
    fn test_unavailable_states_are_never_mutated() {
        let fake = Arc::new(FakeExecutor::new(|_| {
            failed("No player could handle this command")
        }));
        let engine = engine(fake.clone(), Arc::new(FakeClock::new()));

        let outcome = engine.perform(Action::AdvanceRepeat).unwrap();
        assert_eq!(outcome.settled, None);
        engine.perform(Action::ToggleShuffle).unwrap();

        assert!(!fake.calls().iter().any(|call| {
            call.contains(&"toggle".to_string()) || call.len() > 4
        }));
    }

    #[test]
    fn test_shuffle_not_toggled_on_unrecognized_output() {
        let fake = Arc::new(FakeExecutor::new(|argv| match argv.last().map(String::as_str) {
            Some("shuffle") => failed("Failed to connect to the session bus"),
            _ => ok(""),
        }));
        let engine = engine(fake.clone(), Arc::new(FakeClock::new()));

        let outcome = engine.perform(Action::ToggleShuffle).unwrap();
        assert_eq!(outcome.status.shuffle, ShuffleState::Unavailable);
        assert!(!fake.calls().iter().any(|call| call.contains(&"toggle".to_string())));
    }

    #[test]
    fn test_fire_and_forget_actions() {
        let fake = Arc::new(FakeExecutor::silent());
        let clock = Arc::new(FakeClock::new());
        let engine = engine(fake.clone(), clock.clone());

        engine.perform(Action::PlayPause).unwrap();
        engine.perform(Action::SetVolume(150)).unwrap();
        engine.perform(Action::Mute).unwrap();
        engine.perform(Action::Seek("30".to_string())).unwrap();
        engine.perform(Action::SelectPlayer("vlc".to_string())).unwrap();

        assert_eq!(clock.sleeps(), 0);
        let calls = fake.calls();
        assert!(calls.contains(&argv(["pactl", "set-sink-volume", "@DEFAULT_SINK@", "100%"])));
        assert!(calls.contains(&argv(["pactl", "set-sink-volume", "@DEFAULT_SINK@", "0%"])));
        assert!(calls.contains(&argv(["playerctl", "--player", "vlc", "play-pause"])));
    }
}
