use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use playerctl_engine::player::{display_player_name, PlayerStatusSnapshot, TrackMetadata};
use playerctl_engine::{Action, ActionOutcome, Config, PlayerEngine};

#[derive(Parser, Debug)]
#[command(name = "playerctl-engine", version, about)]
struct Args {
    /// 配置文件路径（默认位于用户配置目录）
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(long, short = 'v')]
    verbose: bool,

    /// 以 JSON 格式输出结果
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 显示播放、随机与循环状态
    Status,
    /// 显示当前曲目
    NowPlaying {
        /// 同时解析封面的本地路径
        #[arg(long)]
        artwork: bool,
    },
    /// 列出所有播放器
    Players,
    /// 播放/暂停
    PlayPause,
    /// 下一曲
    Next,
    /// 上一曲
    Previous,
    /// 切换随机播放
    Shuffle,
    /// 切换到下一个循环模式
    Repeat,
    /// 设置全局音量（0-100）
    Volume {
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },
    /// 静音
    Mute,
    /// 跳转播放位置，例如 `30` 或 `10+`
    Seek { position: String },
    /// 切换活跃播放器
    Switch { player: String },
}

#[derive(Serialize)]
struct NowPlaying {
    #[serde(flatten)]
    track: TrackMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    artwork_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct PlayerEntry {
    bus_name: String,
    display_name: String,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(status: &PlayerStatusSnapshot) {
    println!("播放: {:?}", status.playback);
    println!("随机: {:?}", status.shuffle);
    println!("循环: {:?}", status.repeat);
}

fn print_track(track: &TrackMetadata) {
    println!("{} - {}", track.artist, track.title);
    if let Some(album) = &track.album {
        println!("专辑: {}", album);
    }
    println!("播放器: {}", track.player_name);
}

fn print_outcome(outcome: &ActionOutcome) {
    if let Some(track) = &outcome.media {
        print_track(track);
    }
    if outcome.settled == Some(false) {
        println!("等待超时，以下为最后观察到的状态");
    }
    print_status(&outcome.status);
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load(args.config)?;
    debug!("配置加载完成: {:?}", config);
    let engine = PlayerEngine::new(&config);

    let action = match args.command {
        Command::Status => {
            let status = engine.get_player_status();
            return if args.json {
                print_json(&status)
            } else {
                print_status(&status);
                Ok(())
            };
        }
        Command::NowPlaying { artwork } => {
            let track = engine.get_current_media()?;
            let artwork_path = artwork.then(|| engine.resolve_artwork(&track));
            let now_playing = NowPlaying {
                track,
                artwork_path,
            };
            return if args.json {
                print_json(&now_playing)
            } else {
                print_track(&now_playing.track);
                if let Some(path) = &now_playing.artwork_path {
                    println!("封面: {}", path.display());
                }
                Ok(())
            };
        }
        Command::Players => {
            let players: Vec<PlayerEntry> = engine
                .list_players()?
                .into_iter()
                .map(|bus_name| PlayerEntry {
                    display_name: display_player_name(&bus_name),
                    bus_name,
                })
                .collect();
            return if args.json {
                print_json(&players)
            } else {
                if players.is_empty() {
                    println!("没有找到播放器");
                }
                for player in &players {
                    println!("{}\t{}", player.display_name, player.bus_name);
                }
                Ok(())
            };
        }
        Command::PlayPause => Action::PlayPause,
        Command::Next => Action::Next,
        Command::Previous => Action::Previous,
        Command::Shuffle => Action::ToggleShuffle,
        Command::Repeat => Action::AdvanceRepeat,
        Command::Volume { percent } => Action::SetVolume(percent),
        Command::Mute => Action::Mute,
        Command::Seek { position } => Action::Seek(position),
        Command::Switch { player } => Action::SelectPlayer(player),
    };

    let outcome = engine.perform(action)?;
    if args.json {
        print_json(&outcome)
    } else {
        print_outcome(&outcome);
        Ok(())
    }
}
