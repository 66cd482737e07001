use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::player::{Classifier, PlaybackState, RepeatState, ShuffleState};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// 播放器控制设置
    pub player: PlayerSettings,

    /// 变更命令后的收敛等待设置
    pub convergence: ConvergenceSettings,

    /// 封面缓存设置
    pub artwork: ArtworkSettings,

    /// 状态文本分类规则
    pub classify: ClassifySettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerSettings {
    /// 控制目标，默认交给 playerctld 选择最近活跃的播放器
    pub target: String,

    /// playerctl 可执行文件
    pub playerctl: String,

    /// pactl 可执行文件
    pub pactl: String,
}

impl PlayerSettings {
    /// `playerctl --player <target> <args...>`
    pub fn playerctl_argv<'a, I>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut argv = vec![
            self.playerctl.clone(),
            "--player".to_string(),
            self.target.clone(),
        ];
        argv.extend(args.into_iter().map(str::to_string));
        argv
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            target: "playerctld".to_string(),
            playerctl: "playerctl".to_string(),
            pactl: "pactl".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConvergenceSettings {
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,

    /// 最长等待时间（毫秒）
    pub timeout_ms: u64,
}

impl ConvergenceSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ArtworkSettings {
    /// 缩略图缓存目录
    pub cache_dir: PathBuf,

    /// 无法获取封面时使用的图标
    pub fallback_icon: PathBuf,

    /// 超过该数量时触发清理
    pub max_entries: usize,

    /// 每次清理删除的最旧文件数
    pub evict_batch: usize,

    /// 下载超时（秒）
    pub fetch_timeout_secs: f64,

    /// wget 可执行文件
    pub wget: String,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        let pkg_name = env!("CARGO_PKG_NAME");
        Self {
            cache_dir: std::env::temp_dir().join(pkg_name).join("media-thumbnails"),
            fallback_icon: PathBuf::from("images/icon.png"),
            max_entries: 50,
            evict_batch: 35,
            fetch_timeout_secs: 0.3,
            wget: "wget".to_string(),
        }
    }
}

/// 状态文本分类规则，按顺序匹配，先命中者优先
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ClassifySettings {
    pub playback: Classifier<PlaybackState>,
    pub shuffle: Classifier<ShuffleState>,
    pub repeat: Classifier<RepeatState>,
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        let pkg_name = env!("CARGO_PKG_NAME");
        dirs::config_dir()
            .map(|p| p.join(pkg_name).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(format!("{}-config.toml", pkg_name)))
    }

    /// 加载配置，支持从指定路径或默认路径加载
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        debug!("尝试从 {:?} 加载配置文件", config_path);

        if !config_path.exists() {
            debug!("配置文件 {:?} 不存在，将创建默认配置", config_path);
            let default_config = Config::default();
            let toml = toml::to_string_pretty(&default_config)?;

            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
                debug!("已确保目录 {:?} 存在", parent);
            }

            fs::write(&config_path, toml)?;
            info!("已创建默认配置文件: {:?}", config_path);
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = match toml::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("解析配置文件 {:?} 失败: {}", config_path, e);
                warn!("由于解析错误，将加载默认配置");
                Config::default()
            }
        };

        debug!("已成功加载配置文件");
        Ok(config)
    }
}
