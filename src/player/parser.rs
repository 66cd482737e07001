use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::player::types::{PlaybackState, RepeatState, ShuffleState, TrackMetadata};

/// `playerctl metadata --format` 使用的模板，每行一个 `key:value`
pub const METADATA_FORMAT: &str = "artUrl:{{mpris:artUrl}}\nartist:{{xesam:artist}}\ntitle:{{xesam:title}}\nalbum:{{xesam:album}}\nplayerName:{{playerName}}\nposition:{{position}}";

/// 从 `key:value` 文本中提取字段
///
/// 找到第一行以 `key:` 开头的内容并返回其余部分。字段缺失或为空时返回
/// `FieldNotFound`，除非 `allow_empty` 为 true，此时返回 `None`。
pub fn extract_field(text: &str, key: &str, allow_empty: bool) -> Result<Option<String>> {
    let value = text.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
    });

    match value {
        Some(value) if !value.is_empty() => Ok(Some(value.to_string())),
        _ if allow_empty => Ok(None),
        _ => Err(PlayerError::FieldNotFound {
            key: key.to_string(),
        }),
    }
}

fn required(text: &str, key: &str) -> Result<String> {
    extract_field(text, key, false)?.ok_or_else(|| PlayerError::FieldNotFound {
        key: key.to_string(),
    })
}

/// 解析 metadata 命令的输出
pub fn parse_track_metadata(text: &str) -> Result<TrackMetadata> {
    // 很多播放器不提供封面，空值交给封面缓存回退到默认图标
    let artwork_ref = extract_field(text, "artUrl", true)?.unwrap_or_default();
    let artist = required(text, "artist")?;
    let title = required(text, "title")?;
    let album = extract_field(text, "album", true)?;
    let player_name = required(text, "playerName")?;

    let position = extract_field(text, "position", true)?.and_then(|raw| {
        raw.parse::<i64>()
            .map_err(|e| debug!("无法解析播放位置 {:?}: {}", raw, e))
            .ok()
    });

    Ok(TrackMetadata {
        artwork_ref,
        artist,
        title,
        album,
        player_name,
        position,
    })
}

/// 规则的匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// 文本任意位置包含该模式
    #[default]
    Contains,
    /// 去掉首尾空白后，某一整行等于该模式
    Line,
}

/// 一条分类规则：文本匹配 `pattern`（忽略大小写）时得到 `state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRule<T> {
    pub pattern: String,
    pub state: T,
    #[serde(default)]
    pub mode: MatchMode,
}

impl<T> ClassifyRule<T> {
    fn matches(&self, haystack: &str) -> bool {
        let pattern = self.pattern.to_lowercase();
        match self.mode {
            MatchMode::Contains => haystack.contains(&pattern),
            MatchMode::Line => haystack.lines().any(|line| line.trim() == pattern),
        }
    }
}

/// 按顺序匹配的分类器
///
/// 配置文件中可以只写 `rules`，此时 `fallback` 取状态类型的默认值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier<T> {
    /// 没有规则命中时的结果
    #[serde(default)]
    pub fallback: T,
    #[serde(default)]
    pub rules: Vec<ClassifyRule<T>>,
}

impl<T: Copy> Classifier<T> {
    /// 子串匹配的规则
    pub fn new(rules: &[(&str, T)], fallback: T) -> Self {
        Self {
            fallback,
            rules: Vec::new(),
        }
        .with_rules(rules, MatchMode::Contains)
    }

    /// 追加一组规则，排在已有规则之后
    pub fn with_rules(mut self, rules: &[(&str, T)], mode: MatchMode) -> Self {
        self.rules
            .extend(rules.iter().map(|(pattern, state)| ClassifyRule {
                pattern: pattern.to_string(),
                state: *state,
                mode,
            }));
        self
    }

    pub fn classify(&self, text: &str) -> T {
        let haystack = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&haystack))
            .map(|rule| rule.state)
            .unwrap_or(self.fallback)
    }
}

/// 播放器拒绝命令时的提示文本，优先于正常取值匹配
const UNSUPPORTED_MARKERS: [&str; 3] = ["no player", "could not", "not supported"];

fn unsupported_rules<T: Copy>(state: T) -> Vec<(&'static str, T)> {
    UNSUPPORTED_MARKERS.iter().map(|marker| (*marker, state)).collect()
}

impl Default for Classifier<PlaybackState> {
    fn default() -> Self {
        Self::new(
            &[
                ("no players found", PlaybackState::NoPlayer),
                ("no player found", PlaybackState::NoPlayer),
                ("playing", PlaybackState::Playing),
                ("paused", PlaybackState::Paused),
            ],
            PlaybackState::Error,
        )
    }
}

// 随机与循环的取值都是很短的单词，只按整行匹配，避免错误信息里的 "on" 之类被误判
impl Default for Classifier<ShuffleState> {
    fn default() -> Self {
        Self::new(&unsupported_rules(ShuffleState::Unavailable), ShuffleState::Unavailable)
            .with_rules(
                &[("off", ShuffleState::Off), ("on", ShuffleState::On)],
                MatchMode::Line,
            )
    }
}

impl Default for Classifier<RepeatState> {
    fn default() -> Self {
        Self::new(&unsupported_rules(RepeatState::Unavailable), RepeatState::Unavailable)
            .with_rules(
                &[
                    ("none", RepeatState::Off),
                    ("playlist", RepeatState::Playlist),
                    ("track", RepeatState::Track),
                ],
                MatchMode::Line,
            )
    }
}
