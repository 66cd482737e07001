use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::command::{argv, CommandRunner};
use crate::config::ArtworkSettings;
use crate::player::TrackMetadata;
use crate::utils::thumbnail_file_name;

/// 封面缩略图缓存
///
/// 缓存条目只是目录中的文件，没有额外索引：存在性靠文件系统判断，
/// 清理按创建时间排序。
#[derive(Clone)]
pub struct ArtworkCache {
    runner: CommandRunner,
    settings: ArtworkSettings,
}

impl ArtworkCache {
    pub fn new(runner: CommandRunner, settings: ArtworkSettings) -> Self {
        Self { runner, settings }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.settings.cache_dir
    }

    pub fn fallback_icon(&self) -> &Path {
        &self.settings.fallback_icon
    }

    /// 把曲目的封面解析为本地路径
    ///
    /// 永远不会失败：拿不到封面时返回默认图标。
    pub fn resolve(&self, track: &TrackMetadata) -> PathBuf {
        let cache_dir = self.cache_dir();
        if let Err(e) = fs::create_dir_all(cache_dir) {
            warn!("无法创建封面缓存目录 {:?}: {}", cache_dir, e);
        }

        let local_path = cache_dir.join(thumbnail_file_name(&track.title, &track.artist));
        if local_path.exists() {
            debug!("封面缓存命中: {:?}", local_path);
            return local_path;
        }

        self.evict_if_needed();

        let artwork_ref = track.artwork_ref.as_str();
        if let Some(path) = artwork_ref.strip_prefix("file://") {
            let path = PathBuf::from(path);
            return if path.exists() {
                path
            } else {
                debug!("本地封面不存在: {:?}", path);
                self.fallback_icon().to_path_buf()
            };
        }

        if artwork_ref.starts_with("http://") || artwork_ref.starts_with("https://") {
            return self.download(artwork_ref, &local_path);
        }

        debug!("不支持的封面地址: {:?}", artwork_ref);
        self.fallback_icon().to_path_buf()
    }

    /// 缓存条目超过上限时，一次删除一批最旧的文件
    fn evict_if_needed(&self) {
        let mut entries = match self.cached_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("无法读取封面缓存目录 {:?}: {}", self.cache_dir(), e);
                return;
            }
        };

        if entries.len() <= self.settings.max_entries {
            return;
        }

        entries.sort_by_key(|(created, _)| *created);
        let batch = self.settings.evict_batch.min(entries.len());
        info!("封面缓存共 {} 个文件，清理最旧的 {} 个", entries.len(), batch);

        for (_, path) in entries.into_iter().take(batch) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("删除旧封面 {:?} 失败: {}", path, e);
            }
        }
    }

    /// 缓存目录中的 png 文件及其创建时间
    fn cached_entries(&self) -> std::io::Result<Vec<(SystemTime, PathBuf)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.cache_dir())? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "png") {
                continue;
            }
            if let Some(created) = created_time(&path) {
                entries.push((created, path));
            }
        }
        Ok(entries)
    }

    fn download(&self, url: &str, local_path: &Path) -> PathBuf {
        let timeout = self.settings.fetch_timeout_secs.to_string();
        let target = local_path.to_string_lossy();
        let command = argv([
            self.settings.wget.as_str(),
            "-t",
            "1",
            "-T",
            timeout.as_str(),
            "-O",
            &*target,
            url,
        ]);

        match self.runner.run(&command, true) {
            Ok(_) if local_path.exists() => {
                debug!("已下载封面 {} -> {:?}", url, local_path);
                local_path.to_path_buf()
            }
            Ok(_) => {
                warn!("下载封面 {} 后未找到文件 {:?}", url, local_path);
                self.fallback_icon().to_path_buf()
            }
            Err(e) => {
                if local_path.exists() {
                    if let Err(remove_err) = fs::remove_file(local_path) {
                        warn!("删除不完整的封面 {:?} 失败: {}", local_path, remove_err);
                    }
                }
                warn!("下载封面 {} 失败: {}", url, e);
                self.fallback_icon().to_path_buf()
            }
        }
    }
}

/// 文件的创建时间，部分文件系统不记录创建时间，退回到修改时间
///
/// 读取元数据失败（例如文件刚被删除）时返回 None，该文件不参与清理。
fn created_time(path: &Path) -> Option<SystemTime> {
    match fs::metadata(path) {
        Ok(metadata) => Some(
            metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH),
        ),
        Err(e) => {
            warn!("无法读取封面文件 {:?} 的元数据，跳过: {}", path, e);
            None
        }
    }
}
