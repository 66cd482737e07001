// 封面缓存模块

mod cache;

pub use cache::ArtworkCache;
