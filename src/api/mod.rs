//! API 模块
//!
//! 负责所有与远程转播平台的交互

pub mod broadcast_api;
pub mod youtube;

pub use broadcast_api::{watch_url, BroadcastApi, BroadcastMetadata, CreatedBroadcast, Visibility};
pub use youtube::YouTubeClient;
