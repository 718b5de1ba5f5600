// Public modules
pub mod announce;
pub mod channels;
pub mod config;
pub mod feed;
pub mod models;
pub mod resolve;
pub mod run;
pub mod selection;
pub mod source;
pub mod state;
pub mod youtube_api;

// Re-export commonly used types
pub use announce::{Announcer, DiscordWebhook};
pub use config::{Config, ConfigError};
pub use models::{ChannelInfo, Video};
pub use run::{run_channels, ChannelError, RunReport};
pub use selection::{next_marker, select_new_videos};
pub use source::{FetchStrategy, VideoSource, YouTubeSource};
pub use state::{load_state, save_state, StateMap, DEFAULT_STATE_FILE};
