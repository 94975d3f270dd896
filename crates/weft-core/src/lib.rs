pub mod config;
pub mod error;
pub mod settings;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{ErrorCode, Result, WeftError};
pub use settings::{RawSettings, Setting, SettingsMap};
pub use types::*;
