#[allow(clippy::module_inception)]
mod config;

pub use config::{
    DexSettings, ExportSettings, HttpSettings, LoggingSettings, RefreshSettings, Settings,
};
