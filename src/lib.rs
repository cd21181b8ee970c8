pub mod config;
pub mod cron;
pub mod models;
pub mod store;
pub mod subgraph;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use cron::CronScheduler;
pub use store::Store;
pub use subgraph::DexClients;
pub use worker::DexFetcher;
