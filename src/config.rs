//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::client::ClientConfig;
use crate::error::{Error, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "foodoscope")]
#[command(version)]
#[command(about = "Recipe search and weekly meal planner", long_about = None)]
pub struct Config {
    /// Address the UI server listens on
    #[arg(long, env = "FOODOSCOPE_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Root URL of the recipe search service
    #[arg(long, env = "FOODOSCOPE_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    #[arg(long, env = "FOODOSCOPE_SEARCH_PATH", default_value = "/search")]
    pub search_path: String,

    /// Request timeout in seconds
    #[arg(long, env = "FOODOSCOPE_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Number of results requested by the search bar
    #[arg(long, env = "FOODOSCOPE_TOP_K", default_value_t = 20)]
    pub top_k: usize,

    /// Number of results requested by the planner form
    #[arg(long, env = "FOODOSCOPE_PLAN_TOP_K", default_value_t = 30)]
    pub plan_top_k: usize,

    /// Directory holding the UI script and stylesheet
    #[arg(long, env = "FOODOSCOPE_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Seed for plan shuffling, for reproducible plans
    #[arg(long, env = "FOODOSCOPE_SEED")]
    pub seed: Option<u64>,

    /// Log filter, e.g. `info` or `foodoscope=debug`
    #[arg(long = "log", env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout must be at least one second".into()));
        }
        if self.top_k == 0 || self.plan_top_k == 0 {
            return Err(Error::Config("top_k must be positive".into()));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            search_path: self.search_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
