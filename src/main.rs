use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use foodoscope::{
    app::{AppSettings, FoodoscopeApp, LAYOUT_HTML},
    client::RecipeClient,
    config::Config,
    ui::{AppState, RouterConfig, serve},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    config.validate().context("invalid configuration")?;

    let client = RecipeClient::new(config.client_config()).context("failed to build HTTP client")?;
    tracing::info!(api = %client.search_url(), "using recipe service");

    let settings = AppSettings {
        top_k: config.top_k,
        plan_top_k: config.plan_top_k,
        rng: config.rng(),
    };
    let app = FoodoscopeApp::new(AppState::new(), client, settings);

    let router_config = RouterConfig::new(app.state().clone(), LAYOUT_HTML)
        .title("Foodoscope")
        .static_dir(config.static_dir.clone());

    serve(router_config, &config.bind)
        .await
        .with_context(|| format!("server on {} failed", config.bind))
}
