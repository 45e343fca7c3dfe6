//! Foodoscope - recipe search and meal planning
//!
//! Foodoscope lets a user search a remote recipe database with a free-text
//! dietary query and turn the results into a day-by-day meal plan.
//!
//! # Architecture
//!
//! - [`client`]: talks to the recipe search service (`POST /search`).
//! - [`recipe`]: tolerant recipe records, badges, filters, detail rows.
//! - [`plan`]: orders results by goal and deals them into meal slots.
//! - [`ui`]: UI elements, shared state and the WebSocket bridge. The data
//!   layer is Rust; presentation is an HTML layout of custom elements.
//! - [`app`]: the Foodoscope screen wired onto the UI state.
//!
//! # Example
//!
//! ```no_run
//! use foodoscope::{
//!     app::{AppSettings, FoodoscopeApp, LAYOUT_HTML},
//!     client::{ClientConfig, RecipeClient},
//!     ui::{AppState, RouterConfig, serve},
//! };
//!
//! #[tokio::main]
//! async fn main() -> foodoscope::Result<()> {
//!     let client = RecipeClient::new(ClientConfig::default())?;
//!     let app = FoodoscopeApp::new(AppState::new(), client, AppSettings::default());
//!
//!     let config = RouterConfig::new(app.state().clone(), LAYOUT_HTML);
//!     serve(config, "127.0.0.1:3000").await
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod plan;
pub mod recipe;
pub mod ui;

pub use error::{Error, Result};
