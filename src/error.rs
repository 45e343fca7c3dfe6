//! Error type shared by the client, planner and configuration layers.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The search query was empty or whitespace only.
    #[error("search query is empty")]
    EmptyQuery,

    /// The recipe service answered with a non-success status.
    #[error("recipe service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport or decoding failure talking to the recipe service.
    #[error("recipe service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A plan was requested without any recipes to fill it.
    #[error("no recipes available to build a plan")]
    NoRecipes,

    #[error("invalid plan options: {0}")]
    InvalidPlan(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
