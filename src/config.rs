use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w780";

/// How long the search input must settle before a fetch is issued.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(750);

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub poster_base: String,
    pub backdrop_base: String,
    pub debounce: Duration,
}

impl Config {
    /// Reads `TMDB_API_KEY` from the environment. A missing or empty key is
    /// a startup failure, not something to discover on the first request.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        if api_key.trim().is_empty() {
            anyhow::bail!("TMDB_API_KEY is empty");
        }
        Ok(Self::with_key(api_key))
    }

    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TMDB_BASE.to_string(),
            poster_base: POSTER_BASE.to_string(),
            backdrop_base: BACKDROP_BASE.to_string(),
            debounce: DEBOUNCE_WINDOW,
        }
    }
}
