use anyhow::Result;
use chrono::NaiveDate;
use cineseek::error::ApiError;
use cineseek::search::{SearchController, SearchState};
use cineseek::tmdb::{MovieDetail, TmdbApi, TmdbClient};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let client = Arc::new(TmdbClient::from_env()?);
    let debounce = cineseek::config::DEBOUNCE_WINDOW;
    let mut controller = SearchController::new(client.clone(), debounce);
    let mut state_rx = controller.subscribe();

    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            render_state(&state);
        }
    });

    println!("Start typing to search for movies.");
    println!("Commands: /detail <id> to show details, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line == "/quit" {
            break;
        }
        if let Some(rest) = line.strip_prefix("/detail") {
            match rest.trim().parse::<i64>() {
                Ok(id) => show_detail(client.as_ref(), id).await,
                Err(_) => println!("Usage: /detail <numeric id>"),
            }
            continue;
        }
        controller.set_query(&line);
    }
    Ok(())
}

fn render_state(state: &SearchState) {
    if state.loading {
        println!("Searching...");
        return;
    }
    if let Some(error) = &state.error {
        println!("Error: {error}");
        return;
    }
    if state.movies.is_empty() {
        if state.query.is_empty() {
            println!("Start typing to search for movies.");
        } else {
            println!("No movies found for {}.", state.query);
        }
        return;
    }
    for movie in &state.movies {
        match movie.release_date.as_deref().filter(|d| !d.is_empty()) {
            Some(date) => println!("{:>8}  {} ({})", movie.id, movie.title, format_date(date)),
            None => println!("{:>8}  {}", movie.id, movie.title),
        }
    }
}

async fn show_detail(client: &TmdbClient, id: i64) {
    match client.movie_detail(id).await {
        Ok(detail) => render_detail(client, &detail),
        Err(ApiError::NotFound) => println!("No movie with id {id}."),
        Err(e) => println!("Error: {e}"),
    }
}

fn render_detail(client: &TmdbClient, detail: &MovieDetail) {
    println!("{}", detail.title);
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("  {tagline}");
    }
    if let Some(date) = detail.release_date.as_deref().filter(|d| !d.is_empty()) {
        println!("  Released: {}", format_date(date));
    }
    if let Some(rating) = detail.vote_average {
        println!("  Rating: {rating:.1}/10");
    }
    if let Some(runtime) = detail.runtime {
        println!("  Runtime: {runtime} min");
    }
    if let Some(genres) = &detail.genres {
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        if !names.is_empty() {
            println!("  Genres: {}", names.join(", "));
        }
    }
    if let Some(url) = client.poster_url(detail.poster_path.as_deref()) {
        println!("  Poster: {url}");
    }
    if let Some(url) = client.backdrop_url(detail.backdrop_path.as_deref()) {
        println!("  Backdrop: {url}");
    }
    if !detail.overview.is_empty() {
        println!("\n{}", detail.overview);
    }
}

/// `1999-10-15` renders as `Oct 15, 1999`; anything unparseable passes
/// through untouched.
fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
