use crate::config::Config;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: Config,
}

/// Seam for the search controller and tests; the real client talks HTTP.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, ApiError>;
    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, ApiError>;
}

/// One search result. Fields the upstream may omit stay optional; absence
/// is not an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Option<Vec<Genre>>,
    pub vote_average: Option<f64>,
    pub runtime: Option<i64>,
    pub tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Movie>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}

impl TmdbClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(Config::from_env()?))
    }

    /// Poster URLs are derived, never fetched here.
    pub fn poster_url(&self, poster_path: Option<&str>) -> Option<String> {
        image_url(&self.config.poster_base, poster_path)
    }

    pub fn backdrop_url(&self, backdrop_path: Option<&str>) -> Option<String> {
        image_url(&self.config.backdrop_base, backdrop_path)
    }

    async fn get(&self, url: &str) -> Result<(StatusCode, String), ApiError> {
        let url = Url::parse(url).map_err(|_| ApiError::InvalidUrl)?;
        let res = self.client.get(url).send().await?;
        let status = res.status();
        let text = res.text().await?;
        Ok((status, text))
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            // Don't spend a request on a query the user has erased.
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search/movie?api_key={}&query={}",
            self.config.base_url,
            self.config.api_key,
            urlencoding::encode(query)
        );
        let (status, body) = self.get(&url).await?;
        debug!(%status, query, "search/movie response");
        let data: SearchResponse = decode_body(status, &body)?;
        Ok(data.results)
    }

    async fn movie_detail(&self, id: i64) -> Result<MovieDetail, ApiError> {
        let url = format!(
            "{}/movie/{}?api_key={}",
            self.config.base_url, id, self.config.api_key
        );
        let (status, body) = self.get(&url).await?;
        debug!(%status, id, "movie detail response");
        decode_detail(status, &body)
    }
}

pub fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    // TMDB paths carry a leading slash.
    path.map(|p| format!("{base}{p}"))
}

/// Maps one HTTP response to one typed outcome. 401 carries the upstream
/// `status_message` when present; any other non-200 surfaces its code.
fn decode_body<T: for<'de> Deserialize<'de>>(
    status: StatusCode,
    body: &str,
) -> Result<T, ApiError> {
    match status {
        StatusCode::OK => Ok(serde_json::from_str(body)?),
        StatusCode::UNAUTHORIZED => Err(ApiError::Api(status_message(body))),
        other => Err(ApiError::Status(other.as_u16())),
    }
}

/// Detail lookups additionally distinguish a missing id from a generic
/// status failure.
fn decode_detail(status: StatusCode, body: &str) -> Result<MovieDetail, ApiError> {
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    decode_body(status, body)
}

fn status_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .unwrap_or_else(|| "Unknown API Error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_envelope() {
        let body = r#"{"results":[{"id":550,"title":"Fight Club","overview":"A ticking-time-bomb insomniac...","poster_path":"/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg","release_date":"1999-10-15"}]}"#;
        let data: SearchResponse = decode_body(StatusCode::OK, body).unwrap();
        assert_eq!(data.results.len(), 1);
        assert_eq!(data.results[0].id, 550);
        assert_eq!(data.results[0].title, "Fight Club");
        assert_eq!(data.results[0].release_date.as_deref(), Some("1999-10-15"));
    }

    #[test]
    fn decodes_detail_with_all_fields() {
        let body = r#"{
            "id": 550,
            "title": "Fight Club",
            "overview": "A ticking-time-bomb insomniac...",
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "release_date": "1999-10-15",
            "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
            "genres": [{"id": 18, "name": "Drama"}],
            "vote_average": 8.4,
            "runtime": 139,
            "tagline": "Mischief. Mayhem. Soap."
        }"#;
        let detail = decode_detail(StatusCode::OK, body).unwrap();
        assert_eq!(detail.id, 550);
        assert_eq!(
            detail.genres,
            Some(vec![Genre {
                id: 18,
                name: "Drama".to_string()
            }])
        );
        assert_eq!(detail.vote_average, Some(8.4));
        assert_eq!(detail.runtime, Some(139));
        assert_eq!(detail.tagline.as_deref(), Some("Mischief. Mayhem. Soap."));
    }

    #[test]
    fn missing_optional_detail_fields_are_absent_not_errors() {
        let body = r#"{"id": 551, "title": "Sparse"}"#;
        let detail = decode_detail(StatusCode::OK, body).unwrap();
        assert_eq!(detail.overview, "");
        assert!(detail.poster_path.is_none());
        assert!(detail.backdrop_path.is_none());
        assert!(detail.genres.is_none());
        assert!(detail.vote_average.is_none());
        assert!(detail.runtime.is_none());
        assert!(detail.tagline.is_none());
    }

    #[test]
    fn unauthorized_uses_upstream_status_message() {
        let body = r#"{"status_message":"Invalid API key"}"#;
        let err = decode_body::<SearchResponse>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, ApiError::Api(ref m) if m == "Invalid API key"));
    }

    #[test]
    fn unauthorized_without_message_falls_back() {
        let err = decode_body::<SearchResponse>(StatusCode::UNAUTHORIZED, "{}").unwrap_err();
        assert!(matches!(err, ApiError::Api(ref m) if m == "Unknown API Error"));
        let err = decode_body::<SearchResponse>(StatusCode::UNAUTHORIZED, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Api(ref m) if m == "Unknown API Error"));
    }

    #[test]
    fn other_statuses_surface_their_code() {
        let err =
            decode_body::<SearchResponse>(StatusCode::INTERNAL_SERVER_ERROR, "").unwrap_err();
        assert!(matches!(err, ApiError::Status(500)));
    }

    #[test]
    fn detail_not_found_is_distinct_from_status() {
        let err = decode_detail(StatusCode::NOT_FOUND, "{}").unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let err = decode_body::<SearchResponse>(StatusCode::OK, "{\"results\": 1}").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn derives_image_urls() {
        assert_eq!(
            image_url("https://image.tmdb.org/t/p/w500", Some("/abc.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(image_url("https://image.tmdb.org/t/p/w500", None), None);
    }

    #[tokio::test]
    async fn empty_query_short_circuits_without_network() {
        let mut config = Config::with_key("test-key");
        // Unroutable base; the guard must return before any request is built.
        config.base_url = "http://127.0.0.1:0".to_string();
        let client = TmdbClient::new(config);
        let movies = client.search_movies("   ").await.unwrap();
        assert!(movies.is_empty());
    }
}
