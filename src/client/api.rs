use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ClientError;
use crate::models::{DeleteAck, ErrorBody, Movie, MovieFilter, MovieInput, MoviePatch};

/// The movie endpoints as seen from a client.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn list(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ClientError>;
    async fn get(&self, id: &str) -> Result<Movie, ClientError>;
    async fn create(&self, input: &MovieInput) -> Result<Movie, ClientError>;
    async fn replace(&self, id: &str, input: &MovieInput) -> Result<Movie, ClientError>;
    async fn update(&self, id: &str, patch: &MoviePatch) -> Result<Movie, ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

pub struct HttpMovieApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMovieApi {
    pub fn new(backend_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent("watchlist/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url: backend_url.into() })
    }

    fn collection_url(&self) -> String {
        format!("{}/api/movies", self.base_url.trim_end_matches('/'))
    }

    fn movie_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }
}

#[async_trait]
impl MovieApi for HttpMovieApi {
    async fn list(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ClientError> {
        let resp =
            self.client.get(self.collection_url()).query(&filter.query_pairs()).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let bytes = resp.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(invalid_list)?
        };
        if !body.is_array() {
            warn!("movie list response was not an array, treating as empty");
            return Ok(Vec::new());
        }

        let movies: Vec<Movie> = serde_json::from_value(body).map_err(invalid_list)?;
        debug!(count = movies.len(), "loaded movies");
        Ok(movies)
    }

    async fn get(&self, id: &str) -> Result<Movie, ClientError> {
        let resp = self.client.get(self.movie_url(id)).send().await?;
        parse(resp).await
    }

    async fn create(&self, input: &MovieInput) -> Result<Movie, ClientError> {
        let resp = self.client.post(self.collection_url()).json(input).send().await?;
        parse(resp).await
    }

    async fn replace(&self, id: &str, input: &MovieInput) -> Result<Movie, ClientError> {
        let resp = self.client.put(self.movie_url(id)).json(input).send().await?;
        parse(resp).await
    }

    async fn update(&self, id: &str, patch: &MoviePatch) -> Result<Movie, ClientError> {
        let resp = self.client.patch(self.movie_url(id)).json(patch).send().await?;
        parse(resp).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let resp = self.client.delete(self.movie_url(id)).send().await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let _: DeleteAck = parse(resp).await?;
        Ok(())
    }
}

/// Decodes a success body, or turns an error response into `ClientError::Api`.
async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }
    Err(api_error(resp).await)
}

/// Uses the server's `erro` message when the body carries one.
async fn api_error(resp: Response) -> ClientError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.erro)
        .unwrap_or_else(|_| format!("request failed with status {status}"));
    warn!(status = status.as_u16(), error = %message, "api request failed");
    ClientError::Api { status: status.as_u16(), message }
}

fn invalid_list(err: serde_json::Error) -> ClientError {
    ClientError::Api {
        status: StatusCode::OK.as_u16(),
        message: format!("invalid movie list: {err}"),
    }
}
