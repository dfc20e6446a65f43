use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone, Debug)]
pub enum CorsPolicy {
    AnyOrigin,
    Origin(HeaderValue),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub cors: CorsPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 =
            lookup("PORT").unwrap_or_else(|| "3001".to_string()).parse().context("PORT")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://watchlist.db?mode=rwc".to_string());

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let cors = if app_env == "development" {
            CorsPolicy::AnyOrigin
        } else {
            let origin =
                lookup("FRONTEND_URL").context("FRONTEND_URL must be set outside development")?;
            CorsPolicy::Origin(origin.parse().context("FRONTEND_URL")?)
        };

        let addr = format!("{host}:{port}").parse().context("HOST/PORT")?;
        Ok(Self { addr, database_url, cors })
    }

    pub fn cors_layer(&self) -> CorsLayer {
        match &self.cors {
            CorsPolicy::AnyOrigin => {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            },
            CorsPolicy::Origin(origin) => CorsLayer::new()
                .allow_origin(origin.clone())
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub backend_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url =
            lookup("BACKEND_URL").unwrap_or_else(|| "http://localhost:3001".to_string());
        Self { backend_url }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    async fn cors_headers(config: &Config, origin: &str) -> (StatusCode, Option<String>, bool) {
        let app = Router::new().route("/", get(|| async { "ok" })).layer(config.cors_layer());
        let req = Request::builder().uri("/").header(header::ORIGIN, origin).body(Body::empty());
        let resp = app.oneshot(req.unwrap()).await.unwrap();
        let headers = resp.headers();
        let allow_origin = headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string());
        let credentials = headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_some();
        (resp.status(), allow_origin, credentials)
    }

    #[test]
    fn defaults_to_development() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:3001");
        assert_eq!(config.database_url, "sqlite://watchlist.db?mode=rwc");
        assert!(matches!(config.cors, CorsPolicy::AnyOrigin));

        assert_eq!(ClientConfig::from_lookup(lookup(&[])).backend_url, "http://localhost:3001");
    }

    #[test]
    fn production_requires_frontend_url() {
        let err = Config::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert_eq!(err.to_string(), "FRONTEND_URL must be set outside development");
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
    }

    #[tokio::test]
    async fn production_cors_allows_only_frontend_with_credentials() {
        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("FRONTEND_URL", "https://movies.example.com"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);

        let (status, origin, credentials) =
            cors_headers(&config, "https://movies.example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(origin.as_deref(), Some("https://movies.example.com"));
        assert!(credentials);

        let (_, origin, _) = cors_headers(&config, "https://evil.example.com").await;
        assert_eq!(origin, None);
    }

    #[tokio::test]
    async fn development_cors_allows_any_origin() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        let (_, origin, credentials) = cors_headers(&config, "http://localhost:5173").await;
        assert_eq!(origin.as_deref(), Some("*"));
        assert!(!credentials);
    }
}
