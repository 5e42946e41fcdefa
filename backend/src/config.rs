use crate::models::AdminToken;
use crate::services::document_store::ElasticBundleStore;
use crate::services::relational_store::{self, PostgresStore};
use crate::services::youtube_client::{YouTubeClient, DEFAULT_YOUTUBE_API_URL};
use crate::AppState;
use anyhow::{Context, Result};
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{error, info, LevelFilter};
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;

lazy_static! {
    pub static ref YOUTUBE_API_URL: String =
        env::var("YOUTUBE_API_URL").unwrap_or_else(|_| DEFAULT_YOUTUBE_API_URL.to_string());
    pub static ref ELASTICSEARCH_URL: String =
        env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
    pub static ref BUNDLE_INDEX: String =
        env::var("BUNDLE_INDEX").unwrap_or_else(|_| "youtube_harvests".to_string());
    pub static ref RETRY_FAILED_CHANNELS: bool = env::var("RETRY_FAILED_CHANNELS")
        .map(|v| parse_flag(&v))
        .unwrap_or(true);
    pub static ref CORS_ALLOWED_ORIGIN: String =
        env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn required_env(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} environment variable must be set"))
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting YouTube warehouse backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_elasticsearch_client() -> Result<Elasticsearch> {
    let es_url = &*ELASTICSEARCH_URL;
    info!("Connecting to Elasticsearch at: {es_url}");

    let transport =
        TransportBuilder::new(SingleNodeConnectionPool::new(es_url.parse()?)).build()?;

    Ok(Elasticsearch::new(transport))
}

pub fn create_youtube_client() -> Result<YouTubeClient> {
    let api_key = required_env("YOUTUBE_API_KEY")?;
    info!("Using YouTube Data API at: {}", *YOUTUBE_API_URL);
    Ok(YouTubeClient::new(api_key, YOUTUBE_API_URL.as_str()))
}

pub async fn create_app_state() -> Result<AppState> {
    let database_url = required_env("DATABASE_URL")?;
    let admin_token = required_env("ADMIN_TOKEN")?;

    let bundle_store = ElasticBundleStore::new(create_elasticsearch_client()?, BUNDLE_INDEX.as_str());
    if let Err(e) = bundle_store.ensure_index().await {
        error!("Could not prepare Elasticsearch index '{}': {e}", *BUNDLE_INDEX);
    }

    relational_store::migrate(&database_url)
        .await
        .context("Failed to migrate the relational store")?;

    Ok(AppState {
        youtube: create_youtube_client()?,
        bundle_store,
        postgres: PostgresStore::new(database_url),
        admin_token,
        retry_failed: *RETRY_FAILED_CHANNELS,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[CORS_ALLOWED_ORIGIN.as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&[
            "Authorization",
            "Accept",
            "Content-Type",
        ]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = request.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, "Missing application state"));
        };

        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "));

        match token {
            Some(t) => {
                if t == state.admin_token {
                    Outcome::Success(AdminToken(t.to_string()))
                } else {
                    Outcome::Error((Status::Unauthorized, "Invalid token"))
                }
            }
            None => Outcome::Error((Status::Unauthorized, "Missing token")),
        }
    }
}
