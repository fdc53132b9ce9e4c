use crate::config::AppConfig;
use crate::models::MoviePage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const PAGE_SIZE: u32 = 20;
pub const POPULAR_FIELDS: [&str; 6] = ["id", "name", "alternativeName", "year", "poster", "rating"];
pub const CRITICS_RATING: &str = "rating.filmCritics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "1",
            SortOrder::Descending => "-1",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopularRequest {
    pub page: u32,
    pub limit: u32,
    pub fields: Vec<String>,
    pub sort_field: String,
    pub sort_order: SortOrder,
}

impl Default for PopularRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PAGE_SIZE,
            fields: POPULAR_FIELDS.iter().map(|f| f.to_string()).collect(),
            sort_field: CRITICS_RATING.to_string(),
            sort_order: SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    pub page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: PAGE_SIZE,
            page: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog responded {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn popular(&self, request: &PopularRequest) -> Result<MoviePage>;
    async fn search(&self, request: &SearchRequest) -> Result<MoviePage>;
}

#[derive(Debug, Clone)]
pub struct KinopoiskClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl KinopoiskClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("movie_collection/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()
            .context("Failed to build catalog HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.catalog_base_url, &config.api_key)
    }

    pub fn popular_url(&self, request: &PopularRequest) -> String {
        let mut url = format!(
            "{}/v1.4/movie?page={}&limit={}",
            self.base_url, request.page, request.limit
        );
        for field in &request.fields {
            url.push_str("&selectFields=");
            url.push_str(&urlencoding::encode(field));
        }
        url.push_str(&format!(
            "&sortField={}&sortType={}",
            urlencoding::encode(&request.sort_field),
            request.sort_order.as_param()
        ));
        url
    }

    pub fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}/v1.4/movie/search?query={}&limit={}&page={}",
            self.base_url,
            urlencoding::encode(&request.query),
            request.limit,
            request.page
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let res = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(CatalogError::Status { status, body: text }.into());
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl CatalogApi for KinopoiskClient {
    async fn popular(&self, request: &PopularRequest) -> Result<MoviePage> {
        self.get_json(&self.popular_url(request)).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<MoviePage> {
        self.get_json(&self.search_url(request)).await
    }
}

pub fn status_of(err: &anyhow::Error) -> Option<StatusCode> {
    match err.downcast_ref::<CatalogError>() {
        Some(CatalogError::Status { status, .. }) => Some(*status),
        None => None,
    }
}
