use crate::config::Config;
use crate::http::{self, ApiError, Interceptor};
use crate::limit::RateLimitHub;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub document_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub id: String,
    pub chunks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub documents: u64,
    pub chunks: u64,
    pub document_names: Vec<String>,
}

/// Transport layer for the document Q&A backend. Every request goes through
/// the interceptor, so a 429 anywhere is broadcast to every watch on the
/// shared hub.
pub struct ApiClient {
    client: reqwest::Client,
    cfg: Config,
    interceptor: Interceptor,
}

impl ApiClient {
    pub fn new(cfg: Config, hub: RateLimitHub) -> reqwest::Result<Self> {
        let client = http::build_client(&cfg)?;
        Ok(Self {
            client,
            cfg,
            interceptor: Interceptor::new(hub),
        })
    }

    /// POST /ingest with one multipart `files` part per document.
    pub async fn upload(&self, files: Vec<(String, Vec<u8>)>) -> Result<UploadResponse, ApiError> {
        let url = format!("{}/ingest", self.cfg.api_url);
        let mut form = multipart::Form::new();
        for (name, bytes) in files {
            form = form.part("files", multipart::Part::bytes(bytes).file_name(name));
        }
        self.interceptor
            .intercept(self.client.post(&url).multipart(form).send())
            .await
    }

    /// GET /search?q=<query>
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = format!(
            "{}/search?q={}",
            self.cfg.api_url,
            urlencoding::encode(query)
        );
        self.interceptor
            .intercept(self.client.get(&url).send())
            .await
    }

    /// POST /ask with a JSON question body.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, ApiError> {
        let url = format!("{}/ask", self.cfg.api_url);
        let body = serde_json::json!({ "question": question });
        self.interceptor
            .intercept(self.client.post(&url).json(&body).send())
            .await
    }

    /// GET /stats
    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        let url = format!("{}/stats", self.cfg.api_url);
        self.interceptor
            .intercept(self.client.get(&url).send())
            .await
    }
}
