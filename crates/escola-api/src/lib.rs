// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! HTTP client for the escola backend. Every call carries a JSON
//! content type and the anti-forgery token header; failures surface as a
//! single [`ApiError`] so callers can match on the HTTP status. One
//! attempt per call: no retries, no timeout.

use escola_app::{
    Aluno, DashboardStats, Disciplina, Professor, RequerimentoFormInput, RequerimentoId, Turma,
};
use reqwest::Method;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const DASHBOARD_STATS_PATH: &str = "/api/dashboard/stats/";
pub const ALUNOS_PATH: &str = "/api/alunos/";
pub const PROFESSORES_PATH: &str = "/api/professores/";
pub const TURMAS_PATH: &str = "/api/alunos/turmas/";
pub const DISCIPLINAS_PATH: &str = "/api/professores/disciplinas/";
pub const REQUERIMENTOS_PATH: &str = "/api/administracao/requerimentos/";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("server returned {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    csrf_token: String,
    http: HttpClient,
}

impl Client {
    /// `csrf_token` is the page-embedded anti-forgery value; an empty
    /// string is accepted and sent as-is, matching a page without the
    /// hidden token field.
    pub fn new(base_url: &str, csrf_token: &str) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let parsed = Url::parse(&base_url)
            .map_err(|error| ApiError::Config(format!("invalid base url {base_url:?}: {error}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base url {base_url:?} must use http or https"
            )));
        }

        let http = HttpClient::builder().build()?;
        Ok(Self {
            base_url,
            csrf_token: csrf_token.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Single-attempt JSON call. Non-2xx statuses become
    /// [`ApiError::Status`]; transport failures propagate untouched.
    /// Never caught here -- each caller decides how to handle failure.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<serde_json::Value> {
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, &self.csrf_token);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let value = self.request(Method::GET, path, None)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.get(DASHBOARD_STATS_PATH)
    }

    pub fn list_alunos(&self) -> ApiResult<Vec<Aluno>> {
        self.get(ALUNOS_PATH)
    }

    pub fn list_professores(&self) -> ApiResult<Vec<Professor>> {
        self.get(PROFESSORES_PATH)
    }

    pub fn list_turmas(&self) -> ApiResult<Vec<Turma>> {
        self.get(TURMAS_PATH)
    }

    pub fn list_disciplinas(&self) -> ApiResult<Vec<Disciplina>> {
        self.get(DISCIPLINAS_PATH)
    }

    pub fn submit_requerimento(&self, input: &RequerimentoFormInput) -> ApiResult<RequerimentoId> {
        let body = serde_json::json!({
            "tipo": input.tipo.as_str(),
            "descricao": input.descricao,
        });
        let value = self.request(Method::POST, REQUERIMENTOS_PATH, Some(&body))?;
        let created: CreatedResponse = serde_json::from_value(value)?;
        Ok(RequerimentoId::new(created.id))
    }
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: i64,
}

#[cfg(test)]
mod tests {
    use super::{ApiError, Client};

    #[test]
    fn new_trims_trailing_slashes() {
        let client = Client::new("http://localhost:8000///", "tok").expect("valid base url");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn new_rejects_non_http_schemes() {
        let error = Client::new("ftp://localhost", "tok").expect_err("ftp should be rejected");
        assert!(matches!(error, ApiError::Config(_)));
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let error = Client::new("not a url", "tok").expect_err("garbage should be rejected");
        assert!(matches!(error, ApiError::Config(_)));
    }

    #[test]
    fn empty_csrf_token_is_accepted() {
        let client = Client::new("http://localhost:8000", "").expect("empty token is valid");
        assert_eq!(client.csrf_token(), "");
    }
}
