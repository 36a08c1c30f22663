//! Relay API Client

use anyhow::{bail, Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// API Client for Relay
pub struct RelayClient {
    client: Client,
    base_url: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct ApiDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub endpoint: String,
    pub method: String,
    pub status: String,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub api: ApiDefinition,
}

#[derive(Debug, Deserialize)]
pub struct ApiList {
    pub apis: Vec<ApiDefinition>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

#[derive(Debug, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub api_id: Uuid,
    pub method: String,
    pub endpoint: String,
    pub status_code: u16,
    pub response_time: f64,
    pub response_data: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LogEnvelope {
    pub log: LogEntry,
}

#[derive(Debug, Deserialize)]
pub struct LogList {
    pub logs: Vec<LogEntry>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

/// Fields sent on create and update; `None` fields are omitted
#[derive(Debug, Default, Serialize)]
pub struct ApiPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Raw result of an execution; the status mirrors the upstream
#[derive(Debug)]
pub struct ExecOutcome {
    pub status: u16,
    pub body: Value,
}

impl RelayClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }

    /// Whether a session token is accepted
    pub async fn check_session(&self, token: &str) -> Result<bool> {
        let resp = self
            .client
            .get(self.url("/api/apis"))
            .query(&[("limit", "1")])
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to connect to Relay API")?;
        Ok(resp.status().is_success())
    }

    pub async fn list_apis(&self, token: &str, page: u32, limit: u32) -> Result<ApiList> {
        let req = self
            .client
            .get(self.url("/api/apis"))
            .query(&[("page", page), ("limit", limit)]);
        self.send_json(req.bearer_auth(token)).await
    }

    pub async fn get_api(&self, token: &str, id: &str) -> Result<ApiDefinition> {
        let req = self.client.get(self.url(&format!("/api/apis/{}", id)));
        let envelope: ApiEnvelope = self.send_json(req.bearer_auth(token)).await?;
        Ok(envelope.api)
    }

    pub async fn create_api(&self, token: &str, payload: &ApiPayload) -> Result<ApiDefinition> {
        let req = self.client.post(self.url("/api/apis")).json(payload);
        let envelope: ApiEnvelope = self.send_json(req.bearer_auth(token)).await?;
        Ok(envelope.api)
    }

    pub async fn update_api(
        &self,
        token: &str,
        id: &str,
        payload: &ApiPayload,
    ) -> Result<ApiDefinition> {
        let req = self
            .client
            .put(self.url(&format!("/api/apis/{}", id)))
            .json(payload);
        let envelope: ApiEnvelope = self.send_json(req.bearer_auth(token)).await?;
        Ok(envelope.api)
    }

    pub async fn delete_api(&self, token: &str, id: &str) -> Result<()> {
        let req = self.client.delete(self.url(&format!("/api/apis/{}", id)));
        let _: Value = self.send_json(req.bearer_auth(token)).await?;
        Ok(())
    }

    pub async fn list_logs(
        &self,
        token: &str,
        api_id: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<LogList> {
        let mut req = self
            .client
            .get(self.url("/api/logs"))
            .query(&[("page", page), ("limit", limit)]);
        if let Some(api_id) = api_id {
            req = req.query(&[("api_id", api_id)]);
        }
        self.send_json(req.bearer_auth(token)).await
    }

    pub async fn get_log(&self, token: &str, id: &str) -> Result<LogEntry> {
        let req = self.client.get(self.url(&format!("/api/logs/{}", id)));
        let envelope: LogEnvelope = self.send_json(req.bearer_auth(token)).await?;
        Ok(envelope.log)
    }

    /// Invoke a Definition through the proxy
    pub async fn execute(
        &self,
        api_key: Option<&str>,
        id: &str,
        method: Method,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ExecOutcome> {
        let mut req = self
            .client
            .request(method, self.url(&format!("/api/execute/{}", id)))
            .query(query);
        if let Some(key) = api_key {
            req = req.header("X-API-Key", key);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.context("Failed to connect to Relay API")?;
        let status = resp.status().as_u16();
        let text = resp.text().await.context("Failed to read response")?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(ExecOutcome { status, body })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = req.send().await.context("Failed to connect to Relay API")?;
        let resp = check(resp).await?;
        resp.json().await.context("Failed to parse response")
    }
}

/// Turn a non-success response into an error carrying the server message
async fn check(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    bail!("API error ({}): {}", status, message);
}
