//! HTTP Upstream Implementation
//!
//! Issues the proxied request to the stored endpoint using reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect, Client, Method};

use relay::{
    DomainError, EgressPolicy, HttpMethod, UpstreamClient, UpstreamConfig, UpstreamError,
    UpstreamRequest, UpstreamResponse,
};

const MAX_REDIRECTS: usize = 10;

/// HTTP implementation of UpstreamClient
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig, egress: EgressPolicy) -> Result<Self, DomainError> {
        // Redirect targets go through the same egress checks as stored endpoints
        let redirects = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            match egress.check(attempt.url().as_str()) {
                Ok(_) => attempt.follow(),
                Err(reason) => attempt.error(format!("redirect refused: {}", reason)),
            }
        });

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(redirects)
            .build()
            .map_err(|e| DomainError::ExternalService(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap, UpstreamError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| UpstreamError::Failure(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| UpstreamError::Failure(format!("Invalid value for header '{name}': {e}")))?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Failure(err.to_string())
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let headers = build_headers(&request.headers)?;

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(headers)
            .query(&request.query);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(classify)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
