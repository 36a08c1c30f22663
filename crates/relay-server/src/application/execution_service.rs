//! Execution Application Service (Use Case)
//!
//! Performs one live invocation of a stored Definition and records exactly
//! one log entry for every upstream attempt.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;

use relay::{
    caller_params, merge_params, parse_api_id, query_pairs, render_header_value, round_ms,
    ApiDefinition, ApiDefinitionRepository, EgressPolicy, HttpMethod, JsonMap, LogEntry,
    LogRepository, ProxyError, UpstreamClient, UpstreamError, UpstreamRequest, UpstreamResponse,
    TIMEOUT_ERROR, UPSTREAM_TIMEOUT,
};

/// Incoming request as seen by the proxy route
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Method used on the proxy route (informational only)
    pub method: HttpMethod,
    /// Raw query pairs in arrival order
    pub query: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Whether the incoming request declared a JSON body
    pub is_json: bool,
}

/// Result returned to the caller when an upstream response was received
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub status_code: u16,
    /// Parsed JSON when the upstream declared JSON, otherwise the raw text
    pub response: Value,
    /// Milliseconds rounded to 2 decimal places
    pub response_time: f64,
}

/// Application service for proxy executions
pub struct ExecutionService<D, L, U>
where
    D: ApiDefinitionRepository,
    L: LogRepository,
    U: UpstreamClient,
{
    definitions: Arc<D>,
    logs: Arc<L>,
    upstream: Arc<U>,
    egress: EgressPolicy,
    timeout: Duration,
}

impl<D, L, U> ExecutionService<D, L, U>
where
    D: ApiDefinitionRepository,
    L: LogRepository,
    U: UpstreamClient,
{
    pub fn new(definitions: Arc<D>, logs: Arc<L>, upstream: Arc<U>, egress: EgressPolicy) -> Self {
        Self {
            definitions,
            logs,
            upstream,
            egress,
            timeout: UPSTREAM_TIMEOUT,
        }
    }

    /// Execute a Definition by its raw identifier
    pub async fn execute(
        &self,
        api_id: &str,
        invocation: Invocation,
    ) -> Result<Execution, ProxyError> {
        let id = parse_api_id(api_id)?;

        let definition = self
            .definitions
            .find_by_id(id)
            .await?
            .ok_or(ProxyError::NotFound)?;

        if !definition.is_active() {
            return Err(ProxyError::Inactive);
        }

        self.egress
            .check(&definition.endpoint)
            .map_err(ProxyError::EgressDenied)?;

        let params = merge_params(
            &definition.params,
            caller_params(invocation.query.iter().cloned()),
        );

        let started = Instant::now();
        let attempt = self.attempt(&definition, &params, &invocation).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match attempt {
            Ok((response, body)) => {
                let request_data = json!({ "params": params, "body": body });
                let entry = LogEntry::response(
                    &definition,
                    response.status,
                    elapsed_ms,
                    request_data,
                    &response.body,
                );
                self.logs.append(&entry).await?;

                tracing::info!(
                    api_id = %definition.id,
                    caller_method = %invocation.method,
                    method = %definition.method,
                    status = response.status,
                    response_time_ms = elapsed_ms,
                    "Upstream responded"
                );

                Ok(Execution {
                    status_code: response.status,
                    response: response_payload(&response),
                    response_time: round_ms(elapsed_ms),
                })
            }
            Err(UpstreamError::Timeout) => {
                let entry = LogEntry::failure(&definition, 408, elapsed_ms, TIMEOUT_ERROR);
                self.logs.append(&entry).await?;

                tracing::warn!(
                    api_id = %definition.id,
                    endpoint = %definition.endpoint,
                    response_time_ms = elapsed_ms,
                    "Upstream timed out"
                );

                Err(ProxyError::UpstreamTimeout)
            }
            Err(UpstreamError::Failure(cause)) => {
                let entry = LogEntry::failure(&definition, 500, elapsed_ms, cause.clone());
                self.logs.append(&entry).await?;

                tracing::warn!(
                    api_id = %definition.id,
                    endpoint = %definition.endpoint,
                    error = %cause,
                    "Upstream call failed"
                );

                Err(ProxyError::UpstreamFailure(cause))
            }
        }
    }

    /// The single upstream attempt, bounded by the timeout
    async fn attempt(
        &self,
        definition: &ApiDefinition,
        params: &JsonMap,
        invocation: &Invocation,
    ) -> Result<(UpstreamResponse, Option<Value>), UpstreamError> {
        let body = decode_body(invocation)?;

        let request = UpstreamRequest {
            method: definition.method,
            url: definition.endpoint.clone(),
            headers: definition
                .headers
                .iter()
                .filter_map(|(name, value)| render_header_value(value).map(|v| (name.clone(), v)))
                .collect(),
            query: query_pairs(params),
            body: body.clone(),
        };

        let response = tokio::time::timeout(self.timeout, self.upstream.send(request))
            .await
            .map_err(|_| UpstreamError::Timeout)??;

        Ok((response, body))
    }
}

/// JSON body of the incoming request, when it declared one
fn decode_body(invocation: &Invocation) -> Result<Option<Value>, UpstreamError> {
    if !invocation.is_json || invocation.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&invocation.body)
        .map(Some)
        .map_err(|e| UpstreamError::Failure(format!("Failed to decode JSON body: {e}")))
}

/// Body shown to the caller; undecodable JSON falls back to the raw text
fn response_payload(response: &UpstreamResponse) -> Value {
    if response.is_json() {
        if let Ok(value) = serde_json::from_str(&response.body) {
            return value;
        }
    }
    Value::String(response.body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    use relay::{ApiStatus, DomainError, LogFilter, NewApiDefinition, PageRequest};

    // --- In-memory ports ---

    #[derive(Default)]
    struct MemoryDefinitions {
        items: Mutex<Vec<ApiDefinition>>,
    }

    impl MemoryDefinitions {
        fn with(definition: ApiDefinition) -> Self {
            Self {
                items: Mutex::new(vec![definition]),
            }
        }
    }

    #[async_trait]
    impl ApiDefinitionRepository for MemoryDefinitions {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiDefinition>, DomainError> {
            Ok(self.items.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }

        async fn find_by_id_and_owner(
            &self,
            id: Uuid,
            user_id: Uuid,
        ) -> Result<Option<ApiDefinition>, DomainError> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id && d.user_id == user_id)
                .cloned())
        }

        async fn find_by_owner(
            &self,
            _user_id: Uuid,
            _page: PageRequest,
        ) -> Result<Vec<ApiDefinition>, DomainError> {
            unimplemented!("not used by the execution path")
        }

        async fn count_by_owner(&self, _user_id: Uuid) -> Result<u64, DomainError> {
            unimplemented!("not used by the execution path")
        }

        async fn insert(&self, definition: &ApiDefinition) -> Result<ApiDefinition, DomainError> {
            self.items.lock().unwrap().push(definition.clone());
            Ok(definition.clone())
        }

        async fn update(&self, _definition: &ApiDefinition) -> Result<ApiDefinition, DomainError> {
            unimplemented!("not used by the execution path")
        }

        async fn delete(&self, _id: Uuid, _user_id: Uuid) -> Result<bool, DomainError> {
            unimplemented!("not used by the execution path")
        }
    }

    #[derive(Default)]
    struct MemoryLogs {
        entries: Mutex<Vec<LogEntry>>,
        fail: bool,
    }

    impl MemoryLogs {
        fn entries(&self) -> Vec<LogEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogRepository for MemoryLogs {
        async fn append(&self, entry: &LogEntry) -> Result<Uuid, DomainError> {
            if self.fail {
                return Err(DomainError::Repository("log store unavailable".into()));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry.id)
        }

        async fn find_by_id_and_user(
            &self,
            _id: Uuid,
            _user_id: Uuid,
        ) -> Result<Option<LogEntry>, DomainError> {
            unimplemented!("not used by the execution path")
        }

        async fn find_by_user(
            &self,
            _user_id: Uuid,
            _filter: LogFilter,
            _page: PageRequest,
        ) -> Result<Vec<LogEntry>, DomainError> {
            unimplemented!("not used by the execution path")
        }

        async fn count_by_user(
            &self,
            _user_id: Uuid,
            _filter: LogFilter,
        ) -> Result<u64, DomainError> {
            unimplemented!("not used by the execution path")
        }
    }

    /// Scripted upstream that records the requests it receives
    enum Script {
        Respond(UpstreamResponse),
        Fail(String),
        Hang,
    }

    struct FakeUpstream {
        script: Script,
        requests: Mutex<Vec<UpstreamRequest>>,
    }

    impl FakeUpstream {
        fn new(script: Script) -> Self {
            Self {
                script,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn responding(status: u16, content_type: Option<&str>, body: &str) -> Self {
            Self::new(Script::Respond(UpstreamResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            }))
        }

        fn requests(&self) -> Vec<UpstreamRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamClient for FakeUpstream {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
            self.requests.lock().unwrap().push(request);
            match &self.script {
                Script::Respond(response) => Ok(response.clone()),
                Script::Fail(cause) => Err(UpstreamError::Failure(cause.clone())),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(UpstreamError::Failure("unreachable".into()))
                }
            }
        }
    }

    // --- Helpers ---

    fn object(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn definition() -> ApiDefinition {
        ApiDefinition::new(
            Uuid::new_v4(),
            NewApiDefinition {
                name: "catalog".to_string(),
                description: String::new(),
                endpoint: "https://api.example.com/items".to_string(),
                method: HttpMethod::Post,
                headers: object(json!({"Authorization": "Bearer upstream", "X-Skip": null})),
                params: object(json!({"a": 1, "b": 2})),
            },
        )
    }

    type TestService = ExecutionService<MemoryDefinitions, MemoryLogs, FakeUpstream>;

    struct Harness {
        service: TestService,
        logs: Arc<MemoryLogs>,
        upstream: Arc<FakeUpstream>,
    }

    fn harness(definition: ApiDefinition, upstream: FakeUpstream) -> Harness {
        harness_with_logs(definition, upstream, MemoryLogs::default())
    }

    fn harness_with_logs(
        definition: ApiDefinition,
        upstream: FakeUpstream,
        logs: MemoryLogs,
    ) -> Harness {
        let logs = Arc::new(logs);
        let upstream = Arc::new(upstream);
        let service = ExecutionService::new(
            Arc::new(MemoryDefinitions::with(definition)),
            logs.clone(),
            upstream.clone(),
            EgressPolicy::default(),
        );
        Harness {
            service,
            logs,
            upstream,
        }
    }

    fn invocation(query: &[(&str, &str)]) -> Invocation {
        Invocation {
            method: HttpMethod::Get,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_success_passes_status_and_logs_once() {
        let def = definition();
        let h = harness(
            def.clone(),
            FakeUpstream::responding(201, Some("application/json"), r#"{"id":7}"#),
        );

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        assert_eq!(result.status_code, 201);
        assert_eq!(result.response, json!({"id": 7}));

        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        let entry = &logs[0];
        assert_eq!(entry.api_id, def.id);
        assert_eq!(entry.user_id, def.user_id);
        assert_eq!(entry.method, HttpMethod::Post);
        assert_eq!(entry.endpoint, "https://api.example.com/items");
        assert_eq!(entry.status_code, 201);
        assert_eq!(entry.response_data.as_deref(), Some(r#"{"id":7}"#));
        assert!(entry.error.is_none());
    }

    #[tokio::test]
    async fn test_caller_params_override_defaults() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        h.service
            .execute(&def.id.to_string(), invocation(&[("b", "3"), ("c", "4"), ("c", "5")]))
            .await
            .unwrap();

        let requests = h.upstream.requests();
        assert_eq!(requests.len(), 1);
        let mut query = requests[0].query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string()),
                ("c".to_string(), "4".to_string()),
            ]
        );

        let logged = h.logs.entries()[0].request_data.clone().unwrap();
        assert_eq!(logged["params"], json!({"a": 1, "b": "3", "c": "4"}));
        assert_eq!(logged["body"], Value::Null);
    }

    #[tokio::test]
    async fn test_request_uses_stored_method_and_headers() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        h.service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        let request = &h.upstream.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, def.endpoint);
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer upstream".to_string())]
        );
    }

    #[tokio::test]
    async fn test_json_body_is_forwarded_only_when_declared() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        let mut json_call = invocation(&[]);
        json_call.body = br#"{"name":"widget"}"#.to_vec();
        json_call.is_json = true;
        h.service
            .execute(&def.id.to_string(), json_call)
            .await
            .unwrap();

        let mut text_call = invocation(&[]);
        text_call.body = b"name=widget".to_vec();
        h.service
            .execute(&def.id.to_string(), text_call)
            .await
            .unwrap();

        let requests = h.upstream.requests();
        assert_eq!(requests[0].body, Some(json!({"name": "widget"})));
        assert_eq!(requests[1].body, None);

        let logs = h.logs.entries();
        assert_eq!(logs[0].request_data.as_ref().unwrap()["body"], json!({"name": "widget"}));
    }

    #[tokio::test]
    async fn test_undecodable_json_body_is_a_logged_failure() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        let mut call = invocation(&[]);
        call.body = b"{not json".to_vec();
        call.is_json = true;

        let err = h
            .service
            .execute(&def.id.to_string(), call)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert!(h.upstream.requests().is_empty());
        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, 500);
        assert!(logs[0].error.as_deref().unwrap().contains("JSON"));
    }

    #[tokio::test]
    async fn test_non_json_response_is_returned_as_text() {
        let def = definition();
        let h = harness(
            def.clone(),
            FakeUpstream::responding(200, Some("text/html"), "<p>hi</p>"),
        );

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        assert_eq!(result.response, json!("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_mislabelled_json_falls_back_to_text_and_logs_once() {
        let def = definition();
        let h = harness(
            def.clone(),
            FakeUpstream::responding(200, Some("application/json"), "not json at all"),
        );

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        assert_eq!(result.response, json!("not json at all"));
        assert_eq!(h.logs.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_returns_403_without_log() {
        let mut def = definition();
        def.status = ApiStatus::Inactive;
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Inactive));
        assert_eq!(err.status_code(), 403);
        assert!(h.logs.entries().is_empty());
        assert!(h.upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_free_form_status_is_not_executable() {
        let mut def = definition();
        def.status = ApiStatus::from("maintenance");
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 403);
        assert!(h.logs.entries().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_returns_400_without_log() {
        let h = harness(definition(), FakeUpstream::responding(200, None, "ok"));

        for raw in ["not-a-uuid", "", "507f1f77bcf86cd799439011"] {
            let err = h.service.execute(raw, invocation(&[])).await.unwrap_err();
            assert!(matches!(err, ProxyError::InvalidIdentifier));
            assert_eq!(err.status_code(), 400);
        }
        assert!(h.logs.entries().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_returns_404_without_log() {
        let h = harness(definition(), FakeUpstream::responding(200, None, "ok"));

        let err = h
            .service
            .execute(&Uuid::new_v4().to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::NotFound));
        assert_eq!(err.status_code(), 404);
        assert!(h.logs.entries().is_empty());
    }

    #[tokio::test]
    async fn test_internal_endpoint_is_refused_without_log() {
        let mut def = definition();
        def.endpoint = "http://169.254.169.254/latest/meta-data".to_string();
        let h = harness(def.clone(), FakeUpstream::responding(200, None, "ok"));

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::EgressDenied(_)));
        assert_eq!(err.status_code(), 403);
        assert!(h.upstream.requests().is_empty());
        assert!(h.logs.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_408_and_logs() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::new(Script::Hang));

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamTimeout));
        assert_eq!(err.status_code(), 408);

        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, 408);
        assert_eq!(logs[0].error.as_deref(), Some("Request timeout"));
        assert!(logs[0].response_data.is_none());
        assert!(logs[0].request_data.is_none());
        assert!(logs[0].response_time >= 30_000.0);
    }

    #[tokio::test]
    async fn test_upstream_500_is_forwarded_not_failed() {
        let def = definition();
        let h = harness(
            def.clone(),
            FakeUpstream::responding(500, Some("text/plain"), "internal upstream error"),
        );

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        assert_eq!(result.status_code, 500);
        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].response_data.as_deref(), Some("internal upstream error"));
        assert!(logs[0].error.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_returns_500_with_error() {
        let def = definition();
        let h = harness(
            def.clone(),
            FakeUpstream::new(Script::Fail("connection refused".into())),
        );

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(&err, ProxyError::UpstreamFailure(msg) if msg == "connection refused"));
        assert_eq!(err.status_code(), 500);

        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, 500);
        assert_eq!(logs[0].error.as_deref(), Some("connection refused"));
        assert!(logs[0].response_data.is_none());
    }

    #[tokio::test]
    async fn test_response_data_truncated_to_1000_chars() {
        let def = definition();
        let body = "z".repeat(5000);
        let h = harness(def.clone(), FakeUpstream::responding(200, None, &body));

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap();

        assert_eq!(result.response, Value::String(body.clone()));
        let stored = h.logs.entries()[0].response_data.clone().unwrap();
        assert_eq!(stored.len(), 1000);
        assert_eq!(stored, body[..1000]);
    }

    #[tokio::test]
    async fn test_binary_body_passes_through_and_logs_once() {
        let def = definition();
        let body = "\u{FFFD}PNG\r\n\u{1a}\n\0\0\0\rIHDR";
        let h = harness(
            def.clone(),
            FakeUpstream::responding(202, Some("image/png"), body),
        );

        let result = h
            .service
            .execute(&def.id.to_string(), invocation(&[("q", "a\0b")]))
            .await
            .unwrap();

        assert_eq!(result.status_code, 202);
        assert_eq!(result.response, Value::String(body.to_string()));

        let logs = h.logs.entries();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, 202);
        assert!(logs[0].error.is_none());
        assert_eq!(logs[0].response_data.as_deref(), Some(body));
    }

    #[tokio::test]
    async fn test_log_sink_failure_propagates() {
        let def = definition();
        let logs = MemoryLogs {
            fail: true,
            ..Default::default()
        };
        let h = harness_with_logs(def.clone(), FakeUpstream::responding(200, None, "ok"), logs);

        let err = h
            .service
            .execute(&def.id.to_string(), invocation(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Internal(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_each_attempt_appends_one_entry() {
        let def = definition();
        let h = harness(def.clone(), FakeUpstream::responding(204, None, ""));

        for _ in 0..3 {
            h.service
                .execute(&def.id.to_string(), invocation(&[]))
                .await
                .unwrap();
        }

        assert_eq!(h.logs.entries().len(), 3);
        assert_eq!(h.upstream.requests().len(), 3);
    }
}
