use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use ureq::http::StatusCode;
use ureq::{Agent, Body, RequestBuilder};

use super::Multipart;
use crate::config::ApiSettings;
use crate::error::{Result, SchoolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Patch,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
        }
    }
}

/// Thin wrapper over a `ureq` agent that knows the backend base URL, attaches the
/// configured headers and turns every failure into a [`SchoolError`].
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    headers: Vec<(String, String)>,
    body_limit: u64,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            // Error bodies carry the backend's message; read them ourselves.
            .http_status_as_error(false)
            .build()
            .into();

        let mut headers: Vec<(String, String)> = settings
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.sort();
        if let Some(token) = &settings.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            headers,
            body_limit: settings.max_response_mb.saturating_mul(1024 * 1024),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn decorate<B>(&self, mut request: RequestBuilder<B>) -> RequestBuilder<B> {
        request = request.header("Accept", "application/json");
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let result = self.decorate(self.agent.get(&url)).call();
        let text = self.read(&url, result)?;
        decode(&url, &text)
    }

    pub fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let payload = serde_json::to_vec(body).map_err(|e| SchoolError::Decode {
            url: url.clone(),
            reason: format!("could not encode request body: {e}"),
        })?;
        let text = self.send_raw(method, &url, "application/json", &payload)?;
        decode(&url, &text)
    }

    pub fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Multipart,
    ) -> Result<T> {
        let url = self.url(path);
        let content_type = form.content_type();
        let payload = form.into_body();
        let text = self.send_raw(method, &url, &content_type, &payload)?;
        decode(&url, &text)
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        log::debug!("DELETE {url}");
        let result = self.decorate(self.agent.delete(&url)).call();
        self.read(&url, result)?;
        Ok(())
    }

    fn send_raw(&self, method: Method, url: &str, content_type: &str, payload: &[u8]) -> Result<String> {
        log::debug!("{} {url} ({} bytes)", method.as_str(), payload.len());
        let request = match method {
            Method::Post => self.agent.post(url),
            Method::Put => self.agent.put(url),
            Method::Patch => self.agent.patch(url),
        };
        let result = self
            .decorate(request)
            .header("Content-Type", content_type)
            .send(payload);
        self.read(url, result)
    }

    /// Classify the outcome: transport failure, 4xx, 5xx, or a body to decode.
    fn read(
        &self,
        url: &str,
        result: std::result::Result<ureq::http::Response<Body>, ureq::Error>,
    ) -> Result<String> {
        let mut response = result.map_err(|source| {
            log::warn!("no response from {url}: {source}");
            SchoolError::Network {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()
            .map_err(|source| match source {
                // A response did arrive; it is just too large to accept.
                ureq::Error::BodyExceedsLimit(limit) => SchoolError::Decode {
                    url: url.to_string(),
                    reason: format!(
                        "response body is larger than {limit} bytes (raise api.max_response_mb)"
                    ),
                },
                source => SchoolError::Network {
                    url: url.to_string(),
                    source,
                },
            })?;

        if status >= 400 {
            let message = error_message(status, &text);
            log::warn!("{url} answered {status}: {message}");
            return Err(if status >= 500 {
                SchoolError::Server { status, message }
            } else {
                SchoolError::Rejected { status, message }
            });
        }

        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T> {
    // DELETE and some PUTs answer with an empty body.
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| SchoolError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Human-readable message from an error body.
///
/// Looks for `detail`, `message` or `error`; otherwise flattens a field-error
/// object (`{"name": ["This field is required."]}`); otherwise the raw text.
pub fn error_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(obj) = value.as_object() {
            for key in ["detail", "message", "error"] {
                if let Some(text) = obj.get(key).and_then(|v| v.as_str()) {
                    return text.to_string();
                }
            }
            let fields: Vec<String> = obj
                .iter()
                .map(|(field, v)| format!("{field}: {}", flatten_value(v)))
                .collect();
            if !fields.is_empty() {
                return fields.join("; ");
            }
        } else if let Some(text) = value.as_str() {
            return text.to_string();
        }
    }

    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown error")
        .to_string()
}

fn flatten_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer a single request with `body` and return the base URL.
    fn serve_once(body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 && line != "\r\n" {
                line.clear();
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body.as_bytes());
        });
        format!("http://{addr}")
    }

    fn big_array(rows: usize) -> String {
        let row = format!("\"{}\"", "x".repeat(1000));
        format!("[{}]", vec![row; rows].join(","))
    }

    #[test]
    fn prefers_detail_field() {
        assert_eq!(error_message(404, r#"{"detail": "Not found."}"#), "Not found.");
        assert_eq!(error_message(400, r#"{"message": "bad month"}"#), "bad month");
    }

    #[test]
    fn flattens_field_errors() {
        let body = r#"{"amount": ["A valid number is required."], "date": ["This field is required."]}"#;
        assert_eq!(
            error_message(400, body),
            "amount: A valid number is required.; date: This field is required."
        );
    }

    #[test]
    fn falls_back_to_text_then_reason() {
        assert_eq!(error_message(502, "upstream down"), "upstream down");
        assert_eq!(error_message(503, ""), "Service Unavailable");
    }

    #[test]
    fn builds_urls_and_auth_header() {
        let settings = ApiSettings {
            base_url: "http://school.test/".to_string(),
            timeout_secs: 5,
            token: Some("abc".to_string()),
            headers: BTreeMap::new(),
            ..ApiSettings::default()
        };
        let client = ApiClient::new(&settings);
        assert_eq!(client.url("/api/students/"), "http://school.test/api/students/");
        assert!(client
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer abc"));
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        let settings = ApiSettings {
            // Port 9 (discard) on loopback is closed on test machines.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            token: None,
            headers: BTreeMap::new(),
            ..ApiSettings::default()
        };
        let client = ApiClient::new(&settings);
        let err = client.get_json::<serde_json::Value>("/api/ledger/").unwrap_err();
        assert!(err.is_network(), "{err}");
    }

    #[test]
    fn collections_past_ten_mib_are_read_whole() {
        let base_url = serve_once(big_array(12_600));
        let client = ApiClient::new(&ApiSettings {
            base_url,
            ..ApiSettings::default()
        });
        let rows: Vec<String> = client.get_json("/api/expenses/").unwrap();
        assert_eq!(rows.len(), 12_600);
    }

    #[test]
    fn oversized_body_is_not_a_network_error() {
        let base_url = serve_once(big_array(2_200));
        let client = ApiClient::new(&ApiSettings {
            base_url,
            max_response_mb: 1,
            ..ApiSettings::default()
        });
        let err = client.get_json::<Vec<String>>("/api/expenses/").unwrap_err();
        assert!(!err.is_network(), "{err}");
        assert!(matches!(err, SchoolError::Decode { .. }), "{err}");
    }
}
