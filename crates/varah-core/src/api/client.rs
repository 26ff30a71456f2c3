//! API client for communicating with the Varah workforce REST API.
//!
//! This module provides the `ApiClient` struct, the single chokepoint
//! for authentication, registration, and employee roster calls.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::auth::Session;
use crate::models::Employee;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the hosted Varah service. All paths are relative to this.
const BASE_URL: &str = "https://varah-8asg.onrender.com";

/// HTTP request timeout in seconds. A request still in flight when the
/// deadline elapses is aborted and fails with `ApiError::Timeout`.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// API client for the Varah service.
/// Clone is cheap - reqwest::Client pools connections behind an Arc, and
/// clones share the injected session handle.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client against the production Varah host.
    pub fn new(session: Session) -> Result<Self, ApiError> {
        Self::build(session, BASE_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create a client against an alternate host. Tests point this at a
    /// mock server.
    pub fn with_base_url(session: Session, base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(
            session,
            base_url,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    fn build(
        session: Session,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
        })
    }

    /// The session handle this client reads tokens from and clears on 401.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Request chokepoint
    // =========================================================================

    /// Send a request and normalize the response.
    ///
    /// Returns `Ok(Some(T))` for a successful JSON response, `Ok(None)` for
    /// a successful response without a JSON body (e.g. HTTP 204 from a
    /// delete), and `Err` otherwise.
    ///
    /// A 401 ends the session before the error is returned, regardless of
    /// what the response body contains. Callers see the distinguishable
    /// `ApiError::Unauthorized` and decide how to present it.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Option<T>, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        if let Some(ref body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "Request completed");

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Received 401, clearing session");
            self.session.logout();
            return Err(ApiError::Unauthorized);
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if is_json {
            let text = response.text().await.map_err(ApiError::from_transport)?;
            if !status.is_success() {
                return Err(ApiError::from_json_body(status, &text));
            }
            let parsed = serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            Ok(Some(parsed))
        } else if status.is_success() {
            // No content (e.g. 204). Callers treat this as success with
            // no payload.
            Ok(None)
        } else {
            Err(ApiError::from_non_json(status))
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with email and password. On success the returned bearer token
    /// is stored in the injected session; every subsequent request carries it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let auth: AuthResponse = self
            .request(Method::POST, "/api/auth/login", Some(body))
            .await?
            .ok_or_else(|| ApiError::InvalidResponse("Login returned no body".to_string()))?;

        self.session.login(auth.token);
        Ok(())
    }

    /// Register a new company account. Does not log in.
    pub async fn register(
        &self,
        company_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "companyName": company_name,
            "email": email,
            "password": password,
        });

        let _: Option<MessageResponse> = self
            .request(Method::POST, "/api/auth/register", Some(body))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Employees
    // =========================================================================

    /// Fetch the employee roster for the logged-in company
    pub async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let employees: Option<Vec<Employee>> =
            self.request(Method::GET, "/api/employees", None).await?;
        Ok(employees.unwrap_or_default())
    }

    /// Create an employee, returning the server's confirmation message
    /// if it sent one
    pub async fn create_employee(
        &self,
        name: &str,
        nfc_card_id: &str,
    ) -> Result<Option<String>, ApiError> {
        let body = serde_json::json!({
            "name": name,
            "nfc_card_id": nfc_card_id,
        });

        let response: Option<MessageResponse> = self
            .request(Method::POST, "/api/employees", Some(body))
            .await?;
        Ok(response.and_then(|r| r.message))
    }

    /// Delete an employee. The server answers 204 with no body.
    pub async fn delete_employee(&self, id: i64) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self
            .request(Method::DELETE, &format!("/api/employees/{}", id), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, session: Session) -> ApiClient {
        ApiClient::with_base_url(session, server.uri()).expect("build client")
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        client.fetch_employees().await.expect("fetch employees");

        let requests = server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_authenticated_request_carries_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new();
        session.login("sekrit".to_string());

        let client = client_for(&server, session);
        client.fetch_employees().await.expect("fetch employees");
    }

    #[tokio::test]
    async fn test_login_stores_token_for_subsequent_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "boss@acme.test",
                "password": "hunter2",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"token": "abc", "companyName": "Acme"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new();
        let client = client_for(&server, session.clone());

        client.login("boss@acme.test", "hunter2").await.expect("login");
        assert!(session.is_authenticated());

        client.fetch_employees().await.expect("fetch employees");
    }

    #[tokio::test]
    async fn test_register_sends_camel_case_body_and_stays_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(serde_json::json!({
                "companyName": "Acme Corp",
                "email": "boss@acme.test",
                "password": "hunter2",
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"message": "Account created"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new();
        let client = client_for(&server, session.clone());

        client
            .register("Acme Corp", "boss@acme.test", "hunter2")
            .await
            .expect("register");

        // Registration does not log in
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_401_clears_session_regardless_of_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
            .mount(&server)
            .await;

        let session = Session::new();
        session.login("stale".to_string());

        let client = client_for(&server, session.clone());
        let err = client.fetch_employees().await.expect_err("should fail");

        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_error_message_comes_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        let err = client.login("a@b.test", "wrong").await.expect_err("should fail");

        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_json_error_without_message_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"oops": true})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        let err = client.fetch_employees().await.expect_err("should fail");

        assert_eq!(err.to_string(), "Server Error: 500");
    }

    #[tokio::test]
    async fn test_non_json_error_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_string("<html>Bad Gateway</html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        let err = client.fetch_employees().await.expect_err("should fail");

        assert_eq!(
            err.to_string(),
            "Server returned a non-JSON error page (Status: 502)"
        );
    }

    #[tokio::test]
    async fn test_delete_with_204_resolves_without_payload() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/employees/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new();
        session.login("abc".to_string());

        let client = client_for(&server, session.clone());
        client.delete_employee(9).await.expect("delete employee");

        // A non-401 outcome leaves the session untouched.
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::build(Session::new(), server.uri(), Duration::from_millis(250))
            .expect("build client");
        let err = client.fetch_employees().await.expect_err("should time out");

        assert!(matches!(err, ApiError::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_employees_parses_roster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Ada Lovelace", "nfc_card_id": "04:A2"},
                {"id": 2, "name": "Grace Hopper", "nfc_card_id": "04:B7"},
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        let employees = client.fetch_employees().await.expect("fetch employees");

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].display_name(), "Ada Lovelace");
        assert_eq!(employees[1].card_display(), "04:B7");
    }

    #[tokio::test]
    async fn test_create_employee_returns_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees"))
            .and(body_json(serde_json::json!({
                "name": "Ada Lovelace",
                "nfc_card_id": "04:A2",
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"message": "Employee added"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Session::new());
        let message = client
            .create_employee("Ada Lovelace", "04:A2")
            .await
            .expect("create employee");

        assert_eq!(message.as_deref(), Some("Employee added"));
    }
}
