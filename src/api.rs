// API client module: the one place where requests to the identity registry
// are built, sent and classified. Operation handlers describe *what* to send
// (an `Endpoint` plus a JSON payload); `ApiClient::execute` does the rest.

use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::session::Session;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Fixed `(method, path, requires_auth)` triple for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub requires_auth: bool,
}

impl Endpoint {
    const fn open(name: &'static str, method: HttpMethod, path: &'static str) -> Self {
        Endpoint { name, method, path, requires_auth: false }
    }

    const fn authed(name: &'static str, method: HttpMethod, path: &'static str) -> Self {
        Endpoint { name, method, path, requires_auth: true }
    }
}

/// Every endpoint the client talks to.
pub mod endpoints {
    use super::Endpoint;
    use crate::http::HttpMethod::{Get, Post, Put};

    pub const REGISTER: Endpoint = Endpoint::open("register", Post, "/api/auth/register");
    pub const LOGIN: Endpoint = Endpoint::open("login", Post, "/api/auth/login");
    pub const VIEW_PROFILE: Endpoint = Endpoint::authed("view profile", Get, "/api/users/profile");
    pub const UPDATE_PROFILE: Endpoint = Endpoint::authed("update profile", Put, "/api/users/profile");
    pub const CONNECT_WALLET: Endpoint = Endpoint::authed("connect wallet", Post, "/api/users/wallet");
    pub const REGISTER_BIOMETRIC: Endpoint =
        Endpoint::authed("register biometric", Post, "/api/identity/register-biometric");
    pub const BIOMETRIC_STATUS: Endpoint =
        Endpoint::authed("biometric status", Get, "/api/identity/biometric-status");
    pub const REGISTER_IDENTITY: Endpoint =
        Endpoint::authed("register identity", Post, "/api/blockchain/register-identity");
    pub const IDENTITY_STATUS: Endpoint =
        Endpoint::authed("identity status", Get, "/api/blockchain/identity-status");
    pub const CREATE_RECORD: Endpoint =
        Endpoint::authed("create professional record", Post, "/api/users/professional-records");
    pub const LIST_RECORDS: Endpoint =
        Endpoint::authed("list professional records", Get, "/api/users/professional-records");
    pub const ADD_RECORD_ON_CHAIN: Endpoint =
        Endpoint::authed("add record to blockchain", Post, "/api/blockchain/add-professional-record");
    pub const LIST_CHAIN_RECORDS: Endpoint =
        Endpoint::authed("list blockchain records", Get, "/api/blockchain/professional-records");
    pub const GRANT_ROLE: Endpoint = Endpoint::authed("grant role", Post, "/api/blockchain/admin/grant-role");
    pub const REVOKE_ROLE: Endpoint = Endpoint::authed("revoke role", Post, "/api/blockchain/admin/revoke-role");
}

/// Request executor. Holds only the transport; credentials come from the
/// `Session` passed to each call and are never stored here.
#[derive(Clone)]
pub struct ApiClient<T: Transport = ReqwestTransport> {
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client backed by a blocking reqwest transport.
    pub fn new() -> reqwest::Result<Self> {
        Ok(ApiClient::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        ApiClient { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one request and classify the outcome.
    ///
    /// `Err(Precondition)` is returned before any I/O when `requires_auth`
    /// is set and the session has no token. Otherwise a transport failure is
    /// `Err(Transport)`, a status >= 400 is `Err(Http)` and anything else,
    /// including an empty body, is `Ok`.
    pub fn execute(
        &self,
        session: &Session,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
        requires_auth: bool,
    ) -> Result<HttpResponse, RequestError> {
        let req = build_request(session, method, path, payload, requires_auth)?;
        debug!(
            method = method.as_str(),
            url = %req.url,
            bearer = req.header("Authorization").is_some(),
            "sending request"
        );

        let res = self.transport.send(&req).map_err(|cause| {
            warn!(url = %req.url, %cause, "transport failure");
            RequestError::Transport(cause)
        })?;
        debug!(status = res.status, bytes = res.body.len(), "response received");

        if res.status >= 400 {
            return Err(RequestError::Http {
                status: res.status,
                body: res.body,
            });
        }
        Ok(res)
    }

    /// [`execute`](Self::execute) driven by an endpoint table entry.
    pub fn call(
        &self,
        session: &Session,
        endpoint: &Endpoint,
        payload: Option<&Value>,
    ) -> Result<HttpResponse, RequestError> {
        self.execute(session, endpoint.method, endpoint.path, payload, endpoint.requires_auth)
    }
}

/// Serialize a typed payload. `None` fields become `null` here and are
/// dropped from the wire body by [`build_request`].
pub fn to_payload<P: Serialize>(payload: &P) -> Result<Value, RequestError> {
    serde_json::to_value(payload).map_err(|e| RequestError::Serialization(e.to_string()))
}

/// Build the wire request without sending it.
pub fn build_request(
    session: &Session,
    method: HttpMethod,
    path: &str,
    payload: Option<&Value>,
    requires_auth: bool,
) -> Result<HttpRequest, RequestError> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if requires_auth {
        let token = session.token().ok_or(RequestError::Precondition)?;
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }

    let body = payload
        .map(|p| serde_json::to_string(&strip_absent(p)))
        .transpose()
        .map_err(|e| RequestError::Serialization(e.to_string()))?;

    Ok(HttpRequest {
        method,
        url: format!("{}{}", session.base_url(), path),
        headers,
        body,
    })
}

// Top-level `null` means "left blank": omit the key entirely.
fn strip_absent(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    /// Transport that records requests and replays a scripted reply.
    struct Scripted {
        reply: Result<HttpResponse, String>,
        calls: Cell<usize>,
        last: RefCell<Option<HttpRequest>>,
    }

    impl Scripted {
        fn replying(status: u16, body: &str) -> Self {
            Scripted {
                reply: Ok(HttpResponse { status, body: body.into() }),
                calls: Cell::new(0),
                last: RefCell::new(None),
            }
        }

        fn failing(cause: &str) -> Self {
            Scripted {
                reply: Err(cause.into()),
                calls: Cell::new(0),
                last: RefCell::new(None),
            }
        }
    }

    impl Transport for Scripted {
        fn send(&self, req: &HttpRequest) -> Result<HttpResponse, String> {
            self.calls.set(self.calls.get() + 1);
            *self.last.borrow_mut() = Some(req.clone());
            self.reply.clone()
        }
    }

    fn logged_in() -> Session {
        let mut s = Session::new("http://localhost:3000");
        s.authenticate("u1".into(), "tok123".into());
        s
    }

    #[test]
    fn auth_required_without_token_never_hits_network() {
        let api = ApiClient::with_transport(Scripted::replying(200, "{}"));
        let session = Session::new("http://localhost:3000");
        for ep in [endpoints::GRANT_ROLE, endpoints::VIEW_PROFILE, endpoints::REGISTER_IDENTITY] {
            let err = api.call(&session, &ep, Some(&json!({"role": "X"}))).unwrap_err();
            assert_eq!(err, RequestError::Precondition);
        }
        assert_eq!(api.transport().calls.get(), 0);
    }

    #[test]
    fn bearer_header_only_when_required() {
        let api = ApiClient::with_transport(Scripted::replying(200, "{}"));
        let session = logged_in();

        api.call(&session, &endpoints::LOGIN, Some(&json!({}))).unwrap();
        let req = api.transport().last.borrow().clone().unwrap();
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), None);

        api.call(&session, &endpoints::GRANT_ROLE, Some(&json!({}))).unwrap();
        let req = api.transport().last.borrow().clone().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer tok123"));
        assert_eq!(req.url, "http://localhost:3000/api/blockchain/admin/grant-role");
        assert_eq!(req.method, HttpMethod::Post);
    }

    #[test]
    fn status_400_and_above_is_http_error() {
        let api = ApiClient::with_transport(Scripted::replying(401, r#"{"error":"invalid credentials"}"#));
        let err = api
            .call(&Session::new("http://h"), &endpoints::LOGIN, Some(&json!({})))
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::Http {
                status: 401,
                body: r#"{"error":"invalid credentials"}"#.into()
            }
        );
    }

    #[test]
    fn below_400_with_empty_body_is_success() {
        let api = ApiClient::with_transport(Scripted::replying(204, ""));
        let res = api.call(&logged_in(), &endpoints::CONNECT_WALLET, None).unwrap();
        assert_eq!(res.status, 204);
        assert!(res.body.is_empty());
    }

    #[test]
    fn transport_failure_is_single_attempt() {
        let api = ApiClient::with_transport(Scripted::failing("connection refused"));
        let err = api
            .call(&Session::new("http://h"), &endpoints::LOGIN, Some(&json!({})))
            .unwrap_err();
        assert_eq!(err, RequestError::Transport("connection refused".into()));
        assert_eq!(api.transport().calls.get(), 1);
    }

    #[test]
    fn null_fields_are_omitted_from_body() {
        let req = build_request(
            &Session::new("http://h"),
            HttpMethod::Post,
            "/api/auth/register",
            Some(&json!({"username": "alice", "dateOfBirth": null, "nested": {"keep": null}})),
            false,
        )
        .unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("dateOfBirth").is_none());
        assert_eq!(body["username"], "alice");
        assert!(body["nested"].get("keep").is_some());
    }

    #[test]
    fn no_payload_means_no_body() {
        let req = build_request(&logged_in(), HttpMethod::Post, "/x", None, true).unwrap();
        assert!(req.body.is_none());
    }
}
