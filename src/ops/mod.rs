// Operation handlers. Each handler takes an already-collected input,
// builds the payload, runs it through `ApiClient`, and turns the outcome
// into a `Report` for the UI to print. Only register and login touch the
// session (plus `logout`, which never hits the network).

use crate::api::{endpoints, to_payload, ApiClient, Endpoint};
use crate::error::RequestError;
use crate::extract::{extract, Extracted};
use crate::http::{HttpResponse, Transport};
use crate::session::Session;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

mod chain;
mod profile;
mod table;

pub use chain::{
    add_record_to_chain, create_record, fetch_records, grant_role, identity_status, list_chain_records,
    list_records, register_identity, revoke_role, DbRecord, RecordInput, RoleInput, KNOWN_ROLES,
};
pub use profile::{biometric_status, connect_wallet, register_biometric, update_profile, view_profile};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation succeeded and its result was fully interpreted.
    Ok,
    /// The server accepted the request but the body could not be read.
    Degraded,
    /// Precondition, transport or HTTP failure.
    Failed,
}

/// What a handler wants shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub status: Status,
    pub lines: Vec<String>,
}

impl Report {
    pub fn ok<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Report {
            status: Status::Ok,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Uniform soft-degrade report for an operation that succeeded at the
    /// HTTP level but whose body did not yield the expected fields.
    pub fn degraded(operation: &str) -> Self {
        warn!(operation, "response could not be interpreted");
        Report {
            status: Status::Degraded,
            lines: vec![format!(
                "{} succeeded on the server, but the response could not be interpreted locally.",
                capitalize(operation)
            )],
        }
    }

    pub fn failed(operation: &str, err: &RequestError) -> Self {
        let line = match err {
            RequestError::Precondition => err.to_string(),
            other => format!("{} failed. {}", capitalize(operation), other),
        };
        Report {
            status: Status::Failed,
            lines: vec![line],
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Report {
            status: Status::Failed,
            lines: vec![message.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trim user input; blank becomes `None` so the field is left off the wire.
pub fn optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LEN));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Send `payload` to `endpoint`, converting any failure into a report.
pub(crate) fn send<T: Transport, P: Serialize>(
    api: &ApiClient<T>,
    session: &Session,
    endpoint: &Endpoint,
    payload: Option<&P>,
) -> Result<HttpResponse, Report> {
    let payload: Option<Value> = payload
        .map(to_payload)
        .transpose()
        .map_err(|e| Report::failed(endpoint.name, &e))?;
    api.call(session, endpoint, payload.as_ref())
        .map_err(|e| Report::failed(endpoint.name, &e))
}

/// No request body.
pub(crate) const NO_BODY: Option<&()> = None;

/// Registration form. Optional fields are `None` when left blank.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
}

impl RegisterInput {
    /// Copy with the username trimmed; this is what gets validated and sent.
    pub fn normalized(&self) -> RegisterInput {
        RegisterInput {
            username: self.username.trim().to_string(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

const USER_ID: &str = "user.id";
const TOKEN: &str = "token";
const FULL_NAME: &str = "user.fullName";
const USERNAME: &str = "user.username";
const ROLES: &str = "user.roles";

/// Set session credentials iff both `user.id` and `token` resolved.
/// Returns the new user id.
fn establish_session(session: &mut Session, ex: &Extracted) -> Option<String> {
    let user_id = ex.text(USER_ID)?;
    let token = ex.text(TOKEN)?;
    session.authenticate(user_id.to_string(), token.to_string());
    info!(user_id, "session established");
    Some(user_id.to_string())
}

/// Display name for a login response: `fullName`, then `username`, then "User".
pub fn display_name(ex: &Extracted) -> &str {
    ex.first_text(&[FULL_NAME, USERNAME]).unwrap_or("User")
}

pub fn register<T: Transport>(api: &ApiClient<T>, session: &mut Session, input: &RegisterInput) -> Report {
    let input = input.normalized();
    if let Err(msg) = input.validate() {
        return Report::invalid(msg);
    }
    let res = match send(api, session, &endpoints::REGISTER, Some(&input)) {
        Ok(res) => res,
        Err(report) => return report,
    };

    let ex = extract(&res.body, &[USER_ID, TOKEN]);
    match establish_session(session, &ex) {
        Some(user_id) => Report::ok([
            format!("Registration successful. User ID: {}", user_id),
            "You are now logged in.".to_string(),
        ]),
        None => Report::degraded(endpoints::REGISTER.name),
    }
}

pub fn login<T: Transport>(api: &ApiClient<T>, session: &mut Session, input: &LoginInput) -> Report {
    let res = match send(api, session, &endpoints::LOGIN, Some(input)) {
        Ok(res) => res,
        Err(report) => return report,
    };

    let ex = extract(&res.body, &[USER_ID, TOKEN, FULL_NAME, USERNAME, ROLES]);
    if establish_session(session, &ex).is_none() {
        return Report::degraded(endpoints::LOGIN.name);
    }

    let mut lines = vec![format!("Login successful. Welcome, {}!", display_name(&ex))];
    if let Some(roles) = ex.get(ROLES) {
        lines.push(format!("Your roles: {}", roles.display()));
    }
    Report::ok(lines)
}

/// Clear the session. Never fails and needs no network.
pub fn logout(session: &mut Session) -> Report {
    session.clear();
    Report::ok(["Logged out successfully."])
}


#[cfg(test)]
mod tests {
    use super::testing::Replay;
    use super::*;

    fn register_input(dob: &str) -> RegisterInput {
        RegisterInput {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "password123".into(),
            full_name: "Alice Doe".into(),
            date_of_birth: optional(dob),
            phone_number: optional(""),
        }
    }

    fn login_input() -> LoginInput {
        LoginInput {
            email: "alice@example.com".into(),
            password: "password123".into(),
        }
    }

    #[test]
    fn login_sets_session_and_reports_name_and_roles() {
        let api = ApiClient::with_transport(Replay::with(
            200,
            r#"{"user":{"id":"u1","fullName":"Alice","roles":["ADMIN_ROLE","USER_ROLE"]},"token":"tok123"}"#,
        ));
        let mut session = Session::new("http://localhost:3000");
        let report = login(&api, &mut session, &login_input());

        assert_eq!(report.status, Status::Ok);
        assert_eq!(session.user_id(), Some("u1"));
        assert_eq!(session.token(), Some("tok123"));
        assert!(session.is_authenticated());
        assert_eq!(report.lines[0], "Login successful. Welcome, Alice!");
        assert_eq!(report.lines[1], "Your roles: ADMIN_ROLE, USER_ROLE");
    }

    #[test]
    fn login_name_falls_back_to_username_then_user() {
        let api = ApiClient::with_transport(Replay::with(200, r#"{"user":{"id":"u2","username":"bob"},"token":"t"}"#));
        let mut session = Session::new("http://h");
        let report = login(&api, &mut session, &login_input());
        assert_eq!(report.lines, vec!["Login successful. Welcome, bob!"]);

        let api = ApiClient::with_transport(Replay::with(200, r#"{"user":{"id":"u3"},"token":"t"}"#));
        let report = login(&api, &mut session, &login_input());
        assert_eq!(report.lines, vec!["Login successful. Welcome, User!"]);
    }

    #[test]
    fn login_without_token_degrades_and_leaves_session_alone() {
        let api = ApiClient::with_transport(Replay::with(200, r#"{"user":{"id":"u1","fullName":"Alice"}}"#));
        let mut session = Session::new("http://h");
        let before = session.clone();
        let report = login(&api, &mut session, &login_input());

        assert_eq!(report.status, Status::Degraded);
        assert!(report.lines[0].contains("succeeded"));
        assert_eq!(session, before);
    }

    #[test]
    fn degraded_login_keeps_previous_credentials() {
        let api = ApiClient::with_transport(Replay::with(200, "not json"));
        let mut session = Session::new("http://h");
        session.authenticate("old".into(), "old-token".into());
        let before = session.clone();
        let report = login(&api, &mut session, &login_input());
        assert_eq!(report.status, Status::Degraded);
        assert_eq!(session, before);
    }

    #[test]
    fn login_401_reports_raw_body() {
        let api = ApiClient::with_transport(Replay::with(401, r#"{"error":"invalid credentials"}"#));
        let mut session = Session::new("http://h");
        let report = login(&api, &mut session, &login_input());

        assert_eq!(report.status, Status::Failed);
        assert!(report.lines[0].contains("401"));
        assert!(report.lines[0].contains(r#"{"error":"invalid credentials"}"#));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn register_omits_blank_optional_fields() {
        let api = ApiClient::with_transport(Replay::with(201, r#"{"user":{"id":"u9"},"token":"tk"}"#));
        let mut session = Session::new("http://h");
        let report = register(&api, &mut session, &register_input(""));

        assert!(report.is_ok());
        let body = api.transport().last_body();
        assert!(body.get("dateOfBirth").is_none());
        assert!(body.get("phoneNumber").is_none());
        assert_eq!(body["fullName"], "Alice Doe");
        assert_eq!(body["username"], "alice");
        assert_eq!(session.user_id(), Some("u9"));
        assert_eq!(report.lines[0], "Registration successful. User ID: u9");
    }

    #[test]
    fn register_sends_filled_optional_fields() {
        let api = ApiClient::with_transport(Replay::with(201, r#"{"user":{"id":"u9"},"token":"tk"}"#));
        let mut session = Session::new("http://h");
        register(&api, &mut session, &register_input("1990-01-01"));
        assert_eq!(api.transport().last_body()["dateOfBirth"], "1990-01-01");
    }

    #[test]
    fn register_sends_trimmed_username() {
        let api = ApiClient::with_transport(Replay::with(201, r#"{"user":{"id":"u9"},"token":"tk"}"#));
        let mut session = Session::new("http://h");
        let mut input = register_input("");
        input.username = "  alice  ".into();
        assert!(register(&api, &mut session, &input).is_ok());
        assert_eq!(api.transport().last_body()["username"], "alice");
    }

    #[test]
    fn register_without_token_degrades_and_leaves_session_alone() {
        let api = ApiClient::with_transport(Replay::with(201, r#"{"user":{"id":"u9"}}"#));
        let mut session = Session::new("http://h");
        let before = session.clone();
        let report = register(&api, &mut session, &register_input(""));

        assert_eq!(report.status, Status::Degraded);
        assert_eq!(
            report.lines,
            vec!["Register succeeded on the server, but the response could not be interpreted locally."]
        );
        assert_eq!(session, before);
    }

    #[test]
    fn register_conflict_reports_status_and_raw_body() {
        let api = ApiClient::with_transport(Replay::with(409, r#"{"error":"email taken"}"#));
        let mut session = testing::logged_in();
        let before = session.clone();
        let report = register(&api, &mut session, &register_input(""));

        assert_eq!(report.status, Status::Failed);
        assert!(report.lines[0].contains("HTTP 409"));
        assert!(report.lines[0].contains(r#"{"error":"email taken"}"#));
        assert_eq!(session, before);
    }

    #[test]
    fn register_rejects_short_credentials_without_network() {
        let api = ApiClient::with_transport(Replay::default());
        let mut session = Session::new("http://h");
        let mut input = register_input("");
        input.username = "al".into();
        assert_eq!(register(&api, &mut session, &input).status, Status::Failed);

        let mut input = register_input("");
        input.password = "short".into();
        assert_eq!(register(&api, &mut session, &input).status, Status::Failed);
        assert_eq!(api.transport().calls(), 0);
    }

    #[test]
    fn transport_failure_is_reported() {
        let api = ApiClient::with_transport(Replay::default());
        let mut session = Session::new("http://h");
        let report = login(&api, &mut session, &login_input());
        assert_eq!(report.status, Status::Failed);
        assert!(report.lines[0].contains("no scripted reply"));
        assert_eq!(api.transport().calls(), 1);
    }

    #[test]
    fn logout_twice_equals_once() {
        let mut session = testing::logged_in();
        assert!(logout(&mut session).is_ok());
        let once = session.clone();
        logout(&mut session);
        assert_eq!(session, once);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn optional_trims_and_drops_blank() {
        assert_eq!(optional("   "), None);
        assert_eq!(optional(" x "), Some("x".to_string()));
    }

    #[test]
    fn validators() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }
}
