// Blockchain identity, professional records and role administration.

use super::{send, table, Report, NO_BODY};
use crate::api::{endpoints, ApiClient, Endpoint};
use crate::extract::{extract, lookup, parse_body, scalar_text};
use crate::http::Transport;
use crate::session::Session;
use serde::Serialize;
use serde_json::Value;

const TX_HASH: &str = "transaction.hash";

pub fn register_identity<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let res = match send(api, session, &endpoints::REGISTER_IDENTITY, NO_BODY) {
        Ok(res) => res,
        Err(report) => return report,
    };
    let ex = extract(&res.body, &[TX_HASH, "transaction.blockNumber"]);
    let hash = match ex.text(TX_HASH) {
        Some(hash) => hash,
        None => return Report::degraded(endpoints::REGISTER_IDENTITY.name),
    };
    let mut lines = vec![
        "Identity registered on blockchain successfully.".to_string(),
        format!("Transaction hash: {}", hash),
    ];
    if let Some(block) = ex.text("transaction.blockNumber") {
        lines.push(format!("Block number: {}", block));
    }
    Report::ok(lines)
}

pub fn identity_status<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let res = match send(api, session, &endpoints::IDENTITY_STATUS, NO_BODY) {
        Ok(res) => res,
        Err(report) => return report,
    };
    let ex = extract(
        &res.body,
        &[
            "blockchainStatus.walletAddress",
            "blockchainStatus.isRegistered",
            "blockchainStatus.isVerified",
            "blockchainStatus.professionalRecordCount",
            "databaseStatus.hasBiometricData",
            "databaseStatus.biometricData.facemesh_hash",
        ],
    );
    if ex.text("blockchainStatus.isRegistered").is_none() {
        return Report::degraded(endpoints::IDENTITY_STATUS.name);
    }
    let or_na = |path: &str| ex.text(path).unwrap_or("N/A").to_string();

    let mut lines = vec![
        "Blockchain Identity Status:".to_string(),
        format!("Wallet Address: {}", or_na("blockchainStatus.walletAddress")),
        format!("Is Registered: {}", or_na("blockchainStatus.isRegistered")),
        format!("Is Verified: {}", or_na("blockchainStatus.isVerified")),
        format!(
            "Professional Record Count: {}",
            or_na("blockchainStatus.professionalRecordCount")
        ),
        String::new(),
        "Database Status:".to_string(),
        format!("Has Biometric Data: {}", or_na("databaseStatus.hasBiometricData")),
    ];
    if let Some(hash) = ex.text("databaseStatus.biometricData.facemesh_hash") {
        lines.push(format!("Biometric Hash: {}", hash));
    }
    Report::ok(lines)
}

/// New professional record. `end_date` is `None` for a current position.
#[derive(Debug, Clone, Serialize)]
pub struct RecordInput {
    pub title: String,
    pub organization: String,
    pub description: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

pub fn create_record<T: Transport>(api: &ApiClient<T>, session: &Session, input: &RecordInput) -> Report {
    let res = match send(api, session, &endpoints::CREATE_RECORD, Some(input)) {
        Ok(res) => res,
        Err(report) => return report,
    };
    match extract(&res.body, &["record.id"]).text("record.id") {
        Some(id) => Report::ok([format!("Professional record created. Record ID: {}", id)]),
        None => Report::degraded(endpoints::CREATE_RECORD.name),
    }
}

/// A professional record as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbRecord {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub on_chain: bool,
}

fn field(record: &Value, key: &str) -> Option<String> {
    lookup(record, key).and_then(scalar_text)
}

// Missing, null and the literal string "null" all mean "still ongoing".
fn end_date(record: &Value, key: &str) -> Option<String> {
    field(record, key).filter(|d| !d.is_empty() && d != "null")
}

fn record_rows(body: &str, endpoint: &Endpoint) -> Result<Vec<Value>, Report> {
    let root = parse_body(body).ok_or_else(|| Report::degraded(endpoint.name))?;
    Ok(match lookup(&root, "records") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}

/// Fetch the user's database records.
pub fn fetch_records<T: Transport>(api: &ApiClient<T>, session: &Session) -> Result<Vec<DbRecord>, Report> {
    let res = send(api, session, &endpoints::LIST_RECORDS, NO_BODY)?;
    let rows = record_rows(&res.body, &endpoints::LIST_RECORDS)?;
    Ok(rows
        .iter()
        .map(|r| DbRecord {
            id: field(r, "id").unwrap_or_default(),
            title: field(r, "title").unwrap_or_default(),
            organization: field(r, "organization").unwrap_or_default(),
            start_date: field(r, "start_date").unwrap_or_default(),
            end_date: end_date(r, "end_date"),
            on_chain: field(r, "blockchain_tx_hash").map_or(false, |h| !h.is_empty()),
        })
        .collect())
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

pub fn list_records<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let records = match fetch_records(api, session) {
        Ok(records) => records,
        Err(report) => return report,
    };
    if records.is_empty() {
        return Report::ok(["No professional records found."]);
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.title.clone(),
                r.organization.clone(),
                r.start_date.clone(),
                r.end_date.clone().unwrap_or_else(|| "Current".to_string()),
                yes_no(r.on_chain),
            ]
        })
        .collect();
    let mut lines = vec!["Professional Records:".to_string()];
    lines.extend(table::render(
        &["ID", "Title", "Organization", "Start Date", "End Date", "On Blockchain"],
        &rows,
    ));
    Report::ok(lines)
}

impl DbRecord {
    /// One-line summary used when picking a record.
    pub fn summary(&self) -> String {
        format!(
            "{} at {} ({} to {})",
            self.title,
            self.organization,
            self.start_date,
            self.end_date.as_deref().unwrap_or("Current")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddRecordPayload<'a> {
    record_id: &'a str,
}

/// Anchor `records[selection - 1]` on chain. `selection` is 1-based as
/// shown to the user.
pub fn add_record_to_chain<T: Transport>(
    api: &ApiClient<T>,
    session: &Session,
    records: &[DbRecord],
    selection: usize,
) -> Report {
    let record = match selection.checked_sub(1).and_then(|i| records.get(i)) {
        Some(record) => record,
        None => return Report::invalid("Invalid selection."),
    };
    let payload = AddRecordPayload { record_id: &record.id };
    let res = match send(api, session, &endpoints::ADD_RECORD_ON_CHAIN, Some(&payload)) {
        Ok(res) => res,
        Err(report) => return report,
    };
    match extract(&res.body, &[TX_HASH]).text(TX_HASH) {
        Some(hash) => Report::ok([
            "Professional record added to blockchain successfully.".to_string(),
            format!("Transaction hash: {}", hash),
        ]),
        None => Report::degraded(endpoints::ADD_RECORD_ON_CHAIN.name),
    }
}

pub fn list_chain_records<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let res = match send(api, session, &endpoints::LIST_CHAIN_RECORDS, NO_BODY) {
        Ok(res) => res,
        Err(report) => return report,
    };
    let rows = match record_rows(&res.body, &endpoints::LIST_CHAIN_RECORDS) {
        Ok(rows) => rows,
        Err(report) => return report,
    };
    if rows.is_empty() {
        return Report::ok(["No blockchain professional records found."]);
    }
    let ex = extract(&res.body, &["walletAddress", "recordCount"]);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                field(r, "index").unwrap_or_default(),
                field(r, "dataHash").unwrap_or_default(),
                field(r, "startDate").unwrap_or_default(),
                end_date(r, "endDate").unwrap_or_else(|| "Current".to_string()),
                yes_no(field(r, "isVerified").as_deref() == Some("true")),
                field(r, "createdAt").unwrap_or_default(),
            ]
        })
        .collect();

    let mut lines = vec![
        "Blockchain Professional Records:".to_string(),
        format!("Wallet Address: {}", ex.text("walletAddress").unwrap_or("N/A")),
        format!("Record Count: {}", ex.text("recordCount").unwrap_or("N/A")),
    ];
    lines.extend(table::render(
        &["Index", "Data Hash", "Start Date", "End Date", "Verified", "Created At"],
        &cells,
    ));
    Report::ok(lines)
}

/// Target wallet and role name for role administration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    pub user_address: String,
    pub role: String,
}

pub const KNOWN_ROLES: &[&str] = &["USER_ROLE", "GOVERNMENT_ROLE", "ADMIN_ROLE"];

fn role_change<T: Transport>(
    api: &ApiClient<T>,
    session: &Session,
    endpoint: &Endpoint,
    input: &RoleInput,
    done: String,
) -> Report {
    let res = match send(api, session, endpoint, Some(input)) {
        Ok(res) => res,
        Err(report) => return report,
    };
    match extract(&res.body, &[TX_HASH]).text(TX_HASH) {
        Some(hash) => Report::ok([done, format!("Transaction hash: {}", hash)]),
        None => Report::degraded(endpoint.name),
    }
}

pub fn grant_role<T: Transport>(api: &ApiClient<T>, session: &Session, input: &RoleInput) -> Report {
    let done = format!("Role {} granted successfully to {}", input.role, input.user_address);
    role_change(api, session, &endpoints::GRANT_ROLE, input, done)
}

pub fn revoke_role<T: Transport>(api: &ApiClient<T>, session: &Session, input: &RoleInput) -> Report {
    let done = format!("Role {} revoked successfully from {}", input.role, input.user_address);
    role_change(api, session, &endpoints::REVOKE_ROLE, input, done)
}
