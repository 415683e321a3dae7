// Profile, wallet and biometric operations.

use super::{send, Report, NO_BODY};
use crate::api::{endpoints, ApiClient};
use crate::extract::{extract, extract_from, lookup, parse_body, scalar_text};
use crate::http::Transport;
use crate::session::Session;
use serde::Serialize;
use serde_json::{json, Value};

const PROFILE_FIELDS: &[&str] = &[
    "user.username",
    "user.fullName",
    "user.email",
    "user.roles",
    "user.walletAddress",
    "user.dateOfBirth",
    "user.phoneNumber",
    "user.createdAt",
    "user.lastLogin",
    "user.isVerified",
];

pub fn view_profile<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let res = match send(api, session, &endpoints::VIEW_PROFILE, NO_BODY) {
        Ok(res) => res,
        Err(report) => return report,
    };
    let root = match parse_body(&res.body) {
        Some(root) if root.get("user").map_or(false, Value::is_object) => root,
        _ => return Report::degraded(endpoints::VIEW_PROFILE.name),
    };
    let ex = extract_from(&root, PROFILE_FIELDS);
    let or_na = |path: &str| ex.text(path).unwrap_or("N/A").to_string();

    let mut lines = vec![
        "User Profile:".to_string(),
        format!("Username: {}", or_na("user.username")),
        format!("Full Name: {}", or_na("user.fullName")),
        format!("Email: {}", or_na("user.email")),
    ];
    if let Some(roles) = ex.get("user.roles") {
        lines.push(format!("Roles: {}", roles.display()));
    }
    match ex.text("user.walletAddress").filter(|w| !w.is_empty()) {
        Some(wallet) => lines.push(format!("Wallet Address: {}", wallet)),
        None => lines.push("Wallet Address: Not connected".to_string()),
    }
    for (path, label) in [
        ("user.dateOfBirth", "Date of Birth"),
        ("user.phoneNumber", "Phone Number"),
        ("user.createdAt", "Account Created"),
        ("user.lastLogin", "Last Login"),
    ] {
        if let Some(value) = ex.text(path).filter(|v| !v.is_empty()) {
            lines.push(format!("{}: {}", label, value));
        }
    }
    if let Some(verified) = ex.text("user.isVerified") {
        let status = if verified == "true" { "Verified" } else { "Not Verified" };
        lines.push(format!("Verification Status: {}", status));
    }
    if let Some(Value::Object(status)) = lookup(&root, "blockchainStatus") {
        lines.push(String::new());
        lines.push("Blockchain Status:".to_string());
        for (key, value) in status {
            let shown = scalar_text(value).unwrap_or_else(|| value.to_string());
            lines.push(format!("{}: {}", key, shown));
        }
    }
    Report::ok(lines)
}

#[derive(Debug, Clone, Serialize)]
struct ProfileUpdate<'a> {
    name: &'a str,
}

/// Update the display name. `None` means nothing to change: no request.
pub fn update_profile<T: Transport>(api: &ApiClient<T>, session: &Session, name: Option<&str>) -> Report {
    let name = match name {
        Some(name) => name,
        None => return Report::ok(["No changes to update."]),
    };
    match send(api, session, &endpoints::UPDATE_PROFILE, Some(&ProfileUpdate { name })) {
        Ok(_) => Report::ok(["Profile updated successfully."]),
        Err(report) => report,
    }
}

#[derive(Debug, Clone, Serialize)]
struct WalletPayload<'a> {
    wallet_address: &'a str,
}

pub fn connect_wallet<T: Transport>(api: &ApiClient<T>, session: &Session, wallet_address: &str) -> Report {
    match send(api, session, &endpoints::CONNECT_WALLET, Some(&WalletPayload { wallet_address })) {
        Ok(_) => Report::ok([format!("Wallet {} connected successfully.", wallet_address)]),
        Err(report) => report,
    }
}

/// Placeholder facemesh; a real capture would come from the face-auth side.
fn sample_biometric() -> Value {
    json!({
        "biometric_data": {
            "facemesh_points": [
                {"x": 0.1, "y": 0.2, "z": 0.3},
                {"x": 0.2, "y": 0.3, "z": 0.4}
            ]
        }
    })
}

pub fn register_biometric<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    match send(api, session, &endpoints::REGISTER_BIOMETRIC, Some(&sample_biometric())) {
        Ok(_) => Report::ok(["Biometric data registered successfully."]),
        Err(report) => report,
    }
}

pub fn biometric_status<T: Transport>(api: &ApiClient<T>, session: &Session) -> Report {
    let res = match send(api, session, &endpoints::BIOMETRIC_STATUS, NO_BODY) {
        Ok(res) => res,
        Err(report) => return report,
    };
    let ex = extract(
        &res.body,
        &[
            "has_biometric_data",
            "biometric_data.created_at",
            "biometric_data.is_active",
            "biometric_data.blockchain_tx_hash",
        ],
    );
    let has = match ex.text("has_biometric_data") {
        Some(has) => has,
        None => return Report::degraded(endpoints::BIOMETRIC_STATUS.name),
    };

    let mut lines = vec![
        "Biometric Status:".to_string(),
        format!("Has biometric data: {}", has),
    ];
    if has == "true" {
        lines.push(format!(
            "Registered on: {}",
            ex.text("biometric_data.created_at").unwrap_or("N/A")
        ));
        lines.push(format!(
            "Is active: {}",
            ex.text("biometric_data.is_active").unwrap_or("N/A")
        ));
        if let Some(tx) = ex.text("biometric_data.blockchain_tx_hash") {
            lines.push(format!("Blockchain TX: {}", tx));
        }
    }
    Report::ok(lines)
}
