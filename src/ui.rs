// UI layer: prints the numbered menu, collects input with `dialoguer` and
// hands it to the handlers in `ops`. Everything here is synchronous: one
// prompt, one request, one report, then back to the menu.

use crate::api::ApiClient;
use crate::ops::{self, LoginInput, RecordInput, RegisterInput, Report, RoleInput, Status};
use crate::session::Session;
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

const RULE: &str = "==================================================";

const MENU: &[(u32, &str)] = &[
    (1, "Register new user"),
    (2, "Login"),
    (3, "View user profile"),
    (4, "Update user profile"),
    (5, "Connect wallet"),
    (6, "Register biometric data"),
    (7, "Get biometric status"),
    (8, "Register identity on blockchain"),
    (9, "Get identity status from blockchain"),
    (10, "Create professional record"),
    (11, "Get professional records from database"),
    (12, "Add professional record to blockchain"),
    (13, "Get professional records from blockchain"),
    (14, "Admin: Grant role to user"),
    (15, "Admin: Revoke role from user"),
    (16, "Logout"),
    (0, "Exit"),
];

/// Run the menu until the user picks `0`.
pub fn main_menu(api: &ApiClient, session: &mut Session) -> Result<()> {
    loop {
        print_menu(session);
        let raw: String = Input::new()
            .with_prompt("Enter your choice")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read menu choice")?;
        let choice = parse_choice(&raw);
        debug!(?choice, "menu selection");

        match choice {
            Some(0) => {
                println!("Exiting DBIS API Client. Goodbye!");
                break;
            }
            Some(n) => dispatch(n, api, session)?,
            None => println!("Invalid choice. Please try again."),
        }
        pause()?;
    }
    Ok(())
}

fn print_menu(session: &Session) {
    println!();
    println!("{}", RULE);
    println!("{:^50}", "DBIS API Client - Main Menu");
    println!("{}", RULE);
    for (n, label) in MENU {
        println!("{}. {}", n, label);
    }
    println!("{}", RULE);
    match session.user_id() {
        Some(id) => println!("{}", format!("Logged in as {}", id).dim()),
        None => println!("{}", "Not logged in".dim()),
    }
}

/// Any integer is a menu choice; numbers without an entry are reported by
/// `run_choice` rather than rejected here.
fn parse_choice(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn dispatch(choice: i64, api: &ApiClient, session: &mut Session) -> Result<()> {
    let report = run_choice(choice, api, session)?;
    print_report(&report);
    Ok(())
}

fn run_choice(choice: i64, api: &ApiClient, session: &mut Session) -> Result<Report> {
    Ok(match choice {
        1 => {
            let input = collect_register()?;
            with_spinner("Registering...", || ops::register(api, session, &input))
        }
        2 => {
            let input = collect_login()?;
            with_spinner("Logging in...", || ops::login(api, session, &input))
        }
        3 => with_spinner("Loading profile...", || ops::view_profile(api, session)),
        4 => {
            let name = ops::optional(&prompt_optional("Enter new name (leave blank to keep current)")?);
            with_spinner("Updating profile...", || ops::update_profile(api, session, name.as_deref()))
        }
        5 => {
            let wallet = prompt("Enter wallet address")?;
            with_spinner("Connecting wallet...", || ops::connect_wallet(api, session, &wallet))
        }
        6 => with_spinner("Registering biometric data...", || ops::register_biometric(api, session)),
        7 => with_spinner("Loading biometric status...", || ops::biometric_status(api, session)),
        8 => with_spinner("Registering identity...", || ops::register_identity(api, session)),
        9 => with_spinner("Loading identity status...", || ops::identity_status(api, session)),
        10 => {
            let input = collect_record()?;
            with_spinner("Creating record...", || ops::create_record(api, session, &input))
        }
        11 => with_spinner("Loading records...", || ops::list_records(api, session)),
        12 => add_record_to_chain(api, session)?,
        13 => with_spinner("Loading blockchain records...", || ops::list_chain_records(api, session)),
        14 => {
            println!("\nGrant Role to User (Admin only)");
            let input = collect_role("Select role to grant")?;
            with_spinner("Granting role...", || ops::grant_role(api, session, &input))
        }
        15 => {
            println!("\nRevoke Role from User (Admin only)");
            let input = collect_role("Select role to revoke")?;
            with_spinner("Revoking role...", || ops::revoke_role(api, session, &input))
        }
        16 => ops::logout(session),
        n => Report::invalid(format!("Option {} is not implemented in this client.", n)),
    })
}

fn add_record_to_chain(api: &ApiClient, session: &Session) -> Result<Report> {
    let records = match with_spinner("Loading records...", || ops::fetch_records(api, session)) {
        Ok(records) => records,
        Err(report) => return Ok(report),
    };
    if records.is_empty() {
        return Ok(Report::ok(["No professional records found. Create one first."]));
    }
    println!("\nSelect a record to add to blockchain:");
    for (i, record) in records.iter().enumerate() {
        println!("{}. {}", i + 1, record.summary());
    }
    let raw = prompt("Enter record number")?;
    let selection = match raw.trim().parse::<usize>() {
        Ok(n) => n,
        Err(_) => return Ok(Report::invalid("Please enter a valid number.")),
    };
    Ok(with_spinner("Adding record to blockchain...", || {
        ops::add_record_to_chain(api, session, &records, selection)
    }))
}

fn collect_register() -> Result<RegisterInput> {
    let username: String = Input::new()
        .with_prompt(format!("Enter username (min {} characters)", ops::MIN_USERNAME_LEN))
        .validate_with(|s: &String| ops::validate_username(s))
        .interact_text()?;
    let email = prompt("Enter your email")?;
    let password = prompt_password(&format!(
        "Enter your password (min {} characters)",
        ops::MIN_PASSWORD_LEN
    ))?;
    let full_name = prompt("Enter your full name")?;
    let date_of_birth = ops::optional(&prompt_optional("Enter your date of birth (YYYY-MM-DD) or leave blank")?);
    let phone_number = ops::optional(&prompt_optional("Enter your phone number or leave blank")?);
    Ok(RegisterInput {
        username,
        email,
        password,
        full_name,
        date_of_birth,
        phone_number,
    })
}

fn collect_login() -> Result<LoginInput> {
    let email = prompt("Enter your email")?;
    let password: String = Password::new().with_prompt("Enter your password").interact()?;
    Ok(LoginInput { email, password })
}

fn collect_record() -> Result<RecordInput> {
    Ok(RecordInput {
        title: prompt("Enter job title")?,
        organization: prompt("Enter organization")?,
        description: prompt("Enter description")?,
        start_date: prompt("Enter start date (YYYY-MM-DD)")?,
        end_date: ops::optional(&prompt_optional("Enter end date (YYYY-MM-DD, leave blank if current)")?),
    })
}

fn collect_role(role_prompt: &str) -> Result<RoleInput> {
    let user_address = prompt("Enter user's wallet address")?;
    let idx = Select::new()
        .with_prompt(role_prompt)
        .items(ops::KNOWN_ROLES)
        .default(0)
        .interact()?;
    Ok(RoleInput {
        user_address,
        role: ops::KNOWN_ROLES[idx].to_string(),
    })
}

fn prompt(text: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(text).interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_optional(text: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(text).allow_empty(true).interact_text()?;
    Ok(value)
}

/// Masked password prompt that re-asks until the minimum length is met.
fn prompt_password(text: &str) -> Result<String> {
    loop {
        let password: String = Password::new().with_prompt(text).interact()?;
        match ops::validate_password(&password) {
            Ok(()) => return Ok(password),
            Err(msg) => println!("{}", msg.red()),
        }
    }
}

/// Show a spinner while `f` blocks on the network.
fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = f();
    spinner.finish_and_clear();
    out
}

fn print_report(report: &Report) {
    for line in &report.lines {
        match report.status {
            Status::Ok => println!("{}", line),
            Status::Degraded => println!("{}", line.as_str().yellow()),
            Status::Failed => println!("{}", line.as_str().red()),
        }
    }
}

fn pause() -> Result<()> {
    println!();
    let _: String = Input::new()
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read from terminal")?;
    Ok(())
}
