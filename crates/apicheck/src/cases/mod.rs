//! The API scenarios.
//!
//! Each case reads its expectations from the fixture workbook, drives one or
//! more client calls and checks every response. Cases that create an account
//! use a fresh email address and delete the account again, even when a later
//! step fails.

mod auth;
mod brands;
mod products;
mod users;

use std::sync::atomic::{AtomicU64, Ordering};

use apicheck_harness::{HarnessResult, LogLevel, Payload};
use serde_json::Value;

use crate::context::TestContext;
use crate::data::Row;
use crate::schema::SchemaName;
use crate::suite::TestCase;

pub const GET_REQUESTS: &str = "GetRequests";
pub const POST_REQUESTS: &str = "PostRequests";
pub const PUT_REQUESTS: &str = "PutRequests";
pub const DELETE_REQUESTS: &str = "DeleteRequests";

pub const CREATE_ACCOUNT_CASE: &str = "API 11: POST To Create/Register User Account";
pub const DELETE_ACCOUNT_CASE: &str = "API 12: DELETE METHOD To Delete User Account";

/// Every case, in catalog order.
pub fn all() -> Vec<TestCase> {
    let mut cases = Vec::new();
    cases.extend(products::cases());
    cases.extend(brands::cases());
    cases.extend(auth::cases());
    cases.extend(users::cases());
    cases.sort_by_key(|case| catalog_number(case.title));
    cases
}

/// Cases whose title contains `filter` (case-insensitive); all when `None`.
pub fn select(cases: Vec<TestCase>, filter: Option<&str>) -> Vec<TestCase> {
    match filter.map(str::to_lowercase) {
        Some(pattern) => cases
            .into_iter()
            .filter(|case| case.title.to_lowercase().contains(&pattern))
            .collect(),
        None => cases,
    }
}

/// `API 12: ...` sorts as 12; untagged titles sort last.
fn catalog_number(title: &str) -> u32 {
    title
        .strip_prefix("API ")
        .and_then(|rest| rest.split(':').next())
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(u32::MAX)
}

static EMAIL_SEQ: AtomicU64 = AtomicU64::new(0);

/// A never-before-used address: `testuser_<millis>_<seq>@gmail.com`.
pub fn unique_email() -> String {
    let seq = EMAIL_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    format!(
        "testuser_{}_{}@gmail.com",
        chrono::Utc::now().timestamp_millis(),
        seq
    )
}

/// The account payload from the create-account fixture, with `email` replaced.
fn account_payload(create: &Row, email: &str) -> HarnessResult<Payload> {
    let mut payload = create.payload()?;
    payload.insert("email".to_string(), Value::from(email));
    Ok(payload)
}

fn payload_str<'a>(payload: &'a Payload, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

/// Registers a throwaway account and checks the registration response.
async fn create_account(ctx: &TestContext, create: &Row, account: &Payload) -> HarnessResult<()> {
    ctx.log(
        LogLevel::Info,
        &format!(
            "Creating account {}",
            payload_str(account, "email").unwrap_or_default()
        ),
    );
    let response = ctx.users().create_account(account).await?;
    ctx.check_response(&response, create)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

/// Deletes an account and checks the deletion response against `delete`.
async fn delete_account(
    ctx: &TestContext,
    delete: &Row,
    email: &str,
    password: &str,
) -> HarnessResult<()> {
    let response = ctx.users().delete_account(email, password).await?;
    ctx.check_response(&response, delete)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

/// The `password` of an account payload.
fn password_of(account: &Payload) -> &str {
    payload_str(account, "password").unwrap_or_default()
}
