use apicheck_harness::{HarnessResult, LogLevel};
use futures::FutureExt;
use serde_json::Value;

use super::{
    CREATE_ACCOUNT_CASE, DELETE_ACCOUNT_CASE, DELETE_REQUESTS, GET_REQUESTS, POST_REQUESTS,
    PUT_REQUESTS, account_payload, create_account, delete_account, password_of, unique_email,
};
use crate::context::TestContext;
use crate::data::Row;
use crate::schema::SchemaName;
use crate::suite::TestCase;

const UPDATE_ACCOUNT: &str = "API 13: PUT METHOD To Update User Account";
const USER_DETAIL: &str = "API 14: GET user account detail by email";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(UPDATE_ACCOUNT, |ctx| update_account(ctx).boxed()),
        TestCase::new(USER_DETAIL, |ctx| user_detail(ctx).boxed()),
    ]
}

/// Create, update, delete.
async fn update_account(ctx: TestContext) -> HarnessResult<()> {
    let create = ctx.fixture(POST_REQUESTS, CREATE_ACCOUNT_CASE)?;
    let row = ctx.fixture(PUT_REQUESTS, UPDATE_ACCOUNT)?;
    let delete = ctx.fixture(DELETE_REQUESTS, DELETE_ACCOUNT_CASE)?;

    let email = unique_email();
    let account = account_payload(create, &email)?;
    create_account(&ctx, create, &account).await?;

    let mut update = row.payload()?;
    update.insert("email".to_string(), Value::from(email.as_str()));
    if !update.contains_key("password") {
        update.insert("password".to_string(), Value::from(password_of(&account)));
    }

    let updated = async {
        let response = ctx.users().update_account(&update).await?;
        ctx.check_response(&response, row)?;
        ctx.validate_schema(&response, SchemaName::GeneralSuccess)
    }
    .await;

    // The update may have changed the password.
    let password = match &updated {
        Ok(()) => password_of(&update),
        Err(_) => password_of(&account),
    };
    let cleanup = delete_account(&ctx, delete, &email, password).await;
    updated.and(cleanup)
}

/// Reads the account named by the fixture's `email` column, or a throwaway
/// account created for the purpose when the column is empty.
async fn user_detail(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(GET_REQUESTS, USER_DETAIL)?;
    if let Some(email) = row.get("email") {
        return fetch_details(&ctx, row, email).await;
    }

    let create = ctx.fixture(POST_REQUESTS, CREATE_ACCOUNT_CASE)?;
    let delete = ctx.fixture(DELETE_REQUESTS, DELETE_ACCOUNT_CASE)?;
    let email = unique_email();
    let account = account_payload(create, &email)?;
    create_account(&ctx, create, &account).await?;

    let fetched = fetch_details(&ctx, row, &email).await;
    let cleanup = delete_account(&ctx, delete, &email, password_of(&account)).await;
    fetched.and(cleanup)
}

async fn fetch_details(ctx: &TestContext, row: &Row, email: &str) -> HarnessResult<()> {
    ctx.log(LogLevel::Info, &format!("Fetching details for {}", email));
    let response = ctx.users().get_user_by_email(email).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::UserDetail)
}
