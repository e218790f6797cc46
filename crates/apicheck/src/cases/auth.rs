use apicheck_harness::{HarnessResult, LogLevel};
use futures::FutureExt;
use serde_json::Value;

use super::{
    CREATE_ACCOUNT_CASE, DELETE_ACCOUNT_CASE, DELETE_REQUESTS, POST_REQUESTS, account_payload,
    create_account, delete_account, password_of, unique_email,
};
use crate::context::TestContext;
use crate::schema::SchemaName;
use crate::suite::TestCase;

const LOGIN_VALID: &str = "API 7: POST To Verify Login with valid details";
const LOGIN_WITHOUT_EMAIL: &str = "API 8: POST To Verify Login without email parameter";
const DELETE_VERIFY_LOGIN: &str = "API 9: DELETE To Verify Login";
const LOGIN_INVALID: &str = "API 10: POST To Verify Login with invalid details";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(LOGIN_VALID, |ctx| login_valid(ctx).boxed()),
        TestCase::new(LOGIN_WITHOUT_EMAIL, |ctx| login_without_email(ctx).boxed()),
        TestCase::new(DELETE_VERIFY_LOGIN, |ctx| delete_verify_login(ctx).boxed()),
        TestCase::new(LOGIN_INVALID, |ctx| login_invalid(ctx).boxed()),
        TestCase::new(CREATE_ACCOUNT_CASE, |ctx| create_and_delete(ctx).boxed()),
        TestCase::new(DELETE_ACCOUNT_CASE, |ctx| delete_created(ctx).boxed()),
    ]
}

/// Create an account, log in with it, delete it.
async fn login_valid(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, LOGIN_VALID)?;
    let create = ctx.fixture(POST_REQUESTS, CREATE_ACCOUNT_CASE)?;
    let delete = ctx.fixture(DELETE_REQUESTS, DELETE_ACCOUNT_CASE)?;

    let email = unique_email();
    let account = account_payload(create, &email)?;
    create_account(&ctx, create, &account).await?;

    let password = row.get("password").unwrap_or(password_of(&account));
    let login = async {
        let response = ctx.users().login(&email, password).await?;
        ctx.check_response(&response, row)?;
        ctx.validate_schema(&response, SchemaName::GeneralSuccess)
    }
    .await;

    let cleanup = delete_account(&ctx, delete, &email, password_of(&account)).await;
    login.and(cleanup)
}

async fn login_without_email(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, LOGIN_WITHOUT_EMAIL)?;
    let mut payload = row.payload()?;
    payload.remove("email");

    let response = ctx.users().login_with(&payload).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

/// DELETE is not supported on the login check.
async fn delete_verify_login(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(DELETE_REQUESTS, DELETE_VERIFY_LOGIN)?;
    let response = ctx.users().delete_verify_login(&row.payload()?).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

async fn login_invalid(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, LOGIN_INVALID)?;
    let response = ctx.users().login_with(&row.payload()?).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

/// Register an account, then delete it again.
async fn create_and_delete(ctx: TestContext) -> HarnessResult<()> {
    let create = ctx.fixture(POST_REQUESTS, CREATE_ACCOUNT_CASE)?;
    let delete = ctx.fixture(DELETE_REQUESTS, DELETE_ACCOUNT_CASE)?;

    let email = unique_email();
    let mut account = account_payload(create, &email)?;
    if let Some(password) = create.get("password") {
        account.insert("password".to_string(), Value::from(password));
    }

    create_account(&ctx, create, &account).await?;
    delete_account(&ctx, delete, &email, password_of(&account)).await?;
    ctx.log(LogLevel::Info, "Data cleanup complete");
    Ok(())
}

/// The account must exist before it can be deleted, so create one first.
async fn delete_created(ctx: TestContext) -> HarnessResult<()> {
    let create = ctx.fixture(POST_REQUESTS, CREATE_ACCOUNT_CASE)?;
    let row = ctx.fixture(DELETE_REQUESTS, DELETE_ACCOUNT_CASE)?;

    let email = unique_email();
    let account = account_payload(create, &email)?;
    create_account(&ctx, create, &account).await?;

    let password = row.get("password").unwrap_or(password_of(&account));
    delete_account(&ctx, row, &email, password).await
}
