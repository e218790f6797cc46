use apicheck_harness::HarnessResult;
use futures::FutureExt;

use super::{GET_REQUESTS, PUT_REQUESTS};
use crate::context::TestContext;
use crate::schema::SchemaName;
use crate::suite::TestCase;

const GET_ALL_BRANDS: &str = "API 3: Get All Brands List";
const PUT_TO_BRANDS: &str = "API 4: PUT To All Brands List";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(GET_ALL_BRANDS, |ctx| get_all_brands(ctx).boxed()),
        TestCase::new(PUT_TO_BRANDS, |ctx| put_to_brands(ctx).boxed()),
    ]
}

async fn get_all_brands(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(GET_REQUESTS, GET_ALL_BRANDS)?;
    let response = ctx.brands().get_all_brands().await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::BrandsList)
}

/// PUT is not supported on the brand list.
async fn put_to_brands(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(PUT_REQUESTS, PUT_TO_BRANDS)?;
    let response = ctx.brands().put_to_list(&row.payload()?).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}
