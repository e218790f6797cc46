use apicheck_harness::HarnessResult;
use futures::FutureExt;

use super::{GET_REQUESTS, POST_REQUESTS, payload_str};
use crate::context::TestContext;
use crate::schema::SchemaName;
use crate::suite::TestCase;

const GET_ALL_PRODUCTS: &str = "API 1: Get All Products List";
const POST_TO_PRODUCTS: &str = "API 2: POST To All Products List";
const SEARCH_PRODUCT: &str = "API 5: POST To Search Product";
const SEARCH_WITHOUT_PARAMETER: &str =
    "API 6: POST To Search Product without search_product parameter";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(GET_ALL_PRODUCTS, |ctx| get_all_products(ctx).boxed()),
        TestCase::new(POST_TO_PRODUCTS, |ctx| post_to_products(ctx).boxed()),
        TestCase::new(SEARCH_PRODUCT, |ctx| search_product(ctx).boxed()),
        TestCase::new(SEARCH_WITHOUT_PARAMETER, |ctx| {
            search_without_parameter(ctx).boxed()
        }),
    ]
}

async fn get_all_products(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(GET_REQUESTS, GET_ALL_PRODUCTS)?;
    let response = ctx.products().get_all_products().await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::ProductsList)
}

/// POST is not supported on the product list; the API answers with a
/// business-level 405.
async fn post_to_products(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, POST_TO_PRODUCTS)?;
    let response = ctx.products().post_to_list(&row.payload()?).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::GeneralSuccess)
}

async fn search_product(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, SEARCH_PRODUCT)?;
    let payload = row.payload()?;
    let term = payload_str(&payload, "search_product")
        .or_else(|| row.get("search_product"))
        .unwrap_or_default();

    let response = ctx.products().search_products(Some(term)).await?;
    ctx.check_response(&response, row)?;
    ctx.validate_schema(&response, SchemaName::SearchProduct)
}

async fn search_without_parameter(ctx: TestContext) -> HarnessResult<()> {
    let row = ctx.fixture(POST_REQUESTS, SEARCH_WITHOUT_PARAMETER)?;
    let payload = row.payload()?;
    let response = ctx
        .products()
        .search_products(payload_str(&payload, "search_product"))
        .await?;
    ctx.check_response(&response, row)
}
