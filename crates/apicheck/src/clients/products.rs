use apicheck_harness::{ApiResponse, ContentMode, HarnessResult, Payload, RequestExecutor};
use serde_json::Value;

use crate::endpoints;

/// Product catalog operations.
pub struct ProductsClient<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> ProductsClient<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Lists every product.
    pub async fn get_all_products(&self) -> HarnessResult<ApiResponse> {
        self.executor
            .get(endpoints::PRODUCTS_LIST, &Payload::new())
            .await
    }

    /// Searches products by name. `None` omits the `search_product` field.
    pub async fn search_products(&self, term: Option<&str>) -> HarnessResult<ApiResponse> {
        let mut payload = Payload::new();
        if let Some(term) = term {
            payload.insert("search_product".to_string(), Value::from(term));
        }
        self.executor
            .post(endpoints::SEARCH_PRODUCT, &payload, ContentMode::Form)
            .await
    }

    /// POSTs to the product list, which only supports GET.
    pub async fn post_to_list(&self, payload: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .post(endpoints::PRODUCTS_LIST, payload, ContentMode::Form)
            .await
    }
}
