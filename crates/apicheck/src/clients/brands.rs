use apicheck_harness::{ApiResponse, ContentMode, HarnessResult, Payload, RequestExecutor};

use crate::endpoints;

/// Brand catalog operations.
pub struct BrandsClient<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> BrandsClient<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Lists every brand.
    pub async fn get_all_brands(&self) -> HarnessResult<ApiResponse> {
        self.executor
            .get(endpoints::BRANDS_LIST, &Payload::new())
            .await
    }

    /// PUTs to the brand list, which only supports GET.
    pub async fn put_to_list(&self, payload: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .put(endpoints::BRANDS_LIST, payload, ContentMode::Json)
            .await
    }
}
