use apicheck_harness::{ApiResponse, ContentMode, HarnessResult, Payload, RequestExecutor};
use serde_json::Value;

use crate::endpoints;

/// Account and authentication operations. All bodies are form encoded.
pub struct UserClient<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> UserClient<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// Registers an account from a full account payload.
    pub async fn create_account(&self, account: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .post(endpoints::CREATE_ACCOUNT, account, ContentMode::Form)
            .await
    }

    /// Verifies a login with both credentials present.
    pub async fn login(&self, email: &str, password: &str) -> HarnessResult<ApiResponse> {
        self.login_with(&credentials(email, password)).await
    }

    /// Verifies a login with an arbitrary payload, which may omit fields.
    pub async fn login_with(&self, payload: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .post(endpoints::VERIFY_LOGIN, payload, ContentMode::Form)
            .await
    }

    /// Deletes an account.
    pub async fn delete_account(&self, email: &str, password: &str) -> HarnessResult<ApiResponse> {
        self.executor
            .delete(
                endpoints::DELETE_ACCOUNT,
                &credentials(email, password),
                ContentMode::Form,
            )
            .await
    }

    /// Sends DELETE to the login check, which only supports POST.
    pub async fn delete_verify_login(&self, payload: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .delete(endpoints::VERIFY_LOGIN, payload, ContentMode::Form)
            .await
    }

    /// Fetches account details.
    pub async fn get_user_by_email(&self, email: &str) -> HarnessResult<ApiResponse> {
        let mut params = Payload::new();
        params.insert("email".to_string(), Value::from(email));
        self.executor
            .get(endpoints::GET_USER_DETAIL, &params)
            .await
    }

    /// Updates an account identified by the payload's email and password.
    pub async fn update_account(&self, account: &Payload) -> HarnessResult<ApiResponse> {
        self.executor
            .put(endpoints::UPDATE_ACCOUNT, account, ContentMode::Form)
            .await
    }
}

fn credentials(email: &str, password: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert("email".to_string(), Value::from(email));
    payload.insert("password".to_string(), Value::from(password));
    payload
}
