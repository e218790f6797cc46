//! A stateful local emulation of the automationexercise.com API.
//!
//! Like the real service, every answer is HTTP 200 with the outcome carried
//! in the body's `responseCode` and `message`. Accounts live in memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Form, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

type Fields = HashMap<String, String>;

/// Behaviour switches for failure scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
    /// Omit the `products` array from the product list.
    pub drop_products: bool,
}

#[derive(Default)]
struct MockState {
    options: MockOptions,
    accounts: Mutex<HashMap<String, Fields>>,
    next_id: AtomicUsize,
    requests: AtomicUsize,
}

/// A running mock API.
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let state = Arc::new(MockState {
            options,
            ..MockState::default()
        });

        let app = Router::new()
            .route(
                "/api/productsList",
                get(products_list).fallback(method_not_supported),
            )
            .route(
                "/api/brandsList",
                get(brands_list).fallback(method_not_supported),
            )
            .route(
                "/api/searchProduct",
                post(search_product).fallback(method_not_supported),
            )
            .route(
                "/api/verifyLogin",
                post(verify_login).fallback(method_not_supported),
            )
            .route(
                "/api/createAccount",
                post(create_account).fallback(method_not_supported),
            )
            .route(
                "/api/deleteAccount",
                delete(delete_account).fallback(method_not_supported),
            )
            .route(
                "/api/updateAccount",
                put(update_account).fallback(method_not_supported),
            )
            .route(
                "/api/getUserDetailByEmail",
                get(user_detail).fallback(method_not_supported),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Emails of the accounts that currently exist.
    pub fn accounts(&self) -> Vec<String> {
        let mut emails: Vec<String> = self.state.accounts.lock().keys().cloned().collect();
        emails.sort();
        emails
    }

    /// Stored fields of one account.
    pub fn account(&self, email: &str) -> Option<Fields> {
        self.state.accounts.lock().get(email).cloned()
    }

    /// Requests served so far.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

fn reply(code: u16, message: &str) -> Json<Value> {
    Json(json!({ "responseCode": code, "message": message }))
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Blue Top", "price": "Rs. 500", "brand": "Polo",
               "category": {"usertype": {"usertype": "Women"}, "category": "Tops"}}),
        json!({"id": 2, "name": "Men Tshirt", "price": "Rs. 400", "brand": "H&M",
               "category": {"usertype": {"usertype": "Men"}, "category": "Tshirts"}}),
        json!({"id": 3, "name": "Soft Stretch Jeans", "price": "Rs. 799", "brand": "Madame",
               "category": {"usertype": {"usertype": "Women"}, "category": "Jeans"}}),
    ]
}

async fn method_not_supported(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    reply(405, "This request method is not supported.")
}

async fn products_list(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.options.drop_products {
        return Json(json!({ "responseCode": 200 }));
    }
    Json(json!({ "responseCode": 200, "products": catalog() }))
}

async fn brands_list(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "responseCode": 200,
        "brands": [{"id": 1, "brand": "Polo"}, {"id": 2, "brand": "H&M"}, {"id": 3, "brand": "Madame"}]
    }))
}

async fn search_product(
    State(state): State<Arc<MockState>>,
    Form(fields): Form<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(term) = fields.get("search_product").map(|t| t.to_lowercase()) else {
        return reply(
            400,
            "Bad request, search_product parameter is missing in POST request.",
        );
    };
    let products: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| {
            let name = p["name"].as_str().unwrap_or_default().to_lowercase();
            let category = p["category"]["category"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase();
            name.contains(&term) || category.contains(&term)
        })
        .collect();
    Json(json!({ "responseCode": 200, "products": products }))
}

fn credentials(fields: &Fields) -> Option<(&str, &str)> {
    Some((fields.get("email")?.as_str(), fields.get("password")?.as_str()))
}

async fn verify_login(
    State(state): State<Arc<MockState>>,
    Form(fields): Form<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some((email, password)) = credentials(&fields) else {
        return reply(
            400,
            "Bad request, email or password parameter is missing in POST request.",
        );
    };
    let accounts = state.accounts.lock();
    match accounts.get(email) {
        Some(account) if account.get("password").map(String::as_str) == Some(password) => {
            reply(200, "User exists!")
        }
        _ => reply(404, "User not found!"),
    }
}

async fn create_account(
    State(state): State<Arc<MockState>>,
    Form(mut fields): Form<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(email) = fields.get("email").cloned() else {
        return reply(400, "Bad request, email parameter is missing in POST request.");
    };
    let mut accounts = state.accounts.lock();
    if accounts.contains_key(&email) {
        return reply(400, "Email already exists!");
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    fields.insert("id".to_string(), id.to_string());
    accounts.insert(email, fields);
    reply(201, "User created!")
}

async fn delete_account(
    State(state): State<Arc<MockState>>,
    Form(fields): Form<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some((email, password)) = credentials(&fields) else {
        return reply(
            400,
            "Bad request, email or password parameter is missing in DELETE request.",
        );
    };
    let mut accounts = state.accounts.lock();
    match accounts.get(email) {
        Some(account) if account.get("password").map(String::as_str) == Some(password) => {
            accounts.remove(email);
            reply(200, "Account deleted!")
        }
        _ => reply(404, "Account not found!"),
    }
}

async fn update_account(
    State(state): State<Arc<MockState>>,
    Form(fields): Form<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some((email, password)) = credentials(&fields) else {
        return reply(
            400,
            "Bad request, email or password parameter is missing in PUT request.",
        );
    };
    let mut accounts = state.accounts.lock();
    match accounts.get_mut(email) {
        Some(account) if account.get("password").map(String::as_str) == Some(password) => {
            for (key, value) in &fields {
                account.insert(key.clone(), value.clone());
            }
            reply(200, "User updated!")
        }
        _ => reply(404, "Account not found!"),
    }
}

async fn user_detail(
    State(state): State<Arc<MockState>>,
    Query(params): Query<Fields>,
) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(email) = params.get("email") else {
        return reply(
            400,
            "Bad request, email parameter is missing in GET request.",
        );
    };
    let accounts = state.accounts.lock();
    let Some(account) = accounts.get(email) else {
        return reply(404, "Account not found with this email, try another email!");
    };
    let field = |name: &str| account.get(name).cloned().unwrap_or_default();
    Json(json!({
        "responseCode": 200,
        "user": {
            "id": field("id").parse::<u64>().unwrap_or_default(),
            "name": field("name"),
            "email": email,
            "title": field("title"),
            "birth_day": field("birth_date"),
            "birth_month": field("birth_month"),
            "birth_year": field("birth_year"),
            "first_name": field("firstname"),
            "last_name": field("lastname"),
            "company": field("company"),
            "address1": field("address1"),
            "address2": field("address2"),
            "country": field("country"),
            "state": field("state"),
            "city": field("city"),
            "zipcode": field("zipcode"),
        }
    }))
}
