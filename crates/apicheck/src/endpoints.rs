//! Endpoint paths, relative to the configured base URL.

pub const PRODUCTS_LIST: &str = "/productsList";
pub const SEARCH_PRODUCT: &str = "/searchProduct";
pub const BRANDS_LIST: &str = "/brandsList";
pub const VERIFY_LOGIN: &str = "/verifyLogin";
pub const CREATE_ACCOUNT: &str = "/createAccount";
pub const DELETE_ACCOUNT: &str = "/deleteAccount";
pub const GET_USER_DETAIL: &str = "/getUserDetailByEmail";
pub const UPDATE_ACCOUNT: &str = "/updateAccount";
