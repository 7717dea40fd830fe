//! Service layer for the storeroom box store.
//! - `storage`: deep-merge engine and JSON file persistence.
//! - `store`: the `BoxStore` trait the HTTP layer talks to.
//! - `auth`: nonce registry and `OTP` challenge/response verification.

pub mod errors;
pub mod auth;
pub mod runtime;
pub mod storage;
pub mod store;
