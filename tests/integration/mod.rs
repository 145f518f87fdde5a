// Integration tests organized by concern

#[path = "../common/mod.rs"]
mod common;

pub mod fixtures;
pub mod test_auth_middleware;
