// Core domain: principal model, token codec, crypto primitives, errors

pub mod constants;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod token;
