// Library root for Sentinel Web

pub mod api;
pub mod auth;
pub mod bind;
pub mod config;
pub mod core;
