// Authentication and request signing stages

pub mod auth_middleware;
pub mod signature;
