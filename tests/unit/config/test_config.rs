// Unit tests for configuration management
// NOTE: These tests must run sequentially to avoid environment variable conflicts

use sentinel_web::config::Config;
use sentinel_web::core::errors::GatewayError;
use std::env;
use std::sync::Mutex;

// Global mutex to serialize environment variable access in tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const KEY: &str = "1234567890123456";

fn clear_env_vars() {
    for key in [
        "BIND_ADDRESS",
        "PORT",
        "TOKEN_KEY",
        "AUTH_ENABLE",
        "SIGN_ENABLE",
        "ENC_ENABLE",
        "LOGIN_PREFIX",
        "EXEMPT_PREFIXES",
        "TRANSLATE_ERRORS",
        "BODY_SIZE_LIMIT_BYTES",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ] {
        env::remove_var(key);
    }
}

fn assert_config_error(result: Result<Config, GatewayError>) {
    match result {
        Err(GatewayError::Configuration(_)) => {}
        other => panic!("Expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_config_default_values() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", KEY);

    let config = Config::from_env().unwrap();

    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.port, 8000);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.log_format, "json");
    assert!(config.gateway.auth_enable);
    assert!(config.gateway.sign_enable);
    assert!(config.gateway.enc_enable);
    assert!(config.gateway.translate_errors);
    assert_eq!(config.gateway.login_prefix, "/login");
    assert!(config.gateway.exempt_prefixes.is_empty());

    clear_env_vars();
}

#[test]
fn test_config_missing_token_key() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    assert_config_error(Config::from_env());
}

#[test]
fn test_config_token_key_length() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", "short");

    assert_config_error(Config::from_env());

    env::set_var("TOKEN_KEY", "123456789012345678901234");
    assert!(Config::from_env().is_ok());

    clear_env_vars();
}

#[test]
fn test_config_invalid_port() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", KEY);

    for port in ["not_a_number", "0", "70000"] {
        env::set_var("PORT", port);
        assert_config_error(Config::from_env());
    }

    clear_env_vars();
}

#[test]
fn test_config_exempt_prefixes() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", KEY);
    env::set_var("EXEMPT_PREFIXES", "/public, /health,,");

    let config = Config::from_env().unwrap();
    assert_eq!(config.gateway.exempt_prefixes, vec!["/public", "/health"]);
    assert!(config.gateway().is_exempt("/health/live"));

    env::set_var("EXEMPT_PREFIXES", "public");
    assert_config_error(Config::from_env());

    clear_env_vars();
}

#[test]
fn test_config_sign_requires_auth() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", KEY);
    env::set_var("AUTH_ENABLE", "false");

    assert_config_error(Config::from_env());

    env::set_var("SIGN_ENABLE", "false");
    let config = Config::from_env().unwrap();
    assert!(!config.gateway.auth_enable);
    assert!(!config.gateway.sign_enable);

    clear_env_vars();
}

#[test]
fn test_config_invalid_flags_and_logging() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env_vars();
    env::set_var("TOKEN_KEY", KEY);

    env::set_var("ENC_ENABLE", "maybe");
    assert_config_error(Config::from_env());
    env::remove_var("ENC_ENABLE");

    env::set_var("LOG_LEVEL", "verbose");
    assert_config_error(Config::from_env());
    env::remove_var("LOG_LEVEL");

    env::set_var("LOG_FORMAT", "xml");
    assert_config_error(Config::from_env());

    clear_env_vars();
}

#[test]
fn test_config_debug_redacts_token_key() {
    let config = Config::test_config();
    let debug = format!("{:?}", config);
    assert!(debug.contains("<REDACTED>"));
    assert!(!debug.contains(&config.token_key));
}
