use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, format!("must be a positive number, got {value}")))
        }
    };

    let geoapify_key = require("GEOAPIFY_KEY")?;
    let env = parse_environment(&or_default("IDMAP_ENV", "development"))?;

    let bind_addr = parse_addr("IDMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("IDMAP_LOG_LEVEL", "info");
    let reviews_path = PathBuf::from(or_default("IDMAP_REVIEWS_PATH", "./reviews.json"));
    let geocode_base_url = or_default(
        "IDMAP_GEOCODE_BASE_URL",
        "https://api.geoapify.com/v1/geocode/search",
    );
    let places_base_url = or_default("IDMAP_PLACES_BASE_URL", "https://api.geoapify.com/v2/places");

    let request_timeout_secs = parse_u64("IDMAP_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "IDMAP_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let result_limit = parse_u32("IDMAP_RESULT_LIMIT", "100")?;
    let default_radius_km = parse_positive_f64("IDMAP_DEFAULT_RADIUS_KM", "100")?;
    let user_agent = or_default("IDMAP_USER_AGENT", "idmap/0.1 (accessibility-mapper)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        reviews_path,
        geoapify_key,
        geocode_base_url,
        places_base_url,
        request_timeout_secs,
        result_limit,
        default_radius_km,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "IDMAP_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
