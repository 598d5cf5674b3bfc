//! Configuration resolution.

use telebirr_receipt::DEFAULT_BASE_URL;

/// Environment variable overriding the receipt base URL.
pub const BASE_URL_ENV: &str = "TELEBIRR_RECEIPT_BASE_URL";

/// Environment variable enabling certificate skipping (`1` or `true`).
pub const INSECURE_ENV: &str = "TELEBIRR_RECEIPT_INSECURE";

/// Resolve the receipt base URL: explicit flag, then env var, then default.
pub fn resolve_base_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
        if !env_url.trim().is_empty() {
            return env_url;
        }
    }

    DEFAULT_BASE_URL.to_string()
}

/// Whether certificate validation should be skipped for this run.
pub fn resolve_insecure(flag: bool) -> bool {
    flag || std::env::var(INSECURE_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
