/// Get environment variable with HARDHAT_ prefix, falling back to unprefixed version
///
/// Checks `HARDHAT_{key}` first, then `{key}`.
///
/// # Examples
///
/// ```rust
/// use hardhat::utils::get_env_with_prefix;
///
/// // Checks HARDHAT_LOG_JSON first, then LOG_JSON
/// let json_logs = get_env_with_prefix("LOG_JSON");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("HARDHAT_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Get environment variable with HARDHAT_ prefix only
///
/// For keys whose bare name is too generic to share with other tools.
pub fn get_prefixed_env(key: &str) -> Option<String> {
    std::env::var(format!("HARDHAT_{}", key)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("HARDHAT_ENV_TEST_VAR", "prefixed_value");
            std::env::set_var("ENV_TEST_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("HARDHAT_ENV_TEST_VAR");
        }

        // Unprefixed fallback
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_TEST_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_MISSING_VAR"), None);
    }

    #[test]
    fn test_get_prefixed_env_ignores_bare_key() {
        unsafe {
            std::env::set_var("ENV_TEST_BARE_ONLY", "unprefixed_value");
        }
        assert_eq!(get_prefixed_env("ENV_TEST_BARE_ONLY"), None);

        unsafe {
            std::env::set_var("HARDHAT_ENV_TEST_BARE_ONLY", "prefixed_value");
        }
        assert_eq!(get_prefixed_env("ENV_TEST_BARE_ONLY"), Some("prefixed_value".to_string()));

        unsafe {
            std::env::remove_var("HARDHAT_ENV_TEST_BARE_ONLY");
            std::env::remove_var("ENV_TEST_BARE_ONLY");
        }
    }
}
