use regex::Regex;
use std::sync::LazyLock;

static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern is valid"));

/// Expand `${VAR_NAME}` references using `lookup`; unknown variables are left as written.
pub fn expand_env_var_in_string(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_REFERENCE
        .replace_all(value, |cap: &regex::Captures| {
            lookup(&cap[1]).unwrap_or_else(|| cap[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOST" => Some("localhost:11434".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expands_known_variable() {
        assert_eq!(
            expand_env_var_in_string("http://${HOST}/v1", lookup),
            "http://localhost:11434/v1"
        );
    }

    #[test]
    fn test_keeps_unknown_variable() {
        assert_eq!(
            expand_env_var_in_string("http://${MISSING}/v1", lookup),
            "http://${MISSING}/v1"
        );
    }

    #[test]
    fn test_plain_string_untouched() {
        assert_eq!(expand_env_var_in_string("https://openrouter.ai", lookup), "https://openrouter.ai");
    }
}
