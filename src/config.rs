// src/config.rs
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where the system prompt material lives and who the assistant is.
#[derive(Debug, Clone)]
pub struct PromptSources {
    pub context_path: PathBuf,
    pub persona_path: PathBuf,
    pub persona_name: String,
    pub review_domain: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

// Keep the key out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider: ProviderConfig,
    pub prompt: PromptSources,
    pub rate_limit: RateLimitConfig,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, applying defaults for
    /// everything except the provider API key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let provider = ProviderConfig {
            api_key,
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            max_tokens: parse_or(&get, "OPENAI_MAX_TOKENS", 1500)?,
            temperature: parse_or(&get, "OPENAI_TEMPERATURE", 0.7)?,
            timeout: Duration::from_secs(parse_nonzero(&get, "PROVIDER_TIMEOUT_SECS", 60)?),
        };

        let prompt = PromptSources {
            context_path: get("CONTEXT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config/context.md")),
            persona_path: get("PERSONA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config/fee-persona.md")),
            persona_name: get("PERSONA_NAME").unwrap_or_else(|| "Fee".to_string()),
            review_domain: get("REVIEW_DOMAIN").unwrap_or_else(|| "SESMag".to_string()),
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_nonzero(&get, "RATE_LIMIT_MAX", 100)?,
            window: Duration::from_secs(parse_nonzero(&get, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?),
        };

        Ok(Self {
            port: parse_or(&get, "PORT", 5001)?,
            provider,
            prompt,
            rate_limit,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_nonzero(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

// Windows, timeouts and caps of zero would disable the thing they bound.
fn parse_nonzero<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, name, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: get(name).unwrap_or_default(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPENAI_API_KEY")));

        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPENAI_API_KEY")));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, 1500);
        assert!((config.provider.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.prompt.persona_name, "Fee");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn overrides_and_invalid_values() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.provider.base_url, "http://localhost:9000/v1");

        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test"), ("PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        for name in [
            "RATE_LIMIT_WINDOW_SECS",
            "RATE_LIMIT_MAX",
            "PROVIDER_TIMEOUT_SECS",
            "MAX_UPLOAD_BYTES",
        ] {
            let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test"), (name, "0")]))
                .unwrap_err();
            match err {
                ConfigError::Invalid { name: rejected, value } => {
                    assert_eq!(rejected, name);
                    assert_eq!(value, "0");
                }
                other => panic!("{} = 0 gave {:?}", name, other),
            }
        }
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-very-secret")])).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
