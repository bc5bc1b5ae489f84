use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector: VectorConfig,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimensions: usize,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

/// Vector-similarity search service (one collection per domain).
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub festival_collection: String,
    pub attraction_collection: String,
    pub restaurant_collection: String,
    pub top_k: u32,
    pub min_score: f32,
    pub timeout_secs: u64,
}

/// LLM configuration for the streaming chat/completion model
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("MARU_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("MARU_PORT", 8000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:maru.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "BAAI/bge-small-en-v1.5".to_string()),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", 384),
                api_key: env::var("EMBEDDING_API_KEY").ok(),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
            },
            vector: VectorConfig {
                url: env::var("VECTOR_URL").unwrap_or_else(|_| "http://localhost:6333".to_string()),
                api_key: env::var("VECTOR_API_KEY").ok(),
                festival_collection: env::var("VECTOR_FESTIVAL_COLLECTION")
                    .unwrap_or_else(|_| "festivals".to_string()),
                attraction_collection: env::var("VECTOR_ATTRACTION_COLLECTION")
                    .unwrap_or_else(|_| "attractions".to_string()),
                restaurant_collection: env::var("VECTOR_RESTAURANT_COLLECTION")
                    .unwrap_or_else(|_| "restaurants".to_string()),
                top_k: parse_env_or("VECTOR_TOP_K", 5),
                min_score: parse_env_or("VECTOR_MIN_SCORE", 0.3),
                timeout_secs: parse_env_or("VECTOR_TIMEOUT", 10),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "local"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        // Check if prefix is a known provider
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to local provider
    ("local", model)
}

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_vector_config_defaults() {
        std::env::remove_var("VECTOR_URL");
        std::env::remove_var("VECTOR_TOP_K");
        std::env::remove_var("VECTOR_MIN_SCORE");

        let config = Config::default();
        assert_eq!(config.vector.url, "http://localhost:6333");
        assert_eq!(config.vector.festival_collection, "festivals");
        assert_eq!(config.vector.attraction_collection, "attractions");
        assert_eq!(config.vector.restaurant_collection, "restaurants");
        assert_eq!(config.vector.top_k, 5);
        assert_eq!(config.vector.min_score, 0.3);
    }

    #[test]
    #[serial]
    fn test_vector_config_from_env() {
        std::env::set_var("VECTOR_URL", "http://qdrant:6333");
        std::env::set_var("VECTOR_TOP_K", "8");

        let config = Config::default();
        assert_eq!(config.vector.url, "http://qdrant:6333");
        assert_eq!(config.vector.top_k, 8);

        std::env::remove_var("VECTOR_URL");
        std::env::remove_var("VECTOR_TOP_K");
    }

    #[test]
    #[serial]
    fn test_llm_config_absent_without_model() {
        std::env::remove_var("LLM_MODEL");
        let config = Config::default();
        assert!(config.llm.is_none());
    }

    #[test]
    #[serial]
    fn test_llm_config_from_env() {
        std::env::set_var("LLM_MODEL", "openai/gpt-4o-mini");
        std::env::set_var("LLM_TIMEOUT", "90");

        let config = Config::default();
        let llm = config.llm.expect("llm config");
        assert_eq!(llm.model, "openai/gpt-4o-mini");
        assert_eq!(llm.timeout_secs, 90);

        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_TIMEOUT");
    }

    #[test]
    fn test_parse_provider_model() {
        assert_eq!(
            parse_provider_model("openai/text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
        assert_eq!(
            parse_provider_model("BAAI/bge-small-en-v1.5"),
            ("local", "BAAI/bge-small-en-v1.5")
        );
    }

    #[test]
    fn test_parse_llm_provider_model() {
        assert_eq!(
            parse_llm_provider_model("ollama/llama3"),
            ("ollama", "llama3")
        );
        assert_eq!(parse_llm_provider_model("my-local-model"), ("local", "my-local-model"));
    }

    #[test]
    #[serial]
    fn test_parse_env_or_invalid_falls_back() {
        std::env::set_var("__TEST_MARU_PORT", "not-a-number");
        let result: u16 = parse_env_or("__TEST_MARU_PORT", 8000);
        assert_eq!(result, 8000);
        std::env::remove_var("__TEST_MARU_PORT");
    }
}
