use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub output_folder: String,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String, // "gemini", "ollama" or "openai"
    pub timeout_seconds: u64,
    pub gemini: Option<GeminiConfig>,
    pub ollama: Option<OllamaConfig>,
    pub openai: Option<OpenAIConfig>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

const DEFAULT_OUTPUT_FOLDER: &str = "outputs";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

fn required_var(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("Missing required environment variable: {key}"))
}

impl Config {
    /// Builds the configuration from environment variables, refusing to start
    /// when the selected provider's variables are absent.
    pub fn from_env() -> Result<Self> {
        let provider = required_var("LLM_PROVIDER")?.trim().to_lowercase();

        let timeout_seconds = match env::var("LLM_TIMEOUT_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECONDS must be a positive integer")?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        let mut llm = LlmConfig {
            provider: provider.clone(),
            timeout_seconds,
            gemini: None,
            ollama: None,
            openai: None,
        };

        match provider.as_str() {
            "gemini" => {
                llm.gemini = Some(GeminiConfig {
                    api_key: required_var("GEMINI_API_KEY")?,
                    model: normalize_gemini_model(&required_var("GEMINI_MODEL")?),
                });
            }
            "ollama" => {
                llm.ollama = Some(OllamaConfig {
                    base_url: env::var("OLLAMA_BASE_URL")
                        .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string()),
                    model: required_var("OLLAMA_MODEL")?,
                });
            }
            "openai" => {
                llm.openai = Some(OpenAIConfig {
                    api_key: required_var("OPENAI_API_KEY")?,
                    model: required_var("OPENAI_MODEL")?,
                    base_url: env::var("OPENAI_BASE_URL").ok(),
                });
            }
            other => bail!(
                "Unsupported LLM_PROVIDER: {other}. Must be 'gemini', 'ollama' or 'openai'."
            ),
        }

        Ok(Self {
            output_folder: env::var("OUTPUT_FOLDER")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_FOLDER.to_string()),
            llm,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds)
    }
}

/// Some consoles hand out model names as `models/gemini-...`; the generateContent
/// URL wants the bare name.
fn normalize_gemini_model(raw: &str) -> String {
    raw.trim().trim_start_matches("models/").to_string()
}

/// Probes the Ollama server before the conversation starts so a dead server
/// fails fast with a readable message instead of mid-turn.
pub async fn check_ollama_server(config: &Config) -> Result<()> {
    let Some(ollama) = config.llm.ollama.as_ref() else {
        return Ok(());
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    client
        .get(&ollama.base_url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map(|_| ())
        .with_context(|| {
            format!(
                "Could not connect to Ollama server at {}. \
                 Please ensure it is running (`ollama serve`).",
                ollama.base_url
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_gemini_model() {
        assert_eq!(
            normalize_gemini_model("models/gemini-1.5-flash"),
            "gemini-1.5-flash"
        );
        assert_eq!(normalize_gemini_model("gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(normalize_gemini_model("  models/x "), "x");
    }
}
