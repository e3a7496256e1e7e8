/*!
common/src/lib.rs

Shared configuration types for infodigest.

This file provides:
- Config data structures (deserialized from TOML), every section defaulted
- An async loader for a TOML config file, with default/override merging
- Environment overrides for the values operators usually tweak per run
*/

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding `source.max_pages`.
pub const ENV_MAX_PAGES: &str = "INFODIGEST_MAX_PAGES";
/// Environment variable fixing the reference day (`YYYY-MM-DD`).
pub const ENV_REFERENCE_DAY: &str = "INFODIGEST_REFERENCE_DAY";

/// What a past-dated listing item terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    /// The whole scan stops at the first past-dated item.
    #[default]
    Run,
    /// Only the current page stops; the next page is still fetched.
    Page,
}

/// Tag name plus optional class, e.g. `div.card-columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSignature {
    pub tag: String,
    #[serde(default)]
    pub class: Option<String>,
}

impl ElementSignature {
    pub fn new(tag: &str, class: Option<&str>) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.map(str::to_string),
        }
    }
}

/// Where things live in the listing and detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub container: ElementSignature,
    pub item: ElementSignature,
    pub title: ElementSignature,
    pub read_more: ElementSignature,
    pub detail_content: ElementSignature,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container: ElementSignature::new("div", Some("card-columns")),
            item: ElementSignature::new("article", None),
            title: ElementSignature::new("h4", Some("card-title")),
            read_more: ElementSignature::new("a", Some("read-more")),
            detail_content: ElementSignature::new("section", Some("entry-content")),
        }
    }
}

/// Listing source and fetching behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page 1 URL; page n is `{base_url}page/{n}/`
    pub base_url: String,
    pub user_agent: String,
    pub fetch_timeout_seconds: u64,
    pub max_pages: u32,
    pub stop_policy: StopPolicy,
    pub layout: LayoutConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.eavsrl.it/infomobilita-ferrovia/".to_string(),
            user_agent: "Mozilla/5.0 (compatible; DailyLLMAgent/1.0)".to_string(),
            fetch_timeout_seconds: 10,
            max_pages: 10,
            stop_policy: StopPolicy::Run,
            layout: LayoutConfig::default(),
        }
    }
}

/// Keyword rules applied to the resolved article text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Locations outside the Napoli - Sorrento line; any hit discards the article
    pub exclusion_keywords: Vec<String>,
    /// At least one of these must appear for the article to be kept
    pub inclusion_topics: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let exclusion_keywords = [
            "Sarno",
            "Poggiomarino",
            "Baiano",
            "Acerra",
            "Nola",
            "Scafati",
            "Ottaviano",
            "Pomigliano",
            "Piedimonte",
            "Matese",
            "Cumana",
        ];
        Self {
            exclusion_keywords: exclusion_keywords.iter().map(|s| s.to_string()).collect(),
            inclusion_topics: vec![
                "infomobilità ferrovia".to_string(),
                "linee vesuviane".to_string(),
            ],
        }
    }
}

/// Month abbreviations used by the source's date tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    pub months: BTreeMap<String, u32>,
}

impl Default for DatesConfig {
    fn default() -> Self {
        let months = [
            "GEN", "FEB", "MAR", "APR", "MAG", "GIU", "LUG", "AGO", "SET", "OTT", "NOV", "DIC",
        ];
        Self {
            months: months
                .iter()
                .zip(1u32..)
                .map(|(code, n)| (code.to_string(), n))
                .collect(),
        }
    }
}

/// Remote summarization endpoint (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub adapter: String, // "remote", "none"
    pub api_url: String,
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            adapter: "remote".to_string(),
            api_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 30,
            max_tokens: 500,
            temperature: 0.2,
        }
    }
}

/// Fixed texts of the produced messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub verbatim_header: String,
    pub summary_header: String,
    pub empty_message: String,
    pub system_prompt: String,
    /// Must contain `{INPUT}`, replaced by the prompt block
    pub user_prompt_template: String,
    pub max_message_chars: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            verbatim_header: "📢 Infomobilità EAV Linea Napoli Sorrento – Oggi\n".to_string(),
            summary_header: "📢 Infomobilità EAV - Linea Napoli - Sorrento – Sintesi".to_string(),
            empty_message:
                "Nessuna comunicazione Infomobilità Ferrovia / Linee Vesuviane per oggi.".to_string(),
            system_prompt: "Sei un assistente che riassume comunicazioni ufficiali di informazioni sulla mobilità ferroviaria.\n\
Non aggiungere interpretazioni, non dare consigli, non inventare informazioni."
                .to_string(),
            user_prompt_template: "Ti fornisco una o più comunicazioni di informazioni sulla mobilità ferroviaria.\n\
Produci un riepilogo sintetico per un messaggio Telegram.\n\
\n\
Regole:\n\
- ogni punto deve essere abbastanza breve\n\
- se più comunicazioni parlano della stessa linea, accorpale\n\
- non ripetere la data se è sempre la stessa\n\
- se non ci sono disservizi rilevanti, scrivi: \"Nessuna criticità rilevante segnalata.\"\n\
\n\
Testo:\n\
<<<\n\
{INPUT}\n\
>>>"
            .to_string(),
            max_message_chars: 4000,
        }
    }
}

/// Where the final message goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub kind: String, // "stdout", "telegram"
    pub telegram_api_url: String,
    pub token_env: String,
    pub chat_id_env: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            kind: "stdout".to_string(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            token_env: "TELEGRAM_TOKEN".to_string(),
            chat_id_env: "CHAT_ID".to_string(),
        }
    }
}

/// Scheduler (run times) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// List of wall-clock times in "HH:MM" 24h format when a run should start
    pub times: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            times: vec!["06:15".to_string(), "07:00".to_string(), "17:00".to_string()],
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub dates: DatesConfig,
    pub llm: LlmConfig,
    pub digest: DigestConfig,
    pub delivery: DeliveryConfig,
    pub scheduler: SchedulerConfig,
    /// Day the "today" window starts at; `None` means the local date at run time
    pub reference_day: Option<NaiveDate>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing files
    /// and missing keys fall back to the built-in defaults.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Apply `INFODIGEST_MAX_PAGES` / `INFODIGEST_REFERENCE_DAY` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_PAGES).filter(|v| !v.trim().is_empty()) {
            self.source.max_pages = raw
                .trim()
                .parse()
                .with_context(|| format!("{} is not a page count: {:?}", ENV_MAX_PAGES, raw))?;
        }
        if let Some(raw) = lookup(ENV_REFERENCE_DAY).filter(|v| !v.trim().is_empty()) {
            let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("{} is not a YYYY-MM-DD date: {:?}", ENV_REFERENCE_DAY, raw))?;
            self.reference_day = Some(day);
        }
        Ok(())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}
