use common::DigestConfig;

use crate::models::{ArticleRecord, NewsBatch};

const SEPARATOR_WIDTH: usize = 30;

/// Builds every text the pipeline produces from a batch.
#[derive(Debug, Clone)]
pub struct DigestComposer {
    config: DigestConfig,
}

impl DigestComposer {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.config.system_prompt
    }

    /// Fixed message for a day without relevant notices.
    pub fn empty_message(&self) -> &str {
        &self.config.empty_message
    }

    /// Human-readable, quote-everything message parts.
    pub fn verbatim_lines(&self, batch: &NewsBatch) -> Vec<String> {
        let mut lines = vec![self.config.verbatim_header.clone()];
        for record in &batch.records {
            lines.push(format!("📅 {}", record.date));
            if !record.title.is_empty() {
                lines.push(record.title.clone());
            }
            lines.push(record.text.clone());
            if let Some(url) = &record.url {
                lines.push(url.to_string());
            }
            lines.push("-".repeat(SEPARATOR_WIDTH));
        }
        lines
    }

    pub fn verbatim_message(&self, batch: &NewsBatch) -> String {
        self.verbatim_lines(batch).join("\n")
    }

    /// Numbered, labelled sections fed to the summarizer.
    pub fn prompt_block(&self, batch: &NewsBatch) -> String {
        batch
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| prompt_section(i + 1, record))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// `prompt_block` wrapped in the instruction template.
    pub fn user_prompt(&self, prompt_block: &str) -> String {
        self.config
            .user_prompt_template
            .replace("{INPUT}", prompt_block)
    }

    pub fn summary_message(&self, summary: &str) -> String {
        format!("{}\n\n{}", self.config.summary_header, summary.trim())
    }

    /// Applies the delivery size limit.
    pub fn finalize(&self, message: &str) -> String {
        truncate_message(message, self.config.max_message_chars)
    }
}

fn prompt_section(n: usize, record: &ArticleRecord) -> String {
    format!(
        "NOTIZIA {}\nTitolo: {}\nData: {}\nTesto:\n{}",
        n, record.title, record.date, record.text
    )
}

/// First `max_chars` characters of `text` (never splits a character).
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
