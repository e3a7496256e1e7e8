use common::FilterConfig;

/// Outcome of [`CategoryFilter::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Keep,
    /// Mentions a location outside the followed line
    Excluded(String),
    /// No inclusion topic found
    OffTopic,
}

/// Keyword rules on article text. Matching is plain substring containment on
/// lower-cased text, so a keyword inside a longer word still counts.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    exclusion_keywords: Vec<String>,
    inclusion_topics: Vec<String>,
}

impl CategoryFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            exclusion_keywords: lowered(&config.exclusion_keywords),
            inclusion_topics: lowered(&config.inclusion_topics),
        }
    }

    pub fn excluded_by<'k>(&'k self, text_lower: &str) -> Option<&'k str> {
        self.exclusion_keywords
            .iter()
            .find(|k| text_lower.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_included(&self, text_lower: &str) -> bool {
        self.inclusion_topics
            .iter()
            .any(|t| text_lower.contains(t.as_str()))
    }

    /// Exclusion is checked first and wins over any topic match.
    pub fn evaluate(&self, text: &str) -> FilterVerdict {
        let text_lower = text.to_lowercase();
        if let Some(keyword) = self.excluded_by(&text_lower) {
            return FilterVerdict::Excluded(keyword.to_string());
        }
        if self.is_included(&text_lower) {
            FilterVerdict::Keep
        } else {
            FilterVerdict::OffTopic
        }
    }

    pub fn keeps(&self, text: &str) -> bool {
        self.evaluate(text) == FilterVerdict::Keep
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

fn lowered(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_in_scope_topics() {
        let filter = CategoryFilter::default();
        assert!(filter.keeps("INFOMOBILITÀ FERROVIA: ritardi sulla Napoli - Sorrento"));
        assert!(filter.keeps("Linee Vesuviane - Sorrento: bus sostitutivi"));
    }

    #[test]
    fn off_topic_is_dropped() {
        let filter = CategoryFilter::default();
        assert_eq!(filter.evaluate("Infomobilità Bus: linea 12 deviata"), FilterVerdict::OffTopic);
    }

    #[test]
    fn exclusion_wins_over_topic() {
        let filter = CategoryFilter::default();
        let texts = [
            "Linee Vesuviane - Sarno: soppressioni",
            "Infomobilità Ferrovia Cumana: lavori",
            "infomobilità ferrovia - tratta POMIGLIANO",
        ];
        for text in texts {
            assert!(!filter.keeps(text), "{text}");
            assert!(matches!(filter.evaluate(text), FilterVerdict::Excluded(_)));
        }
    }

    #[test]
    fn exclusion_matches_inside_longer_words() {
        // "Nola" inside "Nolana" still excludes
        let filter = CategoryFilter::default();
        assert_eq!(
            filter.evaluate("Linee Vesuviane: variazioni sulla tratta Nolana"),
            FilterVerdict::Excluded("nola".to_string())
        );
    }

    #[test]
    fn custom_rules() {
        let filter = CategoryFilter::new(&FilterConfig {
            exclusion_keywords: vec!["  ".to_string(), "Pompei".to_string()],
            inclusion_topics: vec!["Circumvesuviana".to_string()],
        });
        assert!(filter.keeps("circumvesuviana ok"));
        assert!(!filter.keeps("Circumvesuviana Pompei"));
        assert!(!filter.keeps("linee vesuviane"));
    }
}
