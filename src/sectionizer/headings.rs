use log::warn;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Heading phrases recognised in scraped job descriptions.
///
/// Order matters when two phrases match at the same position: the one
/// listed first wins, so longer phrases sharing a suffix come first.
pub const DEFAULT_HEADINGS: &[&str] = &[
    "Job Responsibilities:",
    "Responsibilities:",
    "Requirements:",
    "Qualifications:",
    "Educational Qualification:",
    "Experience:",
    "Role Specific Qualifications & Training:",
    "Beneficial (A Plus):",
    "Behavioural Competencies:",
    "Industries acceptable:",
    "About the Role:",
    "Key Responsibilities:",
    "What You'll Do:",
    "What We're Looking For:",
    "Nice to Have:",
    "Benefits:",
];

pub(crate) static DEFAULT_REGISTRY: LazyLock<HeadingRegistry> =
    LazyLock::new(HeadingRegistry::default);

/// Case-insensitive set of heading phrases used to split a description
/// into sections.
#[derive(Debug, Clone)]
pub struct HeadingRegistry {
    phrases: Vec<String>,
    pattern: Option<Regex>,
}

impl HeadingRegistry {
    /// Build a registry from exact phrases. Blank phrases are ignored.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            phrases: Vec::new(),
            pattern: None,
        };
        for phrase in phrases {
            registry.push(phrase.into());
        }
        registry.pattern = build_pattern(&registry.phrases);
        registry
    }

    /// Add a phrase to the registry.
    ///
    /// Phrases already present (ignoring case) are not added twice.
    ///
    /// # Example
    /// ```
    /// use job_scraper_client::HeadingRegistry;
    ///
    /// let registry = HeadingRegistry::default().with_phrase("Perks:");
    /// assert!(registry.contains("perks:"));
    /// ```
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        if self.push(phrase.into()) {
            self.pattern = build_pattern(&self.phrases);
        }
        self
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases
            .iter()
            .any(|p| p.to_lowercase() == phrase.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Split `text` on every recognised heading.
    ///
    /// Returns `(heading, body)` pairs in source order, where `body` runs up
    /// to the next heading or the end of the text. Text before the first
    /// heading is not returned.
    pub fn split<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let matches: Vec<_> = pattern.find_iter(text).collect();
        matches
            .iter()
            .enumerate()
            .map(|(i, heading)| {
                let body_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
                (heading.as_str(), &text[heading.end()..body_end])
            })
            .collect()
    }

    fn push(&mut self, phrase: String) -> bool {
        if phrase.trim().is_empty() || self.contains(&phrase) {
            return false;
        }
        self.phrases.push(phrase);
        true
    }
}

impl Default for HeadingRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HEADINGS.iter().copied())
    }
}

fn build_pattern(phrases: &[String]) -> Option<Regex> {
    if phrases.is_empty() {
        return None;
    }

    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!("Heading registry could not be compiled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_all_headings() {
        let registry = HeadingRegistry::default();
        assert_eq!(registry.len(), DEFAULT_HEADINGS.len());
        assert!(registry.contains("Beneficial (A Plus):"));
        assert!(registry.contains("what we're looking for:"));
    }

    #[test]
    fn test_with_phrase_ignores_duplicates_and_blanks() {
        let registry = HeadingRegistry::default()
            .with_phrase("BENEFITS:")
            .with_phrase("   ")
            .with_phrase("Perks:");
        assert_eq!(registry.len(), DEFAULT_HEADINGS.len() + 1);
        assert_eq!(registry.phrases().last().unwrap(), "Perks:");
    }

    #[test]
    fn test_split_returns_heading_body_pairs() {
        let registry = HeadingRegistry::default();
        let parts = registry.split("Intro text\nrequirements: SQL\nBenefits:\nLunch");
        assert_eq!(
            parts,
            vec![("requirements:", " SQL\n"), ("Benefits:", "\nLunch")]
        );
    }

    #[test]
    fn test_split_prefers_leftmost_match() {
        let registry = HeadingRegistry::default();
        let parts = registry.split("Key Responsibilities:\nShip features");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].0, "Key Responsibilities:");

        let parts = registry.split("Job Responsibilities: Review code");
        assert_eq!(parts[0].0, "Job Responsibilities:");
    }

    #[test]
    fn test_split_treats_metacharacters_literally() {
        let registry = HeadingRegistry::default();
        let parts = registry.split("Beneficial (A Plus):\nRust");
        assert_eq!(parts, vec![("Beneficial (A Plus):", "\nRust")]);

        // Without the literal parentheses there is no heading
        assert!(registry.split("Beneficial A Plus:\nRust").is_empty());
    }

    #[test]
    fn test_empty_registry_never_matches() {
        let registry = HeadingRegistry::new(Vec::<String>::new());
        assert!(registry.is_empty());
        assert!(registry.split("Requirements:\nAnything").is_empty());
    }
}
