//! Intent resolution - turns raw user text into an intent the registry understands.
//!
//! Resolution runs an optional text-correction pass, then an optional external
//! recognizer, then normalization. Failures in either collaborator degrade to
//! the uncorrected text; a turn never fails because of them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use story_rules::normalize_phrase;

/// Errors from the correction and recognition collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("text correction failed: {0}")]
    Correction(String),

    #[error("intent recognizer failed: {0}")]
    Recognizer(String),
}

/// Spell/text correction service.
#[async_trait]
pub trait TextCorrector: Send + Sync {
    async fn correct(&self, text: &str) -> Result<String, ResolveError>;
}

/// External intent classifier. `Ok(None)` means "no opinion".
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Option<String>, ResolveError>;
}

/// Word-by-word corrector over a fixed table of known misspellings.
#[derive(Debug, Clone, Default)]
pub struct WordListCorrector {
    fixes: HashMap<String, String>,
}

impl WordListCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Common misspellings for the zombie office story.
    pub fn zombie_office() -> Self {
        Self::new()
            .with_fix("elevater", "elevator")
            .with_fix("elavator", "elevator")
            .with_fix("stiars", "stairs")
            .with_fix("extiguisher", "extinguisher")
            .with_fix("extinguiser", "extinguisher")
            .with_fix("calculater", "calculator")
            .with_fix("crad", "card")
    }

    pub fn with_fix(mut self, wrong: impl Into<String>, right: impl Into<String>) -> Self {
        self.fixes.insert(wrong.into().to_lowercase(), right.into());
        self
    }
}

#[async_trait]
impl TextCorrector for WordListCorrector {
    async fn correct(&self, text: &str) -> Result<String, ResolveError> {
        Ok(text
            .split_whitespace()
            .map(|word| {
                self.fixes
                    .get(&word.to_lowercase())
                    .map(String::as_str)
                    .unwrap_or(word)
            })
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Resolves raw user text to a canonical intent.
#[derive(Clone, Default)]
pub struct IntentResolver {
    corrector: Option<Arc<dyn TextCorrector>>,
    recognizer: Option<Arc<dyn IntentRecognizer>>,
    correction_enabled: bool,
}

impl IntentResolver {
    /// A resolver that only normalizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a corrector and enable the correction pass.
    pub fn with_corrector(mut self, corrector: Arc<dyn TextCorrector>) -> Self {
        self.corrector = Some(corrector);
        self.correction_enabled = true;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn IntentRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Toggle the correction pass without removing the corrector.
    pub fn with_correction_enabled(mut self, enabled: bool) -> Self {
        self.correction_enabled = enabled;
        self
    }

    pub fn correction_enabled(&self) -> bool {
        self.correction_enabled && self.corrector.is_some()
    }

    /// Resolve raw text. Unmapped text passes through normalized.
    pub async fn resolve(&self, raw: &str) -> String {
        let text = self.corrected(raw).await;

        if let Some(recognizer) = &self.recognizer {
            match recognizer.recognize(&text).await {
                Ok(Some(intent)) => {
                    debug!(raw, intent = %intent, "intent recognized");
                    return normalize_phrase(&intent);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "intent recognizer failed, using raw text"),
            }
        }

        normalize_phrase(&text)
    }

    async fn corrected(&self, raw: &str) -> String {
        let Some(corrector) = self.corrector.as_ref().filter(|_| self.correction_enabled) else {
            return raw.to_string();
        };

        match corrector.correct(raw).await {
            Ok(text) => {
                if text != raw {
                    debug!(raw, corrected = %text, "text corrected");
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "text correction failed, using raw text");
                raw.to_string()
            }
        }
    }
}

impl std::fmt::Debug for IntentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentResolver")
            .field("corrector", &self.corrector.is_some())
            .field("recognizer", &self.recognizer.is_some())
            .field("correction_enabled", &self.correction_enabled)
            .finish()
    }
}
