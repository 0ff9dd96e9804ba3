//! Word validation pipeline.
//!
//! Cheap local checks run first and short-circuit; only a word that passes
//! all of them is sent to the dictionary providers, in order, until one of
//! them confirms it.

use std::collections::HashSet;

use crate::dictionary::DictionaryProvider;
use crate::types::{RejectReason, Verdict, MAX_WORD_CHARS};

/// Common names, places, days, months, holidays and brands that dictionaries
/// happily return but that don't count as words in the game
pub const COMMON_PROPER_NOUNS: &[&str] = &[
    "john", "mary", "james", "michael", "david", "sarah", "jennifer", "jessica",
    "london", "paris", "tokyo", "america", "europe", "africa", "asia",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december",
    "christmas", "easter", "halloween",
    "google", "apple", "microsoft", "facebook", "amazon",
    "peppa", "george", "disney", "pokemon", "minecraft",
];

/// Trim and lower-case a spoken word
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// First spoken token of a transcript; the rest is background speech
pub fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Letter the next word has to start with, given the last accepted word
pub fn required_start_letter(last_accepted_word: &str) -> Option<char> {
    last_accepted_word
        .trim()
        .chars()
        .last()
        .and_then(|c| c.to_lowercase().next())
}

pub fn is_likely_proper_noun(normalized: &str) -> bool {
    COMMON_PROPER_NOUNS.contains(&normalized)
}

/// Local checks only (no network). `Ok(())` means the word still needs a
/// dictionary lookup.
pub fn precheck(
    word: &str,
    last_accepted_word: Option<&str>,
    used_words: &HashSet<String>,
) -> Result<(), RejectReason> {
    let normalized = normalize(word);

    if normalized.is_empty() {
        return Err(RejectReason::EmptyWord);
    }

    if normalized.chars().count() > MAX_WORD_CHARS {
        return Err(RejectReason::TooLong {
            max: MAX_WORD_CHARS,
        });
    }

    if normalized.chars().any(|c| c.is_ascii_digit()) {
        return Err(RejectReason::ContainsNumber);
    }

    if let Some(required) = last_accepted_word.and_then(required_start_letter) {
        if !normalized.starts_with(required) {
            return Err(RejectReason::ChainRuleViolation { required });
        }
    }

    if used_words.contains(&normalized) {
        return Err(RejectReason::AlreadyUsed);
    }

    if is_likely_proper_noun(&normalized) {
        return Err(RejectReason::ProperNoun);
    }

    Ok(())
}

/// Validates words against the local rules and the configured dictionaries
pub struct WordValidator {
    providers: Vec<Box<dyn DictionaryProvider>>,
}

impl WordValidator {
    /// Providers are consulted in the given order
    pub fn new(providers: Vec<Box<dyn DictionaryProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Run the full pipeline. Never fails: provider errors are logged and
    /// treated as "not found", and only when no provider confirms the word
    /// is it rejected as [`RejectReason::NotAWord`].
    pub async fn validate(
        &self,
        word: &str,
        last_accepted_word: Option<&str>,
        used_words: &HashSet<String>,
    ) -> Verdict {
        if let Err(reason) = precheck(word, last_accepted_word, used_words) {
            tracing::debug!("Word {:?} rejected locally: {:?}", word, reason);
            return Verdict::rejected(reason);
        }

        let normalized = normalize(word);
        let mut lookup_failures = 0;

        for provider in &self.providers {
            match provider.lookup(&normalized).await {
                Ok(lookup) if lookup.confirms(&normalized) => {
                    tracing::debug!("Provider {} confirmed {:?}", provider.name(), normalized);
                    return Verdict {
                        lookup_failures,
                        ..Verdict::valid()
                    };
                }
                Ok(lookup) => {
                    tracing::debug!(
                        "Provider {} did not confirm {:?} (headword: {:?})",
                        provider.name(),
                        normalized,
                        lookup.headword
                    );
                }
                Err(e) => {
                    lookup_failures += 1;
                    tracing::warn!(
                        "Provider {} failed for {:?}: {}",
                        provider.name(),
                        normalized,
                        e
                    );
                }
            }
        }

        Verdict {
            lookup_failures,
            ..Verdict::rejected(RejectReason::NotAWord)
        }
    }
}
