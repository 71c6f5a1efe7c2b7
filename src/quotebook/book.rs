//! Quotes grouped by author.

use std::fmt;

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use log::debug;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub name: String,
    #[serde(default)]
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBook {
    #[serde(rename = "quotes", default)]
    pub authors: Vec<QuoteRecord>,
}

/// A single quote with the name it is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {}", self.text, self.author)
    }
}

impl QuoteBook {
    /// Author record whose name equals `name`, ignoring case.
    #[must_use]
    pub fn find_author(&self, name: &str) -> Option<&QuoteRecord> {
        let lowered = name.trim().to_lowercase();
        self.authors
            .iter()
            .find(|record| record.name.to_lowercase() == lowered)
    }

    /// A random quote from `author`, or from a random author when omitted.
    ///
    /// # Errors
    ///
    /// Returns `AuthorNotFound` for an unknown author and `QuotebookEmpty`
    /// when there is nothing to pick from.
    pub fn get_quote(&self, author: Option<&str>) -> Result<Quote> {
        let mut rng = rand::rng();

        let record = match author.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.find_author(name).ok_or_else(|| BotError::AuthorNotFound {
                name: name.to_string(),
                suggestion: self.suggest_author(name),
            })?,
            None => {
                let with_quotes: Vec<&QuoteRecord> = self
                    .authors
                    .iter()
                    .filter(|record| !record.quotes.is_empty())
                    .collect();
                with_quotes
                    .choose(&mut rng)
                    .copied()
                    .ok_or(BotError::QuotebookEmpty)?
            }
        };

        let text = record
            .quotes
            .choose(&mut rng)
            .ok_or_else(|| BotError::AuthorNotFound {
                name: record.name.clone(),
                suggestion: None,
            })?;

        Ok(Quote {
            text: text.clone(),
            author: record.name.clone(),
        })
    }

    /// File `quote` under `author`, returning the name it was filed under.
    ///
    /// An existing author is matched ignoring case and keeps its spelling.
    pub fn add_quote(&mut self, author: &str, quote: &str) -> String {
        let author = author.trim();
        let lowered = author.to_lowercase();

        if let Some(record) = self
            .authors
            .iter_mut()
            .find(|record| record.name.to_lowercase() == lowered)
        {
            record.quotes.push(quote.to_string());
            return record.name.clone();
        }

        self.authors.push(QuoteRecord {
            name: author.to_string(),
            quotes: vec![quote.to_string()],
        });
        author.to_string()
    }

    /// Closest known author name to a misspelled `name`.
    #[must_use]
    pub fn suggest_author(&self, name: &str) -> Option<String> {
        let lowered = name.to_lowercase();
        let mut best: Option<(&str, f64)> = None;

        for record in &self.authors {
            let score = strsim::jaro_winkler(&record.name.to_lowercase(), &lowered);
            let is_better = best
                .as_ref()
                .is_none_or(|(_, best_score)| score > *best_score);
            if score > SUGGESTION_THRESHOLD && is_better {
                best = Some((&record.name, score));
            }
        }

        best.map(|(name, score)| {
            debug!("Suggesting author '{name}' for '{lowered}' (sim={score:.3})");
            name.to_string()
        })
    }

    /// Author names ranked by fuzzy score against `partial`, best first.
    #[must_use]
    pub fn search_authors(&self, partial: &str, limit: usize) -> Vec<String> {
        let partial = partial.trim();
        if limit == 0 {
            return Vec::new();
        }
        if partial.is_empty() {
            return self
                .authors
                .iter()
                .take(limit)
                .map(|record| record.name.clone())
                .collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(&str, i64)> = self
            .authors
            .iter()
            .filter_map(|record| {
                matcher
                    .fuzzy_match(&record.name, partial)
                    .map(|score| (record.name.as_str(), score))
            })
            .collect();

        scored.sort_by(|(left_name, left_score), (right_name, right_score)| {
            right_score
                .cmp(left_score)
                .then_with(|| left_name.cmp(right_name))
        });

        scored
            .into_iter()
            .take(limit)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}
