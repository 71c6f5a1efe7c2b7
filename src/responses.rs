//! Learned trigger/response pairs and their JSON store.

use std::path::PathBuf;

use log::info;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::Result,
    matcher::{MERGE_THRESHOLD, best_scoring, find_best_trigger},
    store::JsonFile,
};

/// A trigger phrase and everything the bot has been taught to say to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "question")]
    pub trigger: String,
    #[serde(rename = "answers", alias = "answer", deserialize_with = "one_or_many")]
    pub responses: Vec<String>,
}

impl ResponseRecord {
    /// A uniformly random response, `None` only for a record without any.
    #[must_use]
    pub fn pick_response(&self) -> Option<&str> {
        self.responses
            .choose(&mut rand::rng())
            .map(String::as_str)
    }
}

/// The whole response document, in teaching order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBook {
    #[serde(rename = "questions", default)]
    pub records: Vec<ResponseRecord>,
}

/// What [`ResponseBook::teach`] did with a new pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeachOutcome {
    /// Appended to the existing record for this (similar) trigger.
    Merged { trigger: String },
    /// Started a new record.
    Created,
}

impl ResponseBook {
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.trigger.as_str())
    }

    /// Record whose trigger best matches `input`, compared case-insensitively.
    #[must_use]
    pub fn lookup(&self, input: &str) -> Option<&ResponseRecord> {
        let input = input.to_lowercase();
        let lowered: Vec<String> = self.triggers().map(str::to_lowercase).collect();
        let matched = find_best_trigger(&input, lowered.iter().map(String::as_str))?;

        lowered
            .iter()
            .position(|trigger| trigger == matched)
            .map(|index| &self.records[index])
    }

    /// Add `response` under `trigger`, merging into the most similar existing
    /// trigger when it scores at least [`MERGE_THRESHOLD`].
    ///
    /// Teaching the same pair twice stores the response twice.
    pub fn teach(&mut self, trigger: &str, response: &str) -> TeachOutcome {
        let lowered_trigger = trigger.to_lowercase();
        let lowered: Vec<String> = self.triggers().map(str::to_lowercase).collect();
        let closest = best_scoring(&lowered_trigger, lowered.iter().map(String::as_str))
            .filter(|closest| closest.score >= MERGE_THRESHOLD)
            .map(|closest| closest.index);

        if let Some(index) = closest {
            let record = &mut self.records[index];
            record.responses.push(response.to_string());
            TeachOutcome::Merged {
                trigger: record.trigger.clone(),
            }
        } else {
            self.records.push(ResponseRecord {
                trigger: trigger.to_string(),
                responses: vec![response.to_string()],
            });
            TeachOutcome::Created
        }
    }
}

/// File-backed [`ResponseBook`].
#[derive(Debug)]
pub struct ResponseStore {
    file: JsonFile<ResponseBook>,
}

impl ResponseStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Current contents; a store that was never written is empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreParse` or `Io` if the file cannot be read.
    pub async fn snapshot(&self) -> Result<ResponseBook> {
        self.file.load_or_default().await
    }

    /// Teach and persist one pair.
    ///
    /// # Errors
    ///
    /// Returns `StoreParse` or `Io`; the file is unchanged on error.
    pub async fn teach(&self, trigger: &str, response: &str) -> Result<TeachOutcome> {
        let outcome = self
            .file
            .update(|book| book.teach(trigger, response))
            .await?;

        match &outcome {
            TeachOutcome::Merged { trigger: existing } => {
                info!("Learned another response for '{existing}' (taught as '{trigger}')");
            }
            TeachOutcome::Created => info!("Learned new trigger '{trigger}'"),
        }

        Ok(outcome)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(response) => vec![response],
        OneOrMany::Many(responses) => responses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> ResponseBook {
        ResponseBook {
            records: vec![ResponseRecord {
                trigger: "How are you".to_string(),
                responses: vec!["I'm a bot, I'm always fine!".to_string()],
            }],
        }
    }

    #[test]
    fn lookup_tolerates_typos_and_case() -> std::result::Result<(), &'static str> {
        let book = book();
        let record = book.lookup("how r u").ok_or("expected match")?;
        assert_eq!(record.trigger, "How are you");
        assert_eq!(record.pick_response(), Some("I'm a bot, I'm always fine!"));
        Ok(())
    }

    #[test]
    fn lookup_rejects_unrelated_input() {
        assert!(book().lookup("what is the weather").is_none());
        assert!(ResponseBook::default().lookup("how are you").is_none());
    }

    #[test]
    fn lookup_scores_against_stored_trigger_first() {
        let book = ResponseBook {
            records: vec![ResponseRecord {
                trigger: "how you it yo".to_string(),
                responses: vec!["yo".to_string()],
            }],
        };
        assert!(book.lookup("how is how").is_none());
    }

    #[test]
    fn teaching_twice_appends_both_responses() {
        let mut book = ResponseBook::default();
        assert_eq!(book.teach("what is the weather", "It's sunny!"), TeachOutcome::Created);
        assert_eq!(
            book.teach("what is the weather", "It's raining!"),
            TeachOutcome::Merged {
                trigger: "what is the weather".to_string()
            }
        );

        assert_eq!(book.records.len(), 1);
        assert_eq!(book.records[0].responses, ["It's sunny!", "It's raining!"]);
    }

    #[test]
    fn similar_trigger_merges_into_existing_record() {
        let mut book = book();
        let outcome = book.teach("how are you?", "Fantastic.");

        assert_eq!(
            outcome,
            TeachOutcome::Merged {
                trigger: "How are you".to_string()
            }
        );
        assert_eq!(book.records.len(), 1);
        assert_eq!(book.records[0].responses.len(), 2);
    }

    #[test]
    fn dissimilar_trigger_creates_record() {
        let mut book = book();
        assert_eq!(
            book.teach("what is the weather", "It's sunny!"),
            TeachOutcome::Created
        );
        assert_eq!(book.records.len(), 2);
        assert_eq!(book.records[1].trigger, "what is the weather");
        assert_eq!(book.records[1].responses, ["It's sunny!"]);
    }

    #[test]
    fn accepts_single_answer_documents() -> serde_json::Result<()> {
        let legacy = r#"{"questions": [{"question": "hi", "answer": "hello"}]}"#;
        let book: ResponseBook = serde_json::from_str(legacy)?;
        assert_eq!(book.records[0].responses, ["hello"]);

        let written = serde_json::to_string(&book)?;
        assert_eq!(written, r#"{"questions":[{"question":"hi","answers":["hello"]}]}"#);
        Ok(())
    }

    #[tokio::test]
    async fn store_persists_taught_pairs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResponseStore::new(dir.path().join("responses.json"));

        assert_eq!(store.snapshot().await.expect("empty"), ResponseBook::default());
        store
            .teach("what is the weather", "It's sunny!")
            .await
            .expect("teach");
        store
            .teach("what is the weather", "Cloudy.")
            .await
            .expect("teach again");

        let reloaded = store.snapshot().await.expect("reload");
        let record = reloaded.lookup("what's the weather").expect("match");
        assert_eq!(record.responses, ["It's sunny!", "Cloudy."]);
    }

    #[tokio::test]
    async fn store_round_trips_existing_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.json");
        let original = book();
        let file = JsonFile::new(&path);
        file.save(&original).await.expect("save");

        let loaded: ResponseBook = file.load().await.expect("load");
        file.save(&loaded).await.expect("resave");
        assert_eq!(file.load().await.expect("reload"), original);
    }
}
