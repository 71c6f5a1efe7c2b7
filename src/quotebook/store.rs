//! File-backed quotebook.

use std::path::PathBuf;

use log::info;

use crate::{
    error::{BotError, Result},
    store::JsonFile,
};

use super::book::QuoteBook;

#[derive(Debug)]
pub struct QuoteStore {
    file: JsonFile<QuoteBook>,
}

impl QuoteStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Current contents; a quotebook that was never written is empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreParse` or `Io` if the file cannot be read.
    pub async fn snapshot(&self) -> Result<QuoteBook> {
        self.file.load_or_default().await
    }

    /// Add and persist a quote, returning the author name it was filed under.
    ///
    /// # Errors
    ///
    /// Returns `EmptyArgument` for a blank author or quote, and `StoreParse`
    /// or `Io` if the file cannot be updated.
    pub async fn add(&self, author: &str, quote: &str) -> Result<String> {
        let author = author.trim();
        let quote = quote.trim();
        if author.is_empty() {
            return Err(BotError::EmptyArgument("author name"));
        }
        if quote.is_empty() {
            return Err(BotError::EmptyArgument("quote"));
        }

        let filed_under = self
            .file
            .update(|book| book.add_quote(author, quote))
            .await?;
        info!("Added quote for '{filed_under}'");
        Ok(filed_under)
    }
}
