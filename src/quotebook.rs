//! Quotes attributed to named authors.

mod book;
mod commands;
mod store;

pub use book::{Quote, QuoteBook, QuoteRecord};
pub use commands::quotebook_commands;
pub use store::QuoteStore;
