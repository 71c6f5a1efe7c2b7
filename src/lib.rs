pub mod bot;
pub mod config;
pub mod error;
pub mod interaction;
pub mod matcher;
pub mod quotebook;
pub mod responses;
pub mod store;

pub use bot::run;
