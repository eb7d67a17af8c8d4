//! Application Services
//!
//! - `SearchController`: single-flight guard; a repeated start cancels
//! - `SearchService`: runs a search against a batch or streaming source

mod controller;
mod search;

pub use controller::{SearchController, SearchRequest, SearchTicket};
pub use search::SearchService;
