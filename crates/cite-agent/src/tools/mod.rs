//! A set of built-in tools that models can use.

mod fetch_page;
mod search_handbook;
mod web_search;

pub use fetch_page::FetchPageTool;
pub use search_handbook::SearchHandbookTool;
pub use web_search::WebSearchTool;
