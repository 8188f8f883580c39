pub mod catalog_loader;
pub mod config;
pub mod errors;
pub mod jikan_client;
pub mod models;
pub mod page_fetcher;
pub mod pipeline;
pub mod promotion;
pub mod stats_loader;
pub mod warehouse;

#[cfg(test)]
pub(crate) mod test_support;
