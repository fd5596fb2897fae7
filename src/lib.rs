pub mod api;
pub mod config;
pub mod db;
pub mod fridges;
pub mod history;
pub mod ingest;
pub mod notifier;
pub mod validation;

#[cfg(test)]
mod test_support;
