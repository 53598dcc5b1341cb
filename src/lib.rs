pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod output;
pub mod schema;
pub mod table;
pub mod transform;
pub mod writer;
