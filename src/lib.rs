pub mod batch;
pub mod config;
pub mod dhis2;
pub mod domain;
pub mod error;
pub mod metadata;
pub mod output;
pub mod query;
pub mod store;
