pub mod error;
pub mod file;
pub mod search;
pub mod solr;
