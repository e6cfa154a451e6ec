pub mod error;
pub mod exporter;
pub mod importer;
pub mod report;
pub mod transform;
