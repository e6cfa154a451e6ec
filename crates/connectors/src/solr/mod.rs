pub mod classify;
pub mod client;
pub mod response;
pub mod settings;
