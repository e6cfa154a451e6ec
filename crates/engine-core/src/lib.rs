pub mod error;
pub mod iterator;
pub mod paging;
pub mod progress;
