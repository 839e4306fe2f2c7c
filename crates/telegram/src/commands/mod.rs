//! Command and message endpoints for the dispatcher
//!
//! - `basic`: start and help
//! - `search`: group searches and channel indexing
//! - `admin`: stats, index and broadcast

mod admin;
mod basic;
mod search;

pub use admin::*;
pub use basic::*;
pub use search::*;
