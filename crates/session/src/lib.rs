//! Ephemeral navigation state for inline keyboards
//!
//! Callback data is limited to 64 bytes, far too small for a result list.
//! This crate keeps the real state server-side behind short opaque tokens
//! and pages result lists into token-bearing views.

mod cache;
pub mod pager;
mod token;

pub use cache::{FileSelection, PageView, SeasonGroup, SessionCache, SessionPayload, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use pager::{paginate, render_page, total_pages, PageItem, RenderedPage};
pub use token::generate_session_token;
