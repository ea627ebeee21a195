//! AfroKen citizen assistant client core.
//!
//! - [`chat`]: question resolution with remote-then-mock fallback, and the
//!   per-conversation [`chat::ChatSession`].
//! - [`metrics`]: dashboard aggregation over the county dataset, plus CSV export.
//! - [`admin`]: pass-through calls to the admin portal endpoints.
//! - [`feedback`]: fire-and-forget answer ratings.

pub mod admin;
pub mod catalogue;
pub mod chat;
pub mod config;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod types;

#[cfg(test)]
mod test_support;
