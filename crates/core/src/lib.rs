//! Domain logic for boss/secretary call screening.
//!
//! Everything in this crate is synchronous and free of I/O: rule validation,
//! whitelist parsing, the dialplan instruction model, the rule compiler and
//! the backup snapshot format. The `bosssec-db` and `bosssec-api` crates
//! layer persistence and HTTP on top.

pub mod backup;
pub mod compiler;
pub mod dialplan;
pub mod error;
pub mod rule;
pub mod types;
pub mod whitelist;
