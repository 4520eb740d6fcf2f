//! Core types and view logic for the Dossier extraction browser.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! view functions (search, facets, filters, reuse aggregation) are pure and
//! synchronous; they never fail and never mutate their input.

pub mod available;
pub mod cases;
pub mod contact;
pub mod credential;
pub mod dedup;
pub mod error;
pub mod export;
pub mod facets;
pub mod filter;
pub mod raw;
pub mod resolve;
pub mod reuse;
pub mod search;
pub mod selection;
pub mod store;
pub mod suspect;
pub mod text;
pub mod view;
pub mod whatsapp;

pub use error::{Error, Result};
