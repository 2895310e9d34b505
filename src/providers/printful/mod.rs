//! Printful Provider Module
//!
//! Template lookup against the Printful catalog: product details, variants and
//! per-variant print areas.
//!
//! API Documentation: https://developers.printful.com/docs/

mod client;
mod models;
mod mapper;

pub use client::{PrintfulCatalog, PRINTFUL_CODE};
