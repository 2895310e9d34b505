//! HTTP request handlers

pub mod error;
pub mod health;
pub mod sessions;
pub mod design;
pub mod gallery;
pub mod generate;
