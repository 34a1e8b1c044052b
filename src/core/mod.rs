//! Core domain: configuration, errors, data models, matching, and the
//! per-row harvest pipeline.

pub mod config;
pub mod error;
pub mod harvester;
pub mod matching;
pub mod models;
