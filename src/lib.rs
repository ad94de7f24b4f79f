//! # arxiv-digest
//!
//! Daily arXiv digest ranked against a Zotero library. The library's
//! abstracts are embedded with a sentence-embedding model, a one-class SVM
//! learns the region they occupy, and the day's new papers are scored by
//! their signed distance from that region.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod digest;
pub mod models;
pub mod ranking;
pub mod runtime;
pub mod sources;
pub mod ui;
