//! # PDF Search Client
//!
//! A thin client for a PDF document-search service. The service does all of
//! the real work (text extraction, indexing, ranking); this crate uploads
//! PDFs, triggers demo loading, runs queries and renders what comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌──────────────┐
//! │ CLI/shell│──▶│ Controller │──▶│  Backend  │──▶│ search server│
//! │  (pdfs)  │   │  handlers  │   │ GET/POST  │   │  (external)  │
//! └──────────┘   └─────┬──────┘   └───────────┘   └──────────────┘
//!                      ▼
//!                ┌────────────┐
//!                │ ViewModel  │ status · results · upload log
//!                └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfs load-demo --max-pages 5
//! pdfs upload paper.pdf notes.pdf
//! pdfs search "transformer attention" -k 5
//! pdfs shell
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Request error type |
//! | [`api`] | HTTP request helper and backend trait |
//! | [`models`] | Backend response types |
//! | [`render`] | HTML escaping and results rendering |
//! | [`view`] | View-model |
//! | [`controller`] | Action handlers |
//! | [`shell`] | Interactive session |

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod shell;
pub mod view;

#[cfg(test)]
mod testing;
