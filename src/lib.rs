//! Web front end for uploading bank statements as CSV or PDF.
//!
//! CSV uploads are previewed directly. PDF uploads are converted with
//! `statement_to_csv` inside a per-request scratch directory and the result
//! is previewed as a table, or shown as raw OCR text when it is not one.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod upload;
pub mod view;
