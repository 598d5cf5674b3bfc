//! Command-line front end for telebirr-receipt.

pub mod commands;
pub mod config;

pub use commands::{load_expected, load_fields, run_verify, FetchOptions, Input, VerifyReport};
pub use config::{resolve_base_url, resolve_insecure};
