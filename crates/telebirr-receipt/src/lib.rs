//! telebirr-receipt — fetch a telebirr payment receipt page, extract its
//! fields, and verify them against expected values.

pub mod extract;
pub mod fetch;
pub mod labels;
pub mod types;
pub mod verify;

pub use extract::parse_from_html;
pub use fetch::{FetchConfig, ReceiptFetcher, ReceiptSource, DEFAULT_BASE_URL};
pub use labels::{LabelEntry, LABEL_TABLE};
pub use types::*;
pub use verify::{equals, Mismatch, Verifier};
