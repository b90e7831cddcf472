//! Core data types exchanged with the host.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TranslationUnit`] | Source rows and their translations for one request |

pub mod unit;

pub use unit::TranslationUnit;
