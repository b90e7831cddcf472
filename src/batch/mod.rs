//! Request batching: splitting an item sequence into provider-sized requests.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`chunk`] | Fixed-size chunking honoring a provider's max items per call |
//! | [`Batches`] | Result of [`chunk`]: a single unwrapped batch or a sequence of batches |
//! | [`RowPacker`] | Length-budgeted packing of rows driven by a [`LengthPolicy`] |
//!
//! ## Example
//!
//! ```rust
//! use custom_engine::batch::{chunk, Batches};
//!
//! let items = vec!["a", "b", "c", "d", "e"];
//! match chunk(items, 2).unwrap() {
//!     Batches::Many(batches) => assert_eq!(batches.len(), 3),
//!     Batches::Single(_) => unreachable!(),
//! }
//! ```

mod chunker;
mod packer;

pub use chunker::{chunk, Batches};
pub use packer::{CharLengthPolicy, ItemCountPolicy, LengthPolicy, RowPacker};
