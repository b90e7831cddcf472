//! Fixed-size chunker.

use crate::{Error, ErrorContext, Result};

/// Output of [`chunk`].
///
/// A lone chunk comes back unwrapped as `Single`; callers that don't care
/// about the distinction can normalise with [`Batches::into_batches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batches<T> {
    Single(Vec<T>),
    Many(Vec<Vec<T>>),
}

impl<T> Batches<T> {
    pub fn into_batches(self) -> Vec<Vec<T>> {
        match self {
            Batches::Single(batch) => vec![batch],
            Batches::Many(batches) => batches,
        }
    }

    /// Number of batches, treating `Single` as one.
    pub fn len(&self) -> usize {
        match self {
            Batches::Single(_) => 1,
            Batches::Many(batches) => batches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `items` into ordered chunks of at most `n` items.
///
/// Produces `ceil(len / n)` chunks whose concatenation equals the input.
/// Empty input yields `Batches::Many(vec![])`.
pub fn chunk<T>(items: Vec<T>, n: usize) -> Result<Batches<T>> {
    if n == 0 {
        return Err(Error::validation_with_context(
            "chunk size must be at least 1",
            ErrorContext::new()
                .with_field_path("max_batch_size")
                .with_source("batcher"),
        ));
    }

    let mut batches: Vec<Vec<T>> = Vec::with_capacity(items.len().div_ceil(n));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(n).collect());
    }

    if batches.len() == 1 {
        Ok(Batches::Single(batches.remove(0)))
    } else {
        Ok(Batches::Many(batches))
    }
}
