//! Length-budgeted row packer.

use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Decides how rows count against a request's length budget.
///
/// The two hooks are the conditions a row-by-row host uses when grouping rows
/// into requests: whether a single row is too long on its own, and the
/// running length of a request once a row is appended.
pub trait LengthPolicy: Send + Sync {
    /// `true` when `row` alone does not fit into `max_length`.
    fn exceeds(&self, row: &str, max_length: usize) -> bool;

    /// Accumulated length of `batch` after appending `row`.
    fn accumulate(&self, batch: &[String], current: usize, row: &str) -> usize;
}

/// Budget measured in characters; oversized rows are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharLengthPolicy;

impl LengthPolicy for CharLengthPolicy {
    fn exceeds(&self, row: &str, max_length: usize) -> bool {
        row.chars().count() > max_length
    }

    fn accumulate(&self, _batch: &[String], current: usize, row: &str) -> usize {
        current + row.chars().count()
    }
}

/// Budget measured in rows; no row is ever too long.
///
/// With this policy `max_length` is effectively a max-items-per-request limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemCountPolicy;

impl LengthPolicy for ItemCountPolicy {
    fn exceeds(&self, _row: &str, _max_length: usize) -> bool {
        false
    }

    fn accumulate(&self, batch: &[String], _current: usize, _row: &str) -> usize {
        batch.len() + 1
    }
}

/// Groups rows into requests without exceeding a length budget.
#[derive(Clone)]
pub struct RowPacker {
    max_length: usize,
    policy: Arc<dyn LengthPolicy>,
}

impl std::fmt::Debug for RowPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowPacker")
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}

impl RowPacker {
    pub fn new(max_length: usize, policy: Arc<dyn LengthPolicy>) -> Self {
        Self {
            max_length: max_length.max(1),
            policy,
        }
    }

    /// Packer counting characters, the host's native grouping.
    pub fn by_chars(max_length: usize) -> Self {
        Self::new(max_length, Arc::new(CharLengthPolicy))
    }

    /// Packer counting rows.
    pub fn by_items(max_items: usize) -> Self {
        Self::new(max_items, Arc::new(ItemCountPolicy))
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn pack(&self, rows: Vec<String>) -> Result<Vec<Vec<String>>> {
        let mut batches = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for (index, row) in rows.into_iter().enumerate() {
            if self.policy.exceeds(&row, self.max_length) {
                return Err(Error::validation_with_context(
                    "row is longer than the request length budget",
                    ErrorContext::new()
                        .with_field_path(format!("rows[{}]", index))
                        .with_details(format!("max_length = {}", self.max_length))
                        .with_source("row_packer"),
                ));
            }

            let next_len = self.policy.accumulate(&current, current_len, &row);
            if next_len > self.max_length && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_len = self.policy.accumulate(&current, 0, &row);
            } else {
                current_len = next_len;
            }
            current.push(row);
        }

        if !current.is_empty() {
            batches.push(current);
        }
        Ok(batches)
    }
}
