//! Minimal edit scripts between two sets.

use std::cmp::Ordering;

/// Changes that turn one set into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<T> {
    /// Entries only in the desired set.
    pub add: Vec<T>,
    /// Entries only in the current set.
    pub delete: Vec<T>,
}

impl<T> Default for Delta<T> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            delete: Vec::new(),
        }
    }
}

impl<T> Delta<T> {
    /// Check if there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.add.len() + self.delete.len()
    }

    /// Drop entries from the delete side that must never be removed.
    pub fn retain_deletes(&mut self, keep: impl FnMut(&T) -> bool) {
        self.delete.retain(keep);
    }
}

/// Merge two sequences already sorted by `cmp`.
///
/// Entries equal under `cmp` on both sides are left alone; the rest become
/// deletes (current side) or adds (desired side), each in sorted order.
pub fn merge<T: Clone>(
    current: &[T],
    desired: &[T],
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Delta<T> {
    let mut delta = Delta {
        add: Vec::with_capacity(desired.len()),
        delete: Vec::with_capacity(current.len()),
    };

    let (mut i, mut j) = (0, 0);
    while i < current.len() && j < desired.len() {
        match cmp(&current[i], &desired[j]) {
            Ordering::Less => {
                delta.delete.push(current[i].clone());
                i += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Greater => {
                delta.add.push(desired[j].clone());
                j += 1;
            }
        }
    }
    delta.delete.extend_from_slice(&current[i..]);
    delta.add.extend_from_slice(&desired[j..]);
    delta
}
