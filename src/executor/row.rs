//! Row type - an ordered tuple of datums
//!
//! Entity rows hold property values in catalog order; result rows hold
//! output values aligned with the plan's projection list.

use std::hash::{Hash, Hasher};

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};

/// A row of datums
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<Datum>,
}

/// A row produced by a plan, aligned 1:1 with its projection list
pub type ResultRow = Row;

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Datum>) -> Self {
        Row { values }
    }

    /// Number of columns in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a datum by index
    pub fn get(&self, index: usize) -> ExecutorResult<&Datum> {
        self.values
            .get(index)
            .ok_or(ExecutorError::ColumnIndexOutOfBounds {
                index,
                row_len: self.values.len(),
            })
    }

    /// Get all values as a slice
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// Drop every column from `width` on
    pub fn truncate(&mut self, width: usize) {
        self.values.truncate(width);
    }

    /// Iterate over the values in column order
    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        self.values.iter()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for datum in &self.values {
            datum.hash(state);
        }
    }
}

impl From<Vec<Datum>> for Row {
    fn from(values: Vec<Datum>) -> Self {
        Row { values }
    }
}

impl IntoIterator for Row {
    type Item = Datum;
    type IntoIter = std::vec::IntoIter<Datum>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Datum;
    type IntoIter = std::slice::Iter<'a, Datum>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get() {
        let row = Row::new(vec![Datum::Int(42)]);
        assert!(matches!(row.get(0), Ok(Datum::Int(42))));
        assert!(matches!(
            row.get(1),
            Err(ExecutorError::ColumnIndexOutOfBounds { index: 1, row_len: 1 })
        ));
    }

    #[test]
    fn test_row_truncate() {
        let mut row = Row::new(vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
        row.truncate(2);
        assert_eq!(row.values(), &[Datum::Int(1), Datum::Int(2)]);
        row.truncate(5);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_row_hash_eq() {
        use std::collections::HashSet;

        let r1 = Row::new(vec![Datum::Int(1), Datum::from("a")]);
        let r2 = Row::new(vec![Datum::Int(1), Datum::from("a")]);
        let r3 = Row::new(vec![Datum::Int(1), Datum::Null]);

        let mut set = HashSet::new();
        set.insert(r1);
        assert!(set.contains(&r2));
        assert!(!set.contains(&r3));
    }
}
