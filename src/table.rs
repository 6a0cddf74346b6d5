// The columnar table returned by a parse: names plus equal-length columns.

#[cfg(feature = "snapshot")]
use serde::{Deserialize, Serialize};

use crate::column::Column;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        debug_assert!(columns.windows(2).all(|pair| pair[0].len() == pair[1].len()));
        Table { names, columns }
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| &self.columns[index])
    }
}
