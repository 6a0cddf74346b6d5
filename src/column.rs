// Columnar containers: typed vectors with a parallel missing mask.
//
// Missingness is carried next to the data, never encoded into it: missing
// slots hold the element type's zero and the mask is authoritative.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "snapshot")]
use serde::{Deserialize, Serialize};

use crate::core::buffer::BitVec;

/// The four candidate element types of the promotion ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub enum ElType {
    Int,
    Float,
    Bool,
    Str,
}

impl ElType {
    pub fn name(self) -> &'static str {
        match self {
            ElType::Int => "i64",
            ElType::Float => "f64",
            ElType::Bool => "bool",
            ElType::Str => "string",
        }
    }
}

/// A typed vector plus a missing mask of equal length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct TypedColumn<T> {
    values: Vec<T>,
    missing: BitVec,
}

impl<T> TypedColumn<T> {
    pub fn new(values: Vec<T>, missing: BitVec) -> Self {
        debug_assert_eq!(values.len(), missing.len());
        TypedColumn { values, missing }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `None` when the slot is missing.
    pub fn get(&self, index: usize) -> Option<&T> {
        if self.missing.get(index) {
            None
        } else {
            Some(&self.values[index])
        }
    }

    /// Raw values, missing slots holding the type's zero.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn missing(&self) -> &BitVec {
        &self.missing
    }
}

/// Dictionary-encoded string column: `codes[i]` indexes into `levels`.
/// Missing slots carry code 0 and are masked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct FactorColumn {
    levels: Vec<String>,
    codes: Vec<u32>,
    missing: BitVec,
}

impl FactorColumn {
    /// Pool a string column; levels keep first-appearance order.
    pub fn from_strings(values: Vec<String>, missing: BitVec) -> Self {
        let mut levels: Vec<String> = Vec::new();
        let mut lookup: HashMap<String, u32> = HashMap::new();
        let mut codes = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            if missing.get(index) {
                codes.push(0);
                continue;
            }
            let next = levels.len() as u32;
            let code = match lookup.entry(value) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    levels.push(entry.key().clone());
                    entry.insert(next);
                    next
                }
            };
            codes.push(code);
        }
        FactorColumn {
            levels,
            codes,
            missing,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    pub fn missing(&self) -> &BitVec {
        &self.missing
    }

    /// `None` when the slot is missing.
    pub fn get(&self, index: usize) -> Option<&str> {
        if self.missing.get(index) {
            None
        } else {
            Some(&self.levels[self.codes[index] as usize])
        }
    }
}

/// One materialized column of a table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub enum Column {
    Int(TypedColumn<i64>),
    Float(TypedColumn<f64>),
    Bool(TypedColumn<bool>),
    Str(TypedColumn<String>),
    Factor(FactorColumn),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(col) => col.len(),
            Column::Float(col) => col.len(),
            Column::Bool(col) => col.len(),
            Column::Str(col) => col.len(),
            Column::Factor(col) => col.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type; a factor column reports `Str`.
    pub fn eltype(&self) -> ElType {
        match self {
            Column::Int(_) => ElType::Int,
            Column::Float(_) => ElType::Float,
            Column::Bool(_) => ElType::Bool,
            Column::Str(_) | Column::Factor(_) => ElType::Str,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Int(_) | Column::Float(_))
    }

    pub fn is_missing(&self, index: usize) -> bool {
        match self {
            Column::Int(col) => col.missing().get(index),
            Column::Float(col) => col.missing().get(index),
            Column::Bool(col) => col.missing().get(index),
            Column::Str(col) => col.missing().get(index),
            Column::Factor(col) => col.missing().get(index),
        }
    }

    /// Number of missing slots.
    pub fn missing_count(&self) -> usize {
        match self {
            Column::Int(col) => col.missing().count_ones(),
            Column::Float(col) => col.missing().count_ones(),
            Column::Bool(col) => col.missing().count_ones(),
            Column::Str(col) => col.missing().count_ones(),
            Column::Factor(col) => col.missing().count_ones(),
        }
    }

    /// Render one cell as text; `None` when missing. Floats keep a decimal
    /// point or exponent so they round-trip as floats.
    pub fn format(&self, index: usize) -> Option<String> {
        match self {
            Column::Int(col) => col.get(index).map(i64::to_string),
            Column::Float(col) => col.get(index).map(|value| format!("{value:?}")),
            Column::Bool(col) => col.get(index).map(bool::to_string),
            Column::Str(col) => col.get(index).cloned(),
            Column::Factor(col) => col.get(index).map(str::to_string),
        }
    }
}

/// Normalize a header cell into an identifier-shaped column name: ASCII
/// alphanumerics and underscores survive, other character runs collapse to
/// a single underscore, and a leading digit gets an `x` prefix. Empty input
/// becomes `x`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if gap && !out.is_empty() {
                out.push('_');
            }
            gap = false;
            out.push(ch);
        } else {
            gap = true;
        }
    }
    if out.is_empty() {
        return "x".to_string();
    }
    if out.as_bytes()[0].is_ascii_digit() {
        out.insert(0, 'x');
    }
    out
}

/// Disambiguate duplicate names in place by appending `_1`, `_2`, ...
pub fn make_unique(names: &mut [String]) {
    let mut seen: HashSet<String> = HashSet::new();
    for name in names.iter_mut() {
        if seen.insert(name.clone()) {
            continue;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{name}_{suffix}");
            if !seen.contains(&candidate) {
                seen.insert(candidate.clone());
                *name = candidate;
                break;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &[bool]) -> BitVec {
        let mut out = BitVec::new();
        for &bit in bits {
            out.push(bit);
        }
        out
    }

    #[test]
    fn test_typed_column_get_respects_mask() {
        let col = TypedColumn::new(vec![1i64, 0, 3], mask(&[false, true, false]));
        assert_eq!(col.get(0), Some(&1));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(2), Some(&3));
    }

    #[test]
    fn test_factor_pools_levels_in_first_appearance_order() {
        let values = ["b", "a", "b", "c", "a"].map(String::from).to_vec();
        let col = FactorColumn::from_strings(values, mask(&[false; 5]));
        assert_eq!(col.levels(), &["b", "a", "c"]);
        assert_eq!(col.codes(), &[0, 1, 0, 2, 1]);
        assert_eq!(col.get(3), Some("c"));
    }

    #[test]
    fn test_factor_missing_slots() {
        let values = ["x", "", "x"].map(String::from).to_vec();
        let col = FactorColumn::from_strings(values, mask(&[false, true, false]));
        assert_eq!(col.levels(), &["x"]);
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(2), Some("x"));
    }

    #[test]
    fn test_column_missing_count() {
        let col = Column::Int(TypedColumn::new(
            vec![1, 0, 3, 0],
            mask(&[false, true, false, true]),
        ));
        assert_eq!(col.missing_count(), 2);
        assert_eq!(
            Column::Bool(TypedColumn::new(vec![true], mask(&[false]))).missing_count(),
            0
        );
    }

    #[test]
    fn test_column_format() {
        let ints = Column::Int(TypedColumn::new(vec![7, 0], mask(&[false, true])));
        assert_eq!(ints.format(0), Some("7".to_string()));
        assert_eq!(ints.format(1), None);

        let floats = Column::Float(TypedColumn::new(vec![4.0, 2.5], mask(&[false, false])));
        assert_eq!(floats.format(0), Some("4.0".to_string()));
        assert_eq!(floats.format(1), Some("2.5".to_string()));

        let bools = Column::Bool(TypedColumn::new(vec![true], mask(&[false])));
        assert_eq!(bools.format(0), Some("true".to_string()));
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("plain"), "plain");
        assert_eq!(sanitize_identifier("a b"), "a_b");
        assert_eq!(sanitize_identifier("x.y.z"), "x_y_z");
        assert_eq!(sanitize_identifier("  padded  "), "padded");
        assert_eq!(sanitize_identifier("2nd"), "x2nd");
        assert_eq!(sanitize_identifier(""), "x");
        assert_eq!(sanitize_identifier("!!"), "x");
    }

    #[test]
    fn test_make_unique() {
        let mut names = ["a", "b", "a", "a"].map(String::from).to_vec();
        make_unique(&mut names);
        assert_eq!(names, vec!["a", "b", "a_1", "a_2"]);
    }
}
