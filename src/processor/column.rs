use crate::config::FillDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

impl ColumnType {
    /// Infers a column type from its non-empty cells.
    ///
    /// A column with no non-empty cells is treated as numeric, so that a
    /// fully blank column fills with the numeric default.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut kind = ColumnType::Int64;
        for cell in cells.into_iter().filter(|c| !c.is_empty()) {
            let bytes = cell.as_bytes();
            if atoi_simd::parse::<i64>(bytes).is_ok() {
                continue;
            }
            if fast_float::parse::<f64, _>(bytes).is_ok() {
                kind = ColumnType::Float64;
            } else {
                return ColumnType::Str;
            }
        }
        kind
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnType::Str)
    }

    /// The text a missing cell of this type is replaced with
    pub fn fill_text(self, fill: &FillDefaults) -> String {
        if self.is_numeric() {
            format_number(fill.numeric)
        } else {
            fill.categorical.clone()
        }
    }
}

/// A column carried through the table without interpretation.
///
/// Cells are stored as text after filling; `kind` records what the
/// non-empty source cells looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnType,
    cells: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, cells: Vec<String>) -> Self {
        Column {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.iter().map(String::as_str)
    }

    /// Keeps only the given rows, in the given order
    pub fn take(&self, rows: &[usize]) -> Self {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            cells: rows.iter().map(|&i| self.cells[i].clone()).collect(),
        }
    }
}

/// Converts a float holding a whole number to `i64`. Fractions, non-finite
/// values and magnitudes outside the `i64` range give `None`.
pub fn integral_to_i64(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Renders a float the way it would appear in a CSV cell: integral
/// values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
