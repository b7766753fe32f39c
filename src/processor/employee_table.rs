use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use std::{borrow::Cow, fs::File, io::Read, path::Path, str};
use tracing::{debug, info, warn};

use crate::{
    config::FillDefaults,
    processor::{
        FilledCell, FilterPredicate, ParseSummary, ProcessorError,
        column::{Column, ColumnType, integral_to_i64},
        employee::{
            EmployeeField, EmployeeFields, EmployeeRecord, PROMOTION_COLUMN, RETRENCHMENT_COLUMN,
        },
        filter_options::{FilterSelection, NumericRange},
    },
};

/// Bodies smaller than this are parsed on the calling thread
const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Cell markers read as missing, on top of the empty cell. Same set as the
/// pandas `read_csv` defaults.
const MISSING_MARKERS: [&[u8]; 18] = [
    b"#N/A",
    b"#N/A N/A",
    b"#NA",
    b"-1.#IND",
    b"-1.#QNAN",
    b"-NaN",
    b"-nan",
    b"1.#IND",
    b"1.#QNAN",
    b"<NA>",
    b"N/A",
    b"NA",
    b"NULL",
    b"NaN",
    b"None",
    b"n/a",
    b"nan",
    b"null",
];

/// Where a source column ends up in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Field(EmployeeField),
    Extra(usize),
}

/// Header positions resolved once per load.
///
/// Source columns named like a derived column are dropped; they are
/// recomputed from the required columns.
#[derive(Debug)]
struct Layout {
    headers: Vec<String>,
    slots: Vec<Slot>,
    field_pos: [usize; EmployeeField::ALL.len()],
    extra_pos: Vec<usize>,
    width: usize,
}

impl Layout {
    fn resolve(headers: &[String]) -> Result<Self, ProcessorError> {
        let mut kept = Vec::with_capacity(headers.len());
        let mut slots = Vec::with_capacity(headers.len());
        let mut field_pos = [usize::MAX; EmployeeField::ALL.len()];
        let mut extra_pos = Vec::new();

        for (col_idx, header) in headers.iter().enumerate() {
            if header == PROMOTION_COLUMN || header == RETRENCHMENT_COLUMN {
                continue;
            }
            kept.push(header.clone());
            match EmployeeField::from_header(header) {
                Some(field) if field_pos[field.index()] != usize::MAX => {
                    return Err(ProcessorError::DataFormat(format!(
                        "duplicate column: {}",
                        header
                    )));
                }
                Some(field) => {
                    field_pos[field.index()] = col_idx;
                    slots.push(Slot::Field(field));
                }
                None => {
                    slots.push(Slot::Extra(extra_pos.len()));
                    extra_pos.push(col_idx);
                }
            }
        }

        let missing: Vec<&str> = EmployeeField::ALL
            .iter()
            .filter(|f| field_pos[f.index()] == usize::MAX)
            .map(|f| f.name())
            .collect();
        if !missing.is_empty() {
            return Err(ProcessorError::DataFormat(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Layout {
            headers: kept,
            slots,
            field_pos,
            extra_pos,
            width: headers.len(),
        })
    }
}

/// Rows parsed from one chunk of the body
#[derive(Debug, Default)]
struct BatchResult {
    records: Vec<EmployeeRecord>,
    lines: Vec<usize>,
    extras: Vec<Vec<String>>,
    filled: Vec<FilledCell>,
}

/// In-memory employee table with derived attributes.
///
/// Built once from a CSV source and read-only afterwards. Required columns
/// are held as typed [`EmployeeRecord`]s; any other column is carried
/// along as text so exports reproduce the source layout.
///
/// # Examples
///
/// ```no_run
/// use hr_dashboard::{EmployeeTable, FillDefaults};
///
/// let table = EmployeeTable::load_csv("data/hr_data.csv", &FillDefaults::default())?;
/// println!("{} employees", table.row_count());
/// # Ok::<(), hr_dashboard::ProcessorError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeTable {
    headers: Vec<String>,
    slots: Vec<Slot>,
    records: Vec<EmployeeRecord>,
    extras: Vec<Column>,
    summary: ParseSummary,
}

impl EmployeeTable {
    /// Loads a CSV file using memory mapping
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - File cannot be opened or mapped
    /// - A required column is absent, or a row does not match the header
    /// - A numeric column holds a value that is not a number
    pub fn load_csv(path: impl AsRef<Path>, fill: &FillDefaults) -> Result<Self, ProcessorError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(ProcessorError::DataFormat("missing header line".into()));
        }
        // SAFETY: the map only lives for the duration of the parse; every
        // value is copied out before it is dropped.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), bytes = mmap.len(), "mapped csv file");
        Self::from_bytes(&mmap[..], fill)
    }

    pub fn from_reader<R: Read>(mut reader: R, fill: &FillDefaults) -> Result<Self, ProcessorError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_bytes(&buf, fill)
    }

    /// Parses comma-delimited text with a header row
    pub fn from_bytes(buf: &[u8], fill: &FillDefaults) -> Result<Self, ProcessorError> {
        let int_fill = fill.integer()?;
        let buf = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(buf);
        if buf.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ProcessorError::DataFormat("missing header line".into()));
        }

        // Parse header
        let header_end = memchr(b'\n', buf).unwrap_or(buf.len());
        let header_line = trim_cr(&buf[..header_end]);
        let headers = split_fields(header_line)
            .map_err(|e| ProcessorError::DataFormat(format!("line 1: {}", e)))?
            .iter()
            .map(|f| str::from_utf8(f).map(str::to_string))
            .collect::<Result<Vec<String>, _>>()?;
        let layout = Layout::resolve(&headers)?;

        let data = &buf[(header_end + 1).min(buf.len())..];

        let chunks = if data.len() < PARALLEL_THRESHOLD {
            vec![(0, data.len())]
        } else {
            Self::find_chunk_boundaries(data, rayon::current_num_threads())
        };
        debug!(chunks = chunks.len(), bytes = data.len(), "parsing csv body");

        // First source line of each chunk; the header is line 1
        let newlines: Vec<usize> = chunks
            .par_iter()
            .map(|&(start, end)| memchr_iter(b'\n', &data[start..end]).count())
            .collect();
        let mut first_lines = Vec::with_capacity(chunks.len());
        let mut next_line = 2;
        for count in newlines {
            first_lines.push(next_line);
            next_line += count;
        }

        let batch_results: Vec<Result<BatchResult, ProcessorError>> = chunks
            .par_iter()
            .zip(first_lines.par_iter())
            .map(|(&(start, end), &first_line)| {
                Self::parse_chunk(&data[start..end], &layout, fill, int_fill, first_line)
            })
            .collect();

        // Merge in file order so row order and the reported error are stable
        let mut records = Vec::new();
        let mut lines = Vec::new();
        let mut raw_extras: Vec<Vec<String>> = vec![Vec::new(); layout.extra_pos.len()];
        let mut filled = Vec::new();
        for batch in batch_results {
            let batch = batch?;
            records.extend(batch.records);
            lines.extend(batch.lines);
            filled.extend(batch.filled);
            for (col, cells) in raw_extras.iter_mut().zip(batch.extras) {
                col.extend(cells);
            }
        }

        let extras: Vec<Column> = raw_extras
            .into_iter()
            .zip(&layout.extra_pos)
            .map(|(cells, &col_idx)| {
                Self::fill_extra_column(&headers[col_idx], cells, &lines, fill, &mut filled)
            })
            .collect();
        filled.sort_by_key(|cell| cell.line);

        if !filled.is_empty() {
            warn!(cells = filled.len(), "filled missing cells with defaults");
        }
        info!(rows = records.len(), columns = layout.headers.len(), "employee table loaded");

        Ok(EmployeeTable {
            summary: ParseSummary {
                rows_processed: records.len(),
                filled,
            },
            headers: layout.headers,
            slots: layout.slots,
            records,
            extras,
        })
    }

    fn find_chunk_boundaries(data: &[u8], num_chunks: usize) -> Vec<(usize, usize)> {
        if data.is_empty() {
            return vec![];
        }

        let num_chunks = num_chunks.max(1);
        let chunk_size = (data.len() / num_chunks).max(1);
        let mut boundaries = Vec::with_capacity(num_chunks);
        let mut start = 0;

        for i in 0..num_chunks - 1 {
            let mut end = ((i + 1) * chunk_size).max(start);

            // Find next newline
            match memchr(b'\n', &data[end.min(data.len())..]) {
                Some(offset) => end += offset + 1,
                None => end = data.len(),
            }

            if start < end {
                boundaries.push((start, end));
            }
            start = end;
            if start >= data.len() {
                break;
            }
        }

        // Last chunk gets everything remaining
        if start < data.len() {
            boundaries.push((start, data.len()));
        }

        boundaries
    }

    fn parse_chunk(
        chunk: &[u8],
        layout: &Layout,
        fill: &FillDefaults,
        int_fill: i64,
        first_line: usize,
    ) -> Result<BatchResult, ProcessorError> {
        let mut batch = BatchResult {
            extras: vec![Vec::new(); layout.extra_pos.len()],
            ..Default::default()
        };

        let mut line_no = first_line;
        let mut start = 0;
        let line_ends = memchr_iter(b'\n', chunk).chain(std::iter::once(chunk.len()));
        for end in line_ends {
            let line = trim_cr(&chunk[start..end]);
            let this_line = line_no;
            line_no += 1;
            start = end + 1;

            if line.is_empty() {
                continue;
            }

            let fields = split_fields(line)
                .map_err(|e| ProcessorError::DataFormat(format!("line {}: {}", this_line, e)))?;
            if fields.len() != layout.width {
                return Err(ProcessorError::DataFormat(format!(
                    "line {}: expected {} fields, got {}",
                    this_line,
                    layout.width,
                    fields.len()
                )));
            }

            let mut row = RowReader {
                fields: &fields,
                layout,
                fill,
                int_fill,
                line: this_line,
                filled: &mut batch.filled,
            };
            let record = EmployeeRecord::from(EmployeeFields {
                gender: row.text(EmployeeField::Gender)?,
                department: row.text(EmployeeField::Department)?,
                education_field: row.text(EmployeeField::EducationField)?,
                job_role: row.text(EmployeeField::JobRole)?,
                age: row.int(EmployeeField::Age)?,
                years_at_company: row.int(EmployeeField::YearsAtCompany)?,
                years_since_last_promotion: row.int(EmployeeField::YearsSinceLastPromotion)?,
                performance_rating: row.int(EmployeeField::PerformanceRating)?,
                years_in_current_role: row.int(EmployeeField::YearsInCurrentRole)?,
                over_time: row.text(EmployeeField::OverTime)?,
                monthly_income: row.float(EmployeeField::MonthlyIncome)?,
                percent_salary_hike: row.float(EmployeeField::PercentSalaryHike)?,
                total_working_years: row.float(EmployeeField::TotalWorkingYears)?,
                training_times_last_year: row.float(EmployeeField::TrainingTimesLastYear)?,
            });

            for (cells, &col_idx) in batch.extras.iter_mut().zip(&layout.extra_pos) {
                let raw = &fields[col_idx];
                if is_missing(raw) {
                    cells.push(String::new());
                } else {
                    cells.push(str::from_utf8(raw)?.to_string());
                }
            }

            batch.records.push(record);
            batch.lines.push(this_line);
        }

        Ok(batch)
    }

    /// Types an extra column from its present cells, then fills the gaps
    fn fill_extra_column(
        name: &str,
        mut cells: Vec<String>,
        lines: &[usize],
        fill: &FillDefaults,
        filled: &mut Vec<FilledCell>,
    ) -> Column {
        let kind = ColumnType::infer(cells.iter().map(String::as_str));
        let fill_text = kind.fill_text(fill);
        for (cell, &line) in cells.iter_mut().zip(lines) {
            if cell.is_empty() {
                cell.clone_from(&fill_text);
                filled.push(FilledCell {
                    line,
                    column: name.to_string(),
                    value: fill_text.clone(),
                });
            }
        }
        Column::new(name, kind, cells)
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source headers in file order, without the derived columns
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRecord> + '_ {
        self.records.iter()
    }

    pub fn extra_columns(&self) -> &[Column] {
        &self.extras
    }

    pub fn extra_column(&self, name: &str) -> Option<&Column> {
        self.extras.iter().find(|c| c.name() == name)
    }

    pub fn summary(&self) -> &ParseSummary {
        &self.summary
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Row indices matching a predicate, in ascending order
    pub fn filter(
        &self,
        field: EmployeeField,
        predicate: &FilterPredicate,
    ) -> Result<Vec<usize>, ProcessorError> {
        let rows = self.records.iter().enumerate();
        match (field.column_type(), predicate) {
            (ColumnType::Str, FilterPredicate::OneOf(values)) => Ok(rows
                .filter(|(_, r)| {
                    r.categorical(field)
                        .is_some_and(|v| values.iter().any(|want| want == v))
                })
                .map(|(i, _)| i)
                .collect()),

            (ColumnType::Int64, FilterPredicate::Between(lo, hi)) => {
                let range = NumericRange::new(*lo, *hi);
                Ok(rows
                    .filter(|(_, r)| r.integer(field).is_some_and(|v| range.contains(v)))
                    .map(|(i, _)| i)
                    .collect())
            }

            _ => Err(ProcessorError::UnsupportedPredicate(format!(
                "{:?} on column {}",
                predicate, field
            ))),
        }
    }

    /// New table holding the rows that match every constraint of the
    /// selection. Derived attributes are carried over as computed at load.
    pub fn restrict(&self, selection: &FilterSelection) -> Result<EmployeeTable, ProcessorError> {
        let mut filtered_rows: Option<Vec<usize>> = None;

        for (field, predicate) in selection.predicates() {
            let current = self.filter(field, &predicate)?;
            filtered_rows = Some(match filtered_rows {
                None => current,
                Some(existing) => intersect_sorted_vecs(existing, current),
            });
        }

        let table = match filtered_rows {
            None => self.clone(),
            Some(rows) => self.take(&rows),
        };
        debug!(
            rows = table.row_count(),
            source_rows = self.row_count(),
            "restricted employee table"
        );
        Ok(table)
    }

    fn take(&self, rows: &[usize]) -> EmployeeTable {
        EmployeeTable {
            headers: self.headers.clone(),
            slots: self.slots.clone(),
            records: rows.iter().map(|&i| self.records[i].clone()).collect(),
            extras: self.extras.iter().map(|c| c.take(rows)).collect(),
            summary: self.summary.clone(),
        }
    }
}

/// Reads typed cells from one split row, filling missing ones
struct RowReader<'a, 'b> {
    fields: &'a [Cow<'a, [u8]>],
    layout: &'a Layout,
    fill: &'a FillDefaults,
    int_fill: i64,
    line: usize,
    filled: &'b mut Vec<FilledCell>,
}

impl RowReader<'_, '_> {
    /// Returns `None` for a missing cell, after recording the fill
    fn raw(&mut self, field: EmployeeField, fill_text: impl FnOnce() -> String) -> Option<&[u8]> {
        let raw: &[u8] = &self.fields[self.layout.field_pos[field.index()]];
        if is_missing(raw) {
            self.filled.push(FilledCell {
                line: self.line,
                column: field.name().to_string(),
                value: fill_text(),
            });
            None
        } else {
            Some(raw)
        }
    }

    fn text(&mut self, field: EmployeeField) -> Result<String, ProcessorError> {
        let fill = self.fill;
        match self.raw(field, || ColumnType::Str.fill_text(fill)) {
            None => Ok(fill.categorical.clone()),
            Some(raw) => Ok(str::from_utf8(raw)?.to_string()),
        }
    }

    fn int(&mut self, field: EmployeeField) -> Result<i64, ProcessorError> {
        let line = self.line;
        let default = self.int_fill;
        match self.raw(field, || default.to_string()) {
            None => Ok(default),
            Some(raw) => {
                if let Ok(v) = atoi_simd::parse::<i64>(raw) {
                    return Ok(v);
                }
                // Integral floats such as "3.0" from a float-typed export
                fast_float::parse::<f64, _>(raw)
                    .ok()
                    .and_then(integral_to_i64)
                    .ok_or_else(|| invalid_value(line, field, raw))
            }
        }
    }

    fn float(&mut self, field: EmployeeField) -> Result<f64, ProcessorError> {
        let fill = self.fill;
        let line = self.line;
        match self.raw(field, || ColumnType::Float64.fill_text(fill)) {
            None => Ok(fill.numeric),
            Some(raw) => match fast_float::parse::<f64, _>(raw) {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(invalid_value(line, field, raw)),
            },
        }
    }
}

fn invalid_value(line: usize, field: EmployeeField, raw: &[u8]) -> ProcessorError {
    ProcessorError::DataFormat(format!(
        "line {}: column {} holds non-numeric value {:?}",
        line,
        field,
        String::from_utf8_lossy(raw)
    ))
}

fn is_missing(raw: &[u8]) -> bool {
    raw.is_empty() || MISSING_MARKERS.iter().any(|m| *m == raw)
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits one line on commas. Double-quoted fields may hold commas and
/// doubled quotes; quoted fields spanning lines are not supported.
fn split_fields(line: &[u8]) -> Result<Vec<Cow<'_, [u8]>>, &'static str> {
    let mut fields = Vec::new();

    // Fast path: nothing quoted
    if memchr(b'"', line).is_none() {
        let mut field_start = 0;
        for comma_pos in memchr_iter(b',', line) {
            fields.push(Cow::Borrowed(&line[field_start..comma_pos]));
            field_start = comma_pos + 1;
        }
        fields.push(Cow::Borrowed(&line[field_start..]));
        return Ok(fields);
    }

    let mut i = 0;
    loop {
        if line.get(i) == Some(&b'"') {
            let mut value = Vec::new();
            i += 1;
            loop {
                let Some(offset) = memchr(b'"', &line[i..]) else {
                    return Err("unterminated quoted field");
                };
                value.extend_from_slice(&line[i..i + offset]);
                i += offset + 1;
                if line.get(i) == Some(&b'"') {
                    value.push(b'"');
                    i += 1;
                } else {
                    break;
                }
            }
            fields.push(Cow::Owned(value));
            match line.get(i) {
                None => break,
                Some(b',') => i += 1,
                Some(_) => return Err("unexpected character after closing quote"),
            }
        } else {
            let end = memchr(b',', &line[i..]).map_or(line.len(), |p| i + p);
            fields.push(Cow::Borrowed(&line[i..end]));
            if end == line.len() {
                break;
            }
            i = end + 1;
        }
        if i == line.len() {
            // Trailing comma: one more empty field
            fields.push(Cow::Borrowed(&line[i..]));
            break;
        }
    }

    Ok(fields)
}

fn intersect_sorted_vecs(a: Vec<usize>, b: Vec<usize>) -> Vec<usize> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::processor::employee::Retrenchment;

    pub(crate) const HEADER: &str = "Age,Gender,Department,EducationField,JobRole,YearsAtCompany,\
YearsSinceLastPromotion,PerformanceRating,YearsInCurrentRole,OverTime,MonthlyIncome,\
PercentSalaryHike,TotalWorkingYears,TrainingTimesLastYear";

    /// One data line in [`HEADER`] order
    pub(crate) fn row(
        gender: &str,
        department: &str,
        years_since_promo: i64,
        rating: i64,
        years_in_role: i64,
        over_time: &str,
        income: f64,
    ) -> String {
        format!(
            "35,{gender},{department},Life Sciences,Sales Executive,8,{years_since_promo},{rating},{years_in_role},{over_time},{income},12,10,3"
        )
    }

    pub(crate) fn make_table(rows: &[String]) -> EmployeeTable {
        let mut csv = format!("{}\n", HEADER);
        for r in rows {
            csv.push_str(r);
            csv.push('\n');
        }
        EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap()
    }

    #[test]
    fn test_row_count() {
        let table = make_table(&[
            row("Male", "Sales", 1, 3, 2, "No", 5000.0),
            row("Female", "Sales", 6, 3, 2, "Yes", 6000.0),
        ]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.summary().rows_processed, 2);
        assert!(table.summary().filled.is_empty());
    }

    #[test]
    fn test_derived_columns() {
        let table = make_table(&[
            row("Male", "Sales", 6, 3, 12, "No", 5000.0),
            row("Male", "Sales", 4, 4, 4, "No", 5000.0),
            row("Male", "Sales", 0, 1, 4, "No", 5000.0),
        ]);
        let records = table.records();
        assert!(records[0].to_be_promoted());
        assert_eq!(records[0].to_be_retrenched(), Retrenchment::No);
        assert!(!records[1].to_be_promoted());
        assert_eq!(records[2].to_be_retrenched(), Retrenchment::Yes);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Age,Gender\n30,Male\n";
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        match err {
            ProcessorError::DataFormat(msg) => {
                assert!(msg.contains("YearsSinceLastPromotion"));
                assert!(msg.contains("PerformanceRating"));
                assert!(msg.contains("YearsInCurrentRole"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_format_error() {
        let err = EmployeeTable::from_bytes(b"", &FillDefaults::default()).unwrap_err();
        assert!(matches!(err, ProcessorError::DataFormat(_)));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = EmployeeTable::from_bytes(HEADER.as_bytes(), &FillDefaults::default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers().len(), 14);
    }

    #[test]
    fn test_field_count_mismatch_reports_line() {
        let csv = format!("{}\n{}\n1,2,3\n", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0));
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        match err {
            ProcessorError::DataFormat(msg) => assert!(msg.starts_with("line 3:"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let csv = format!("{}\n{}\n", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0))
            .replace(",12,10,3", ",twelve,10,3");
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        match err {
            ProcessorError::DataFormat(msg) => assert!(msg.contains("PercentSalaryHike"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_cells_are_filled_by_type() {
        let csv = format!(
            "{}\n35,,Sales,Medical,Manager,8,,3,NA,No,,12,10,3\n",
            HEADER
        );
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.gender, "Unknown");
        assert_eq!(record.years_since_last_promotion, 0);
        assert_eq!(record.years_in_current_role, 0);
        assert_eq!(record.monthly_income, 0.0);
        assert!(!record.to_be_promoted());

        let filled: Vec<&str> = table
            .summary()
            .filled
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        assert_eq!(
            filled,
            vec!["Gender", "YearsSinceLastPromotion", "YearsInCurrentRole", "MonthlyIncome"]
        );
        assert!(table.summary().filled.iter().all(|c| c.line == 2));
    }

    #[test]
    fn test_pandas_missing_markers_are_filled() {
        for marker in MISSING_MARKERS {
            let marker = str::from_utf8(marker).unwrap();
            let csv = format!(
                "{}\n35,{marker},Sales,Medical,Manager,8,{marker},3,1,No,{marker},12,10,3\n",
                HEADER
            );
            let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default())
                .unwrap_or_else(|e| panic!("{marker}: {e}"));
            let record = &table.records()[0];
            assert_eq!(record.gender, "Unknown", "{marker}");
            assert_eq!(record.years_since_last_promotion, 0, "{marker}");
            assert_eq!(record.monthly_income, 0.0, "{marker}");
            assert_eq!(table.summary().filled.len(), 3, "{marker}");
        }
    }

    #[test]
    fn test_out_of_range_integer_is_rejected() {
        let csv = format!("{}\n{}\n", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0))
            .replacen("\n35,", "\n1e30,", 1);
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        match err {
            ProcessorError::DataFormat(msg) => assert!(msg.contains("Age"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }

        let csv = csv.replacen("\n1e30,", "\n35.5,", 1);
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        assert!(matches!(err, ProcessorError::DataFormat(_)));
    }

    #[test]
    fn test_fractional_numeric_fill_is_rejected() {
        let csv = format!("{}\n{}\n", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0));
        for numeric in [1.5, f64::NAN] {
            let fill = FillDefaults {
                numeric,
                categorical: "Unknown".into(),
            };
            let err = EmployeeTable::from_bytes(csv.as_bytes(), &fill).unwrap_err();
            assert!(matches!(err, ProcessorError::Config(_)), "{numeric}");
        }
    }

    #[test]
    fn test_blanket_zero_fill_is_configurable() {
        let csv = format!("{}\n35,,Sales,Medical,Manager,8,1,3,1,No,1,12,10,3\n", HEADER);
        let fill = FillDefaults {
            numeric: 0.0,
            categorical: "0".into(),
        };
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &fill).unwrap();
        assert_eq!(table.records()[0].gender, "0");
    }

    #[test]
    fn test_extra_columns_are_typed_and_filled() {
        let csv = format!(
            "EmployeeNumber,{},Attrition\n1,{},Yes\n,{},\n",
            HEADER,
            row("Male", "Sales", 1, 3, 2, "No", 1.0),
            row("Female", "Sales", 1, 3, 2, "No", 1.0),
        );
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();

        let number = table.extra_column("EmployeeNumber").unwrap();
        assert_eq!(number.kind(), ColumnType::Int64);
        assert_eq!(number.iter().collect::<Vec<_>>(), vec!["1", "0"]);

        let attrition = table.extra_column("Attrition").unwrap();
        assert_eq!(attrition.kind(), ColumnType::Str);
        assert_eq!(attrition.iter().collect::<Vec<_>>(), vec!["Yes", "Unknown"]);
        assert_eq!(table.summary().filled.len(), 2);
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let csv = format!(
            "\u{feff}{}\r\n{}\r\n\r\n{}\r\n",
            HEADER,
            row("Male", "Sales", 1, 3, 2, "No", 1.0),
            row("Female", "R&D", 1, 3, 2, "No", 1.0),
        );
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.headers()[0], "Age");
        assert_eq!(table.records()[1].department, "R&D");
        assert_eq!(table.records()[1].training_times_last_year, 3.0);
    }

    #[test]
    fn test_last_line_without_newline() {
        let csv = format!("{}\n{}", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0));
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_integral_float_in_integer_column() {
        let csv = format!("{}\n{}\n", HEADER, row("Male", "Sales", 1, 3, 2, "No", 1.0))
            .replacen("\n35,", "\n35.0,", 1);
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();
        assert_eq!(table.records()[0].age, 35);
    }

    #[test]
    fn test_quoted_fields() {
        let fields = split_fields(br#"a,"b,c","say ""hi""",,"#).unwrap();
        let fields: Vec<&[u8]> = fields.iter().map(|f| f.as_ref()).collect();
        assert_eq!(
            fields,
            vec![&b"a"[..], &b"b,c"[..], &br#"say "hi""#[..], &b""[..], &b""[..]]
        );
        assert!(split_fields(br#""open"#).is_err());
    }

    #[test]
    fn test_derived_columns_in_source_are_recomputed() {
        let csv = format!(
            "{},ToBePromoted,ToBeRetrenched\n{},0,Yes\n",
            HEADER,
            row("Male", "Sales", 6, 3, 2, "No", 1.0)
        );
        let table = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap();
        assert_eq!(table.headers().len(), 14);
        assert!(table.extra_columns().is_empty());
        assert!(table.records()[0].to_be_promoted());
        assert_eq!(table.records()[0].to_be_retrenched(), Retrenchment::No);
    }

    #[test]
    fn test_duplicate_required_column() {
        let csv = format!("{},Gender\n", HEADER);
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        assert!(matches!(err, ProcessorError::DataFormat(_)));
    }

    #[test]
    fn test_chunk_boundaries_end_on_newlines() {
        let data = b"aaaa\nbb\ncccccc\nd\n";
        let chunks = EmployeeTable::find_chunk_boundaries(data, 3);
        assert_eq!(chunks.first().unwrap().0, 0);
        assert_eq!(chunks.last().unwrap().1, data.len());
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        for &(_, end) in &chunks {
            assert_eq!(data[end - 1], b'\n');
        }
    }

    #[test]
    fn test_parallel_parse_keeps_order_and_lines() {
        let mut rows = Vec::new();
        for i in 0..4000 {
            rows.push(row("Male", &format!("Dept{}", i), 1, 3, 2, "No", i as f64));
        }
        let table = make_table(&rows);
        assert_eq!(table.row_count(), 4000);
        for (i, record) in table.records().iter().enumerate() {
            assert_eq!(record.monthly_income, i as f64);
        }

        let mut csv = format!("{}\n", HEADER);
        for r in &rows {
            csv.push_str(r);
            csv.push('\n');
        }
        csv.push_str("broken\n");
        let err = EmployeeTable::from_bytes(csv.as_bytes(), &FillDefaults::default()).unwrap_err();
        match err {
            ProcessorError::DataFormat(msg) => assert!(msg.starts_with("line 4002:"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_filter_predicates() {
        let table = make_table(&[
            row("Male", "Sales", 1, 3, 2, "No", 1.0),
            row("Female", "R&D", 1, 3, 2, "No", 1.0),
            row("Female", "Sales", 1, 3, 2, "No", 1.0),
        ]);
        let rows = table
            .filter(
                EmployeeField::Department,
                &FilterPredicate::OneOf(vec!["Sales".into()]),
            )
            .unwrap();
        assert_eq!(rows, vec![0, 2]);

        let rows = table
            .filter(EmployeeField::Age, &FilterPredicate::Between(30, 40))
            .unwrap();
        assert_eq!(rows, vec![0, 1, 2]);
        let rows = table
            .filter(EmployeeField::Age, &FilterPredicate::Between(36, 40))
            .unwrap();
        assert!(rows.is_empty());

        let err = table
            .filter(EmployeeField::Age, &FilterPredicate::OneOf(vec![]))
            .unwrap_err();
        assert!(matches!(err, ProcessorError::UnsupportedPredicate(_)));
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted_vecs(vec![0, 2, 4, 6], vec![1, 2, 6]), vec![2, 6]);
        assert!(intersect_sorted_vecs(vec![], vec![1]).is_empty());
    }
}
