use std::borrow::Cow;
use std::io::{BufWriter, Write};

use crate::processor::{
    ProcessorError,
    employee::{PROMOTION_COLUMN, RETRENCHMENT_COLUMN},
    employee_table::{EmployeeTable, Slot},
};

/// Serializes the table as UTF-8 CSV for download.
///
/// Columns keep their source order and are followed by the two derived
/// columns. There is no index column.
pub fn table_to_csv(table: &EmployeeTable) -> Vec<u8> {
    let mut out = header_line(table);
    for row_idx in 0..table.row_count() {
        out.push_str(&row_line(table, row_idx));
    }
    out.into_bytes()
}

/// Streams the same bytes as [`table_to_csv`] into `writer`
pub fn write_csv<W: Write>(table: &EmployeeTable, writer: W) -> Result<(), ProcessorError> {
    let mut writer = BufWriter::new(writer);
    writer.write_all(header_line(table).as_bytes())?;
    for row_idx in 0..table.row_count() {
        writer.write_all(row_line(table, row_idx).as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn header_line(table: &EmployeeTable) -> String {
    let mut header: Vec<Cow<'_, str>> = table.headers().iter().map(|h| quote(h)).collect();
    header.push(Cow::Borrowed(PROMOTION_COLUMN));
    header.push(Cow::Borrowed(RETRENCHMENT_COLUMN));
    let mut line = header.join(",");
    line.push('\n');
    line
}

fn row_line(table: &EmployeeTable, row_idx: usize) -> String {
    let record = &table.records()[row_idx];
    let mut cells: Vec<String> = table
        .slots()
        .iter()
        .map(|slot| {
            let text = match *slot {
                Slot::Field(field) => record.field_text(field),
                Slot::Extra(idx) => table.extra_columns()[idx]
                    .get(row_idx)
                    .unwrap_or_default()
                    .to_string(),
            };
            quote(&text).into_owned()
        })
        .collect();
    cells.push(if record.to_be_promoted() { "1" } else { "0" }.to_string());
    cells.push(record.to_be_retrenched().to_string());
    let mut line = cells.join(",");
    line.push('\n');
    line
}

fn quote(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
