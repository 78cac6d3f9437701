//! CSV rendering wrapper (C9). The byte-level encoding/escaping is delegated
//! to the `csv` crate; this module only owns the header-row contract,
//! the empty-input rule, and error wrapping.

/// A row that can be rendered to CSV. Implementors supply the header row
/// once (via the type, not the instance) and their own field values.
pub trait CsvRow {
    /// Column headers, written once as the first line.
    fn headers() -> &'static [&'static str];

    /// This row's values, in the same order as [`CsvRow::headers`].
    fn row(&self) -> Vec<String>;
}

/// Errors from rendering a CSV document.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// `render` was called with an empty slice.
    #[error("no arguments provided")]
    NoArguments,
    /// The underlying writer failed to write or flush.
    #[error("csv write failed: {0}")]
    Io(#[from] csv::Error),
}

/// Writes `rows` as CSV: header line first, then one line per row, then
/// flushes. Returns [`CsvError::NoArguments`] on an empty slice.
pub fn render<T: CsvRow>(rows: &[T]) -> Result<Vec<u8>, CsvError> {
    if rows.is_empty() {
        return Err(CsvError::NoArguments);
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.row())?;
    }
    writer.flush().map_err(|e| CsvError::Io(e.into()))?;
    writer.into_inner().map_err(|e| CsvError::Io(e.into_error().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u32, &'static str);

    impl CsvRow for Row {
        fn headers() -> &'static [&'static str] {
            &["ID", "Name"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let rows: Vec<Row> = vec![];
        assert!(matches!(render(&rows), Err(CsvError::NoArguments)));
    }

    #[test]
    fn renders_header_then_rows() {
        let rows = vec![Row(1, "a"), Row(2, "b")];
        let bytes = render(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "ID,Name\n1,a\n2,b\n");
    }
}
