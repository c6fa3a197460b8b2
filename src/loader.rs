use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::domain::{Message, PVError};
use crate::record::{Column, Record};

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    WORKBOOK,
}

fn detect_file_type(path: &Path) -> Result<FileType, PVError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("XLSX") | Some("XLSM") | Some("XLSB") | Some("XLS") | Some("ODS") => {
            Ok(FileType::WORKBOOK)
        }
        _ => Err(PVError::UnknownFileType),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, PVError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PVError::FileNotFound,
        ErrorKind::PermissionDenied => PVError::PermissionDenied,
        _ => PVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(PVError::LoadingFailed("Not a file!".into()));
    }
    debug!("Reading {} ({} bytes)", path.display(), metadata.len());
    Ok(fs::read(path)?)
}

/// Load the component records of a data file, dispatching on its extension.
pub fn load_path(path: &Path) -> Result<Vec<Record>, PVError> {
    let file_type = detect_file_type(path)?;
    let bytes = read_file(path)?;
    match file_type {
        FileType::WORKBOOK => load_workbook_bytes(&bytes),
        FileType::CSV => load_csv_bytes(bytes),
    }
}

/// Parse the first sheet of a spreadsheet workbook. The format is sniffed
/// from the bytes.
pub fn load_workbook_bytes(bytes: &[u8]) -> Result<Vec<Record>, PVError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    trace!("Workbook sheets: {:?}", workbook.sheet_names());
    let range = workbook.worksheet_range_at(0).ok_or(PVError::NoSheet)??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(cell_text).collect();
    let rows = rows.map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    Ok(project_rows(&header, rows))
}

/// Parse CSV data. Every column is read as text to keep values like `0402`.
pub fn load_csv_bytes(bytes: Vec<u8>) -> Result<Vec<Record>, PVError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    // Each column is converted in its own rayon task, as rows are built afterwards.
    let columns: Result<Vec<Vec<String>>, PolarsError> = header
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = columns?;

    let rows = (0..df.height()).map(|ridx| {
        columns
            .iter()
            .map(|c| c[ridx].clone())
            .collect::<Vec<String>>()
    });
    Ok(project_rows(&header, rows))
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<String>, PolarsError> {
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.unwrap_or("").to_string())
        .collect())
}

/// Text form of a cell as shown in the table.
fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTimeIso(v) | Data::DurationIso(v) => v.clone(),
        Data::DateTime(v) => v.as_f64().to_string(),
        Data::Error(e) => e.to_string(),
    }
}

/// Position of every record column within the header row.
fn header_positions(header: &[String]) -> [Option<usize>; 5] {
    Column::ALL.map(|column| {
        header
            .iter()
            .position(|h| h.trim() == column.source_header())
    })
}

/// Map raw rows onto records. Missing columns and cells become empty strings,
/// rows without any content are skipped.
fn project_rows<I>(header: &[String], rows: I) -> Vec<Record>
where
    I: Iterator<Item = Vec<String>>,
{
    let positions = header_positions(header);
    for (column, pos) in Column::ALL.iter().zip(positions.iter()) {
        if pos.is_none() {
            debug!("Column \"{}\" missing in header", column.source_header());
        }
    }

    rows.filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            let mut record = Record::default();
            for (column, pos) in Column::ALL.iter().zip(positions.iter()) {
                if let Some(value) = pos.and_then(|p| row.get(p)) {
                    *record.field_mut(*column) = value.clone();
                }
            }
            record
        })
        .collect()
}

/// Load in the background and report the result as a single message.
pub fn spawn_load(path: PathBuf, sender: Sender<Message>) -> JoinHandle<()> {
    thread::spawn(move || {
        let start_time = Instant::now();
        let result = load_path(&path);
        match &result {
            Ok(records) => info!(
                "Loaded {} records from {} in {}ms",
                records.len(),
                path.display(),
                start_time.elapsed().as_millis()
            ),
            Err(e) => error!("Loading {} failed: {}", path.display(), e),
        }
        if sender.send(Message::Loaded(result)).is_err() {
            debug!("Receiver gone before loading finished");
        }
    })
}
