//! Writes the run's artifacts: the raw records as JSON, the nights as a table.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::AppError;
use crate::helpers::{format_duration, format_instant};
use crate::models::{Night, RawSleepRecord};

pub const TABLE_COLUMNS: [&str; 9] = [
    "Prev_Day",
    "Bed_time",
    "Wake_Time",
    "Awake_Dur",
    "Light_Dur",
    "Deep_Dur",
    "Total_Dur",
    "Nap_Dur",
    "Window_Conf",
];

/// Write the aggregated raw records as one JSON array.
pub fn write_raw_json(path: &Path, records: &[RawSleepRecord]) -> Result<(), AppError> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Load a raw JSON array previously written by [`write_raw_json`].
pub fn load_raw_json(path: &Path) -> Result<Vec<RawSleepRecord>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write nights as a delimited table with a header row.
pub fn write_table(path: &Path, nights: &[Night], sep: char) -> Result<(), AppError> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_nights(&mut writer, nights, sep)?;
    writer.flush()?;
    Ok(())
}

/// Table body for any writer.
pub fn write_nights<W: Write>(mut w: W, nights: &[Night], sep: char) -> io::Result<()> {
    let header: Vec<String> = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
    write_row(&mut w, &header, sep)?;
    for night in nights {
        write_row(&mut w, &night_row(night), sep)?;
    }
    Ok(())
}

fn night_row(night: &Night) -> Vec<String> {
    vec![
        night.previous_day.format("%Y-%m-%d").to_string(),
        format_instant(night.bed_time.as_ref()),
        format_instant(night.wake_time.as_ref()),
        format_duration(night.awake_duration),
        format_duration(night.light_duration),
        format_duration(night.deep_duration),
        format_duration(night.total_duration),
        format_duration(night.nap_duration),
        night.window_confirmed.to_string(),
    ]
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[String], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
