use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::grid::Grid;

/// Metadata lines at the top of a raster file. Kept verbatim, never parsed.
pub const HEADER_LINES: usize = 6;

/// A textual raster: the fixed-size header plus the numeric grid body.
#[derive(Debug, Clone)]
pub struct Raster {
    pub header: Vec<String>,
    pub grid: Grid,
}

/// Load a textual raster: [`HEADER_LINES`] metadata lines followed by
/// row-major whitespace-separated numeric rows. The grid shape is inferred
/// from the body.
pub fn load_raster(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let reader = BufReader::new(file);

    let mut header = Vec::with_capacity(HEADER_LINES);
    let mut data: Vec<f64> = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {:?}", path))?;
        if line_no < HEADER_LINES {
            header.push(line);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let row: Vec<f64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .with_context(|| format!("bad numeric value on line {} of {:?}", line_no + 1, path))?;

        if rows == 0 {
            cols = row.len();
        } else if row.len() != cols {
            anyhow::bail!(
                "line {} of {:?} has {} values, expected {}",
                line_no + 1,
                path,
                row.len(),
                cols
            );
        }
        rows += 1;
        data.extend(row);
    }

    anyhow::ensure!(rows > 0, "no data rows in {:?}", path);
    debug!(?path, rows, cols, "raster loaded");

    Ok(Raster {
        header,
        grid: Grid { rows, cols, data },
    })
}

/// Save a grid as a headerless textual raster, 4-decimal fixed format,
/// space-separated, row-major.
pub fn save_raster(path: impl AsRef<Path>, grid: &Grid) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            if col > 0 {
                write!(out, " ")?;
            }
            write!(out, "{:.4}", grid.get(row, col))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Export a grid as CSV, one record per grid row, 4-decimal values.
pub fn save_csv(path: impl AsRef<Path>, grid: &Grid) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to create {:?}", path))?;

    for row in 0..grid.rows {
        let record: Vec<String> = (0..grid.cols)
            .map(|col| format!("{:.4}", grid.get(row, col)))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// A named transmitter site on the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub row: usize,
    pub col: usize,
}

pub fn load_stations(path: impl AsRef<Path>) -> Result<Vec<Station>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let reader = BufReader::new(file);
    let stations: Vec<Station> = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse station list {:?}", path))?;
    Ok(stations)
}

/// Render a station list into a transmitter mask grid.
pub fn stations_to_mask(stations: &[Station], rows: usize, cols: usize) -> Result<Grid> {
    let mut mask = Grid::zeros(rows, cols);
    for station in stations {
        anyhow::ensure!(
            station.row < rows && station.col < cols,
            "station {:?} at ({}, {}) is outside the {}x{} grid",
            station.name,
            station.row,
            station.col,
            rows,
            cols
        );
        mask.set(station.row, station.col, 1.0);
    }
    Ok(mask)
}
