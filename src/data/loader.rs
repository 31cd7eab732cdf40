use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{ObservedDataset, Spectrum};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load one reference intensity curve.  Dispatch by extension.
///
/// Supported formats (each a flat table of numeric columns):
/// * `.parquet` – one column per quantity, e.g. `WAVELENGTH`, `g45`, `g50`
/// * `.json`    – `{ "WAVELENGTH": [...], "g50": [...] }`
/// * `.csv`     – header row with column names, one sample per row
pub fn load_reference_spectrum(path: &Path, wavelength_col: &str, flux_col: &str) -> Result<Spectrum> {
    let columns = [wavelength_col, flux_col];
    let mut table = match extension(path).as_str() {
        "parquet" | "pq" => read_parquet_columns(path, &columns),
        "json" => read_json_columns(path, &columns),
        "csv" => read_csv_columns(path, &columns),
        other => bail!("Unsupported reference spectrum extension: .{other}"),
    }
    .with_context(|| format!("loading reference spectrum {}", path.display()))?;

    let wavelength = table.remove(wavelength_col).unwrap_or_default();
    let flux = table.remove(flux_col).unwrap_or_default();
    let spectrum = Spectrum::from_columns(wavelength, flux)
        .with_context(|| format!("reference spectrum {}", path.display()))?;

    log::debug!(
        "Loaded {} samples of '{flux_col}' from {}",
        spectrum.len(),
        path.display()
    );
    Ok(spectrum)
}

/// Load an observed transmission spectrum with columns
/// `wvl`, `wvl_width`, `depth`, `err`.
///
/// `depth` and `err` are multiplied by `depth_scale` (1e6 turns fractional
/// depths into ppm).
///
/// * `.csv`          – comma separated with a header row
/// * `.txt` / `.dat` – whitespace separated with a header line; `#` comments
pub fn load_observed(path: &Path, depth_scale: f64) -> Result<ObservedDataset> {
    let rows = match extension(path).as_str() {
        "csv" => read_observed_csv(path),
        "txt" | "dat" | "ascii" => read_observed_ascii(path),
        other => bail!("Unsupported observed data extension: .{other}"),
    }
    .with_context(|| format!("loading observed data {}", path.display()))?;

    let mut wvl = Vec::with_capacity(rows.len());
    let mut wvl_width = Vec::with_capacity(rows.len());
    let mut depth = Vec::with_capacity(rows.len());
    let mut err = Vec::with_capacity(rows.len());
    for row in rows {
        wvl.push(row.wvl);
        wvl_width.push(row.wvl_width);
        depth.push(row.depth * depth_scale);
        err.push(row.err * depth_scale);
    }

    let dataset = ObservedDataset::new(wvl, wvl_width, depth, err)
        .with_context(|| format!("observed data {}", path.display()))?;
    log::info!("Loaded {} observed points from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Observed data readers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ObservedRow {
    wvl: f64,
    wvl_width: f64,
    depth: f64,
    err: f64,
}

fn read_observed_csv(path: &Path) -> Result<Vec<ObservedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .context("opening CSV")?;

    reader
        .deserialize()
        .enumerate()
        .map(|(row_no, rec)| rec.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

/// Whitespace-separated table, the layout astropy's `ascii.read` accepts.
fn read_observed_ascii(path: &Path) -> Result<Vec<ObservedRow>> {
    let text = std::fs::read_to_string(path).context("reading text table")?;
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let header: Vec<&str> = lines
        .next()
        .context("text table has no header line")?
        .split_whitespace()
        .collect();
    let position = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .with_context(|| format!("text table missing '{name}' column"))
    };
    let idx = [
        position("wvl")?,
        position("wvl_width")?,
        position("depth")?,
        position("err")?,
    ];

    let mut rows = Vec::new();
    for (row_no, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut values = [0.0f64; 4];
        for (slot, &col) in values.iter_mut().zip(&idx) {
            let tok = tokens
                .get(col)
                .with_context(|| format!("Row {row_no}: only {} columns", tokens.len()))?;
            *slot = tok
                .parse::<f64>()
                .with_context(|| format!("Row {row_no}, {}: '{tok}' is not a number", header[col]))?;
        }
        rows.push(ObservedRow {
            wvl: values[0],
            wvl_width: values[1],
            depth: values[2],
            err: values[3],
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Reference spectrum readers – return the requested numeric columns
// ---------------------------------------------------------------------------

type Columns = BTreeMap<String, Vec<f64>>;

fn read_csv_columns(path: &Path, wanted: &[&str]) -> Result<Columns> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let indices: Vec<(String, usize)> = wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .map(|i| (name.to_string(), i))
                .with_context(|| format!("CSV missing '{name}' column"))
        })
        .collect::<Result<_>>()?;

    let mut columns: Columns = indices.iter().map(|(n, _)| (n.clone(), Vec::new())).collect();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (name, i) in &indices {
            let tok = record.get(*i).unwrap_or("");
            let value = tok
                .parse::<f64>()
                .with_context(|| format!("Row {row_no}, {name}: '{tok}' is not a number"))?;
            columns.entry(name.clone()).or_default().push(value);
        }
    }
    Ok(columns)
}

/// Expected JSON schema (columns-oriented, `df.to_json(orient='list')`):
///
/// ```json
/// { "WAVELENGTH": [5000.0, 5000.5, ...], "g50": [1.2e14, 1.3e14, ...] }
/// ```
fn read_json_columns(path: &Path, wanted: &[&str]) -> Result<Columns> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let obj = root.as_object().context("Expected top-level JSON object")?;

    let mut columns = Columns::new();
    for name in wanted {
        let arr = obj
            .get(*name)
            .and_then(|v| v.as_array())
            .with_context(|| format!("missing or invalid '{name}' array"))?;
        let values = arr
            .iter()
            .enumerate()
            .map(|(j, v)| {
                v.as_f64()
                    .with_context(|| format!("{name}[{j}]: not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;
        columns.insert(name.to_string(), values);
    }
    Ok(columns)
}

fn read_parquet_columns(path: &Path, wanted: &[&str]) -> Result<Columns> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Columns = wanted.iter().map(|n| (n.to_string(), Vec::new())).collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        for name in wanted {
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
            let values = extract_f64_column(batch.column(idx))
                .with_context(|| format!("column '{name}'"))?;
            columns.entry(name.to_string()).or_default().extend(values);
        }
    }
    Ok(columns)
}

// -- Parquet / Arrow helpers --

/// Read a flat numeric column as `f64`; nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let values = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}
