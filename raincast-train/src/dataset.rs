use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use raincast_core::FEATURE_NAMES;

/// Name of the training target column (observed precipitation).
pub const TARGET_NAME: &str = "precipitation";

/// Feature rows in `FEATURE_NAMES` order plus their precipitation targets,
/// kept in file order so the split stays chronological.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Find a column by variable name. Open-Meteo exports append a unit suffix,
/// so `temperature_2m (°C)` matches the variable `temperature_2m`.
fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    let with_unit = format!("{name} (");
    headers
        .iter()
        .position(|h| {
            let h = h.trim();
            h == name || h.starts_with(&with_unit)
        })
        .ok_or_else(|| anyhow!("CSV is missing a '{name}' column"))
}

/// Load a historical Open-Meteo CSV export.
///
/// Gaps are forward-filled from the previous observation, matching how the
/// training data was prepared originally. Rows before the first complete
/// observation are dropped.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open training data: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let feature_cols = FEATURE_NAMES
        .iter()
        .map(|name| column_index(&headers, name))
        .collect::<Result<Vec<_>>>()?;
    let target_col = column_index(&headers, TARGET_NAME)?;

    let mut rows = Vec::new();
    let mut targets = Vec::new();
    let mut last_features: Vec<Option<f64>> = vec![None; feature_cols.len()];
    let mut last_target: Option<f64> = None;

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {line}"))?;

        let mut row = Vec::with_capacity(feature_cols.len());
        let mut complete = true;
        for (slot, &col) in feature_cols.iter().enumerate() {
            match parse_cell(&record, col, line)? {
                Some(value) => {
                    last_features[slot] = Some(value);
                    row.push(value);
                }
                None => match last_features[slot] {
                    Some(filled) => row.push(filled),
                    None => complete = false,
                },
            }
        }

        let target = match parse_cell(&record, target_col, line)? {
            Some(value) => {
                last_target = Some(value);
                Some(value)
            }
            None => last_target,
        };

        match (complete, target) {
            (true, Some(target)) => {
                rows.push(row);
                targets.push(target);
            }
            // Leading rows with nothing to fill from are skipped.
            _ => continue,
        }
    }

    if rows.is_empty() {
        bail!("Training data contained no complete rows");
    }

    Ok(Dataset { rows, targets })
}

fn parse_cell(record: &csv::StringRecord, col: usize, line: usize) -> Result<Option<f64>> {
    let raw = record
        .get(col)
        .ok_or_else(|| anyhow!("CSV record {line} is missing column {col}"))?
        .trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("CSV record {line}, column {col}: '{raw}' is not a number"))?;
    Ok(Some(value))
}

/// Chronological split: the first `1 - test_fraction` of rows train, the
/// tail is held out. No shuffling, so evaluation is on unseen future hours.
pub fn train_test_split(dataset: &Dataset, test_fraction: f64) -> Result<(Dataset, Dataset)> {
    if !(0.0..1.0).contains(&test_fraction) {
        bail!("test fraction {test_fraction} must be in [0, 1)");
    }
    let n = dataset.len();
    let split = n - (n as f64 * test_fraction).round() as usize;
    if split == 0 {
        bail!("test fraction {test_fraction} leaves no training rows");
    }

    let train = Dataset {
        rows: dataset.rows[..split].to_vec(),
        targets: dataset.targets[..split].to_vec(),
    };
    let test = Dataset {
        rows: dataset.rows[split..].to_vec(),
        targets: dataset.targets[split..].to_vec(),
    };
    Ok((train, test))
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n
}

pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
