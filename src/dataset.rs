use {
    crate::record::{FieldValue, ObservationRecord},
    serde_json::Value,
    std::{collections::HashMap, fs, path::Path},
};

/// Columns dropped on load
const DROPPED_COLUMNS: [&str; 1] = ["customerID"];

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Csv(csv::Error),
    /// Valid JSON that is not an array of objects
    Shape(String),
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Parse(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Csv(err)
    }
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "IO error: {}", e),
            DatasetError::Parse(e) => write!(f, "Parse error: {}", e),
            DatasetError::Csv(e) => write!(f, "CSV error: {}", e),
            DatasetError::Shape(e) => write!(f, "Unexpected dataset shape: {}", e),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Load the bulk customer dataset from a CSV, JSON array or JSONL file
///
/// The format follows the extension: `.csv`, `.jsonl`, anything else is read
/// as a JSON array.
///
/// A missing file is not an error: the dashboard starts with an empty
/// dataset. Records are cleaned on the way in (see `clean_record`).
pub fn load_records(file_path: &str) -> Result<Vec<ObservationRecord>, DatasetError> {
    if !Path::new(file_path).exists() {
        log::info!("No dataset file found: {}", file_path);
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(file_path)?;
    let rows = if file_path.ends_with(".csv") {
        parse_csv(&raw)?
    } else if file_path.ends_with(".jsonl") {
        parse_jsonl(&raw)?
    } else {
        parse_json_array(&raw)?
    };

    let total = rows.len();
    let records: Vec<ObservationRecord> = rows.into_iter().filter_map(clean_record).collect();

    if records.len() < total {
        log::info!("Dropped {} of {} rows with empty or unusable fields", total - records.len(), total);
    }
    log::info!("Loaded {} records from {}", records.len(), file_path);
    Ok(records)
}

fn parse_json_array(raw: &str) -> Result<Vec<serde_json::Map<String, Value>>, DatasetError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(DatasetError::Shape(format!("row {} is not an object: {}", i, other))),
            })
            .collect(),
        _ => Err(DatasetError::Shape("top-level value is not an array".to_string())),
    }
}

/// CSV cells arrive as text: blanks become nulls, numeric text becomes numbers
fn parse_csv(raw: &str) -> Result<Vec<serde_json::Map<String, Value>>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for row in reader.deserialize::<HashMap<String, String>>() {
        let row = row?;
        let map = row
            .into_iter()
            .map(|(key, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    match cell.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                        Some(n) => Value::Number(n),
                        None => Value::String(cell),
                    }
                };
                (key, value)
            })
            .collect();
        rows.push(map);
    }
    Ok(rows)
}

fn parse_jsonl(raw: &str) -> Result<Vec<serde_json::Map<String, Value>>, DatasetError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match serde_json::from_str::<Value>(line)? {
            Value::Object(map) => Ok(map),
            _ => Err(DatasetError::Shape(format!("line {} is not an object", i + 1))),
        })
        .collect()
}

/// Turn one raw row into a record, or `None` if the row must be dropped
///
/// - drops `customerID`
/// - booleans become "Yes"/"No", nested values are skipped
/// - a null or blank field drops the whole row
/// - `TotalCharges` text is coerced to a number; rows where it is not numeric
///   (the blank values of brand-new customers) are dropped
pub fn clean_record(row: serde_json::Map<String, Value>) -> Option<ObservationRecord> {
    let mut record = ObservationRecord::new();

    for (key, value) in row {
        if DROPPED_COLUMNS.contains(&key.as_str()) {
            continue;
        }
        let field = match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => continue,
            },
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => FieldValue::Text(s),
            Value::Bool(b) => FieldValue::text(if b { "Yes" } else { "No" }),
            Value::Null => return None,
            Value::Array(_) | Value::Object(_) => continue,
        };
        record.set(&key, field);
    }

    if let Some(total) = record.get("TotalCharges") {
        let numeric = total.as_f64().filter(|v| v.is_finite())?;
        record.set("TotalCharges", numeric);
    }

    Some(record)
}
