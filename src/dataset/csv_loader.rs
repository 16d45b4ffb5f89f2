//! CSV ingestion with header-to-schema column mapping.
//!
//! Headers are matched to the seven schema fields automatically
//! ([`ColumnMapping::suggest`]); explicit overrides win over suggestions.
//! `rock_type` is optional and defaults to [`UNKNOWN_ROCK_TYPE`]; deviation
//! columns are only required when loading training data.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DriftError, DriftResult};
use crate::types::{DrillingRecord, UNKNOWN_ROCK_TYPE};

/// Parse errors logged individually before going quiet.
const MAX_LOGGED_ERRORS: usize = 10;

/// Split one CSV line, honouring double quotes and `""` escapes.
pub(crate) fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Lowercase, trim and turn spaces/hyphens into underscores.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Column of the drilling record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaField {
    DepthFinal,
    AzimuthInitial,
    InclinationInitial,
    RockType,
    RotationSpeed,
    DeviationAzimuth,
    DeviationInclination,
}

impl SchemaField {
    pub const ALL: [SchemaField; 7] = [
        SchemaField::DepthFinal,
        SchemaField::AzimuthInitial,
        SchemaField::InclinationInitial,
        SchemaField::RockType,
        SchemaField::RotationSpeed,
        SchemaField::DeviationAzimuth,
        SchemaField::DeviationInclination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchemaField::DepthFinal => "depth_final",
            SchemaField::AzimuthInitial => "azimuth_initial",
            SchemaField::InclinationInitial => "inclination_initial",
            SchemaField::RockType => "rock_type",
            SchemaField::RotationSpeed => "rotation_speed",
            SchemaField::DeviationAzimuth => "deviation_azimuth",
            SchemaField::DeviationInclination => "deviation_inclination",
        }
    }

    /// Measured deviation columns, needed only for training.
    pub fn is_label(&self) -> bool {
        matches!(self, SchemaField::DeviationAzimuth | SchemaField::DeviationInclination)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, SchemaField::RockType)
    }

    /// Extra header words that identify this field.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            SchemaField::DepthFinal => &["depth", "eoh", "length"],
            SchemaField::AzimuthInitial => &["azi", "bearing"],
            SchemaField::InclinationInitial => &["incl", "dip"],
            SchemaField::RockType => &["lithology", "litho", "rock", "formation"],
            SchemaField::RotationSpeed => &["rpm", "rotation"],
            SchemaField::DeviationAzimuth => &["dev_az", "azimuth_dev"],
            SchemaField::DeviationInclination => &["dev_inc", "inclination_dev"],
        }
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaField {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_header(s);
        SchemaField::ALL
            .into_iter()
            .find(|f| f.name() == key)
            .ok_or_else(|| DriftError::InvalidInput(format!("unknown schema field '{s}'")))
    }
}

/// Assignment of schema fields to CSV column indices.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    headers: Vec<String>,
    columns: HashMap<SchemaField, usize>,
}

impl ColumnMapping {
    /// Guess a column for every field from the header names.
    ///
    /// Three passes, each only considering headers not yet claimed:
    /// exact normalized name, header containing the full field name, then
    /// header containing one of the field's words or aliases.
    pub fn suggest(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut columns: HashMap<SchemaField, usize> = HashMap::new();
        let mut claimed = vec![false; headers.len()];

        let passes: [&dyn Fn(SchemaField, &str) -> bool; 3] = [
            &|field: SchemaField, header: &str| header == field.name(),
            &|field: SchemaField, header: &str| header.contains(field.name()),
            &|field: SchemaField, header: &str| {
                field
                    .name()
                    .split('_')
                    .chain(field.aliases().iter().copied())
                    .any(|word| header.contains(word))
            },
        ];

        for matches in passes {
            for field in SchemaField::ALL {
                if columns.contains_key(&field) {
                    continue;
                }
                let found = normalized
                    .iter()
                    .enumerate()
                    .find(|(i, h)| !claimed[*i] && matches(field, h.as_str()));
                if let Some((i, _)) = found {
                    claimed[i] = true;
                    columns.insert(field, i);
                }
            }
        }

        Self {
            headers: headers.to_vec(),
            columns,
        }
    }

    /// Force `field` onto the column named `header` (case-insensitive).
    pub fn set(&mut self, field: SchemaField, header: &str) -> DriftResult<()> {
        let wanted = normalize_header(header);
        let idx = self
            .headers
            .iter()
            .position(|h| normalize_header(h) == wanted)
            .ok_or_else(|| {
                DriftError::InvalidInput(format!("column '{header}' not found for {field}"))
            })?;

        // A column feeds one field only
        self.columns.retain(|f, i| *f == field || *i != idx);
        self.columns.insert(field, idx);
        Ok(())
    }

    /// Apply `field=header` overrides.
    pub fn apply_overrides(&mut self, overrides: &[(SchemaField, String)]) -> DriftResult<()> {
        for (field, header) in overrides {
            self.set(*field, header)?;
        }
        Ok(())
    }

    pub fn column(&self, field: SchemaField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn header_for(&self, field: SchemaField) -> Option<&str> {
        self.column(field)
            .and_then(|i| self.headers.get(i))
            .map(String::as_str)
    }

    /// Fields that must be mapped but are not.
    pub fn missing(&self, require_labels: bool) -> Vec<SchemaField> {
        SchemaField::ALL
            .into_iter()
            .filter(|f| !f.is_optional() && (require_labels || !f.is_label()))
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }

    pub fn validate(&self, require_labels: bool) -> DriftResult<()> {
        let missing = self.missing(require_labels);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DriftError::Schema(
                missing.iter().map(|f| f.name().to_string()).collect(),
            ))
        }
    }

    /// One-line description of the mapping for logs.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = SchemaField::ALL
            .iter()
            .map(|f| match self.header_for(*f) {
                Some(h) => format!("{f}<-'{h}'"),
                None => format!("{f}<-(none)"),
            })
            .collect();
        format!(
            "Mapped {}/{} columns: {}",
            self.columns.len(),
            SchemaField::ALL.len(),
            parts.join(", ")
        )
    }
}

/// Parse a `field=header` command-line override.
pub fn parse_override(arg: &str) -> DriftResult<(SchemaField, String)> {
    let (field, header) = arg
        .split_once('=')
        .ok_or_else(|| DriftError::InvalidInput(format!("expected field=header, got '{arg}'")))?;
    Ok((field.parse()?, header.trim().to_string()))
}

/// Counters from one CSV load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub source: String,
    pub rows_loaded: usize,
    /// Rows with an empty required value
    pub skipped_rows: usize,
    /// Rows with unparsable values
    pub error_rows: usize,
    /// No rock type column: every record got the placeholder
    pub rock_type_defaulted: bool,
    pub mapping: String,
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<DrillingRecord>,
    pub summary: LoadSummary,
}

/// Load drilling records from a CSV file.
pub fn load_records(
    path: impl AsRef<Path>,
    overrides: &[(SchemaField, String)],
    require_labels: bool,
) -> DriftResult<LoadedDataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_records(BufReader::new(file), &path.display().to_string(), overrides, require_labels)
}

/// Load drilling records from any buffered reader.
pub fn read_records<R: BufRead>(
    reader: R,
    source: &str,
    overrides: &[(SchemaField, String)],
    require_labels: bool,
) -> DriftResult<LoadedDataset> {
    let mut lines = reader.lines();
    let header_line = lines
        .next()
        .ok_or_else(|| DriftError::EmptyDataset(format!("{source} is empty")))??;
    let headers = csv_split(&header_line);

    let mut mapping = ColumnMapping::suggest(&headers);
    mapping.apply_overrides(overrides)?;
    mapping.validate(require_labels)?;

    let mapping_summary = mapping.summary();
    info!(source, "{}", mapping_summary);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut errors = 0usize;
    let mut line_num = 1usize;

    for line in lines {
        line_num += 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line, &mapping, require_labels) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => skipped += 1,
            Err(e) => {
                if errors < MAX_LOGGED_ERRORS {
                    warn!(line = line_num, error = %e, "Parse error");
                }
                errors += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(DriftError::EmptyDataset(format!(
            "no valid rows in {source} ({errors} errors, {skipped} skipped)"
        )));
    }

    let summary = LoadSummary {
        source: source.to_string(),
        rows_loaded: records.len(),
        skipped_rows: skipped,
        error_rows: errors,
        rock_type_defaulted: mapping.column(SchemaField::RockType).is_none(),
        mapping: mapping_summary,
    };

    info!(
        source,
        rows = summary.rows_loaded,
        skipped = summary.skipped_rows,
        errors = summary.error_rows,
        "Drilling records loaded"
    );

    Ok(LoadedDataset { records, summary })
}

/// Numeric cell: `Ok(None)` for an empty/NaN marker, `Err` for junk.
fn get_f64(fields: &[String], idx: Option<usize>) -> Result<Option<f64>, String> {
    let Some(raw) = idx.and_then(|i| fields.get(i)) else {
        return Ok(None);
    };
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") || s == "-" {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(v) => Err(format!("non-finite value {v}")),
        Err(_) => Err(format!("cannot parse '{s}' as a number")),
    }
}

fn parse_row(
    line: &str,
    mapping: &ColumnMapping,
    require_labels: bool,
) -> Result<Option<DrillingRecord>, String> {
    let fields = csv_split(line);
    let value = |field: SchemaField| get_f64(&fields, mapping.column(field));

    let (Some(depth), Some(azimuth), Some(inclination), Some(rotation)) = (
        value(SchemaField::DepthFinal)?,
        value(SchemaField::AzimuthInitial)?,
        value(SchemaField::InclinationInitial)?,
        value(SchemaField::RotationSpeed)?,
    ) else {
        return Ok(None);
    };

    let rock_type = mapping
        .column(SchemaField::RockType)
        .and_then(|i| fields.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ROCK_TYPE);

    let record = DrillingRecord::new(depth, azimuth, inclination, rock_type, rotation);

    let labels = (
        value(SchemaField::DeviationAzimuth)?,
        value(SchemaField::DeviationInclination)?,
    );
    match labels {
        (Some(az), Some(inc)) => Ok(Some(record.with_deviation(az, inc))),
        _ if require_labels => Ok(None),
        _ => Ok(Some(record)),
    }
}
