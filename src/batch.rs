//! Batch enrichment: geocode every row of a port list CSV and write the results.
//!
//! Input columns:  unlocode, name[, coordinates]
//! Output columns: unlocode, name, coordinates, claimed_lat, claimed_lng, lat, lng, status

use crate::coords::parse_unlocode_coordinates;
use crate::geocode::{Geocoder, PlaceSearch};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct InputRow {
    pub unlocode: String,
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub unlocode: String,
    pub name: String,
    pub coordinates: Option<String>,
    pub claimed_lat: Option<f64>,
    pub claimed_lng: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: String,
}

impl OutputRow {
    fn is_resolved(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Pause between consecutive provider requests.
    pub request_delay: Duration,
}

/// Row counts for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    /// Rows taken from the resume file without a new lookup.
    pub carried_over: usize,
    /// Status label → rows looked up in this run.
    pub by_status: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn count(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows, {} carried over", self.total, self.carried_over)?;
        for (status, n) in &self.by_status {
            write!(f, ", {} {}", n, status)?;
        }
        Ok(())
    }
}

/// Read input, geocode unresolved rows, write output.
pub fn run_batch<S: PlaceSearch>(
    geocoder: &Geocoder<S>,
    input: &Path,
    output: &Path,
    resume: Option<&Path>,
    opts: &BatchOptions,
) -> Result<BatchSummary> {
    let rows = read_input(input)?;
    let previous = match resume {
        Some(path) => read_resolved(path)?,
        None => HashMap::new(),
    };
    tracing::info!(rows = rows.len(), resumable = previous.len(), "starting batch");

    let (out, summary) = enrich_rows(geocoder, rows, &previous, opts);
    write_output(output, &out)?;
    tracing::info!(output = %output.display(), %summary, "batch finished");
    Ok(summary)
}

/// Geocode each row unless an already resolved row exists for its code.
pub fn enrich_rows<S: PlaceSearch>(
    geocoder: &Geocoder<S>,
    rows: Vec<InputRow>,
    previous: &HashMap<String, OutputRow>,
    opts: &BatchOptions,
) -> (Vec<OutputRow>, BatchSummary) {
    let mut summary = BatchSummary {
        total: rows.len(),
        ..BatchSummary::default()
    };
    let mut out = Vec::with_capacity(rows.len());
    let mut requests = 0usize;

    for row in rows {
        if let Some(done) = previous.get(&row.unlocode) {
            summary.carried_over += 1;
            out.push(done.clone());
            continue;
        }

        let claimed = row.coordinates.as_deref().and_then(parse_unlocode_coordinates);
        let name = row.name.trim();

        let (resolved, status) = if name.is_empty() {
            tracing::warn!(unlocode = %row.unlocode, "row has no name, skipping");
            (None, "skipped")
        } else {
            if requests > 0 && !opts.request_delay.is_zero() {
                std::thread::sleep(opts.request_delay);
            }
            requests += 1;
            let resolution = geocoder.resolve(name);
            tracing::debug!(unlocode = %row.unlocode, %resolution, "looked up");
            (resolution.position(), resolution.status())
        };

        *summary.by_status.entry(status.to_string()).or_insert(0) += 1;
        out.push(OutputRow {
            claimed_lat: claimed.map(|p| p.lat),
            claimed_lng: claimed.map(|p| p.lng),
            lat: resolved.map(|p| p.lat),
            lng: resolved.map(|p| p.lng),
            status: status.to_string(),
            unlocode: row.unlocode,
            name: row.name,
            coordinates: row.coordinates,
        });
    }

    (out, summary)
}

/// Read the input list. UNLOCODE releases ship as Latin-1, so non-UTF-8 files are decoded as such.
pub fn read_input(path: &Path) -> Result<Vec<InputRow>> {
    let text = read_text(path)?;
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let row: InputRow =
            record.with_context(|| format!("{}: bad record {}", path.display(), i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Resolved rows of an earlier output file, keyed by UNLOCODE.
pub fn read_resolved(path: &Path) -> Result<HashMap<String, OutputRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening resume file {}", path.display()))?;
    let mut resolved = HashMap::new();
    for record in reader.deserialize() {
        let row: OutputRow = record.with_context(|| format!("reading {}", path.display()))?;
        if row.is_resolved() {
            resolved.entry(row.unlocode.clone()).or_insert(row);
        }
    }
    Ok(resolved)
}

pub fn write_output(path: &Path, rows: &[OutputRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => encoding_rs::mem::decode_latin1(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::lookup::tests::StubSearch;
    use crate::geocode::{Candidate, LookupOptions};
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const INPUT: &str = "\
unlocode,name,coordinates
NLRTM,Rotterdam,5155N 00430E
BRSSZ,Santos,2357S 04619W
XXNOP,Nowhere,
GBFXT,Felixstowe,5157N 00121E
";

    fn stub() -> StubSearch {
        StubSearch::default()
            .with(
                "Rotterdam port",
                vec![Candidate::new("Rotterdam", 51.92, 4.48), Candidate::new("Europoort", 51.95, 4.14)],
            )
            .with("Santos port", vec![Candidate::new("Santo", 1.0, 1.0), Candidate::new("antos", 2.0, 2.0)])
            .with("Nowhere port", vec![])
            .with("Felixstowe port", vec![Candidate::new("Port of Felixstowe", 51.95, 1.31)])
    }

    fn write_input(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("ports.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_run_batch() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, INPUT.as_bytes());
        let output = dir.path().join("out").join("improved_coordinates.csv");
        let geocoder = Geocoder::new(stub(), LookupOptions::default());

        let summary = run_batch(&geocoder, &input, &output, None, &BatchOptions::default()).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.carried_over, 0);
        assert_eq!(summary.count("disambiguated"), 1);
        assert_eq!(summary.count("ambiguous"), 1);
        assert_eq!(summary.count("no_candidates"), 1);
        assert_eq!(summary.count("single"), 1);

        let written = read_resolved(&output).unwrap();
        assert_eq!(written.len(), 2);
        let rtm = &written["NLRTM"];
        assert_eq!(rtm.status, "disambiguated");
        assert_relative_eq!(rtm.lat.unwrap(), 51.92);
        assert_relative_eq!(rtm.claimed_lng.unwrap(), 4.5);
        assert!(!written.contains_key("BRSSZ"));
    }

    #[test]
    fn test_unresolved_rows_keep_claimed_coordinates() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, INPUT.as_bytes());
        let geocoder = Geocoder::new(stub(), LookupOptions::default());

        let (rows, _) = enrich_rows(&geocoder, read_input(&input).unwrap(), &HashMap::new(), &BatchOptions::default());
        let santos = rows.iter().find(|r| r.unlocode == "BRSSZ").unwrap();
        assert_eq!(santos.status, "ambiguous");
        assert!(santos.lat.is_none());
        assert!(santos.claimed_lat.unwrap() < 0.0);

        let nowhere = rows.iter().find(|r| r.unlocode == "XXNOP").unwrap();
        assert!(nowhere.coordinates.is_none());
        assert!(nowhere.claimed_lat.is_none());
    }

    #[test]
    fn test_resume_skips_resolved_rows() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, INPUT.as_bytes());
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");

        let geocoder = Geocoder::new(stub(), LookupOptions::default());
        run_batch(&geocoder, &input, &first, None, &BatchOptions::default()).unwrap();

        let search = stub();
        let geocoder = Geocoder::new(&search, LookupOptions::default());
        let summary = run_batch(&geocoder, &input, &second, Some(first.as_path()), &BatchOptions::default()).unwrap();
        assert_eq!(summary.carried_over, 2);
        assert_eq!(summary.count("ambiguous"), 1);
        assert_eq!(summary.count("no_candidates"), 1);
        assert_eq!(search.seen.borrow().as_slice(), ["Santos port", "Nowhere port"]);

        // Carried-over rows are written unchanged.
        assert_eq!(read_resolved(&second).unwrap(), read_resolved(&first).unwrap());
    }

    #[test]
    fn test_blank_name_skipped() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, b"unlocode,name\nZZABC,  \n");
        let search = StubSearch::default();
        let geocoder = Geocoder::new(&search, LookupOptions::default());

        let (rows, summary) = enrich_rows(&geocoder, read_input(&input).unwrap(), &HashMap::new(), &BatchOptions::default());
        assert_eq!(rows[0].status, "skipped");
        assert_eq!(summary.count("skipped"), 1);
        assert!(search.seen.borrow().is_empty());
    }

    #[test]
    fn test_latin1_input() {
        let dir = TempDir::new().unwrap();
        // "Tromsø" with ø as the single Latin-1 byte 0xF8; 0x85 is a C1 control
        // in ISO-8859-1 and must not become the Windows-1252 ellipsis.
        let mut bytes = b"unlocode,name\nNOTOS,Troms".to_vec();
        bytes.push(0xF8);
        bytes.extend_from_slice(b"\nXXC1X,A");
        bytes.push(0x85);
        bytes.push(b'\n');
        let input = write_input(&dir, &bytes);

        let rows = read_input(&input).unwrap();
        assert_eq!(rows[0].name, "Tromsø");
        assert!(rows[0].coordinates.is_none());
        assert_eq!(rows[1].name, "A\u{85}");
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_input(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn test_summary_display() {
        let mut summary = BatchSummary { total: 3, carried_over: 1, ..BatchSummary::default() };
        summary.by_status.insert("ambiguous".into(), 1);
        summary.by_status.insert("single".into(), 1);
        assert_eq!(summary.to_string(), "3 rows, 1 carried over, 1 ambiguous, 1 single");
    }
}
