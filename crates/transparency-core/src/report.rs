//! Report assembly, JSON rendering and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::SearchError;
use crate::normalizer::CanonicalRecord;
use crate::table::RawRow;

/// Length of the identifier fragment in report file names.
pub const FRAGMENT_LEN: usize = 6;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// Serialized form of one record, with the portal's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "nome")]
    pub person_name: String,
    #[serde(rename = "cpf")]
    pub primary_identifier: String,
    #[serde(rename = "nis")]
    pub beneficiary_id: String,
    #[serde(rename = "localidade")]
    pub location: String,
    #[serde(rename = "recurso")]
    pub resource_label: String,
    #[serde(rename = "valor")]
    pub amount: String,
    #[serde(rename = "link do recurso")]
    pub resource_link: String,
    #[serde(rename = "extrato")]
    pub detail_records: Vec<RawRow>,
}

/// What a search produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub records: Vec<ReportRecord>,
    pub primary_identifier: String,
    pub location: String,
    /// Base64 PNG of the person page, empty when unavailable.
    pub screenshot: String,
}

/// On-disk JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub data: Vec<ReportRecord>,
    pub screenshot: String,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn document(&self) -> ReportDocument {
        ReportDocument {
            data: self.records.clone(),
            screenshot: self.screenshot.clone(),
        }
    }

    /// Pretty JSON with 4-space indentation; non-ASCII is written as-is.
    pub fn to_json(&self) -> Result<String, SearchError> {
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.document().serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| SearchError::Validation(format!("Report is not valid UTF-8: {}", e)))
    }

    /// Write the report into `dir` as `ID_<fragment>_<timestamp>.json`.
    pub fn persist(&self, dir: &Path, fragment: &str) -> Result<PathBuf, SearchError> {
        let path = dir.join(report_file_name(fragment, Local::now())?);
        let json = self.to_json()?;

        fs::create_dir_all(dir).map_err(|source| SearchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| SearchError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Saved {} item(s) to {}", self.records.len(), path.display());
        Ok(path)
    }
}

/// `ID_<fragment>_<dd-mm-yyyy_HH-MM-SS>.json`. The fragment must be exactly
/// six ASCII digits.
pub fn report_file_name<Tz>(
    fragment: &str,
    at: chrono::DateTime<Tz>,
) -> Result<String, SearchError>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if fragment.len() != FRAGMENT_LEN || !fragment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SearchError::InvalidIdentifierFragment(fragment.to_string()));
    }
    Ok(format!("ID_{}_{}.json", fragment, at.format(TIMESTAMP_FORMAT)))
}

pub struct ReportBuilder;

impl ReportBuilder {
    /// Enrich every record with the person's identifier and location.
    pub fn build(
        records: Vec<CanonicalRecord>,
        primary_identifier: &str,
        location: &str,
        screenshot: String,
    ) -> Result<Report, SearchError> {
        if primary_identifier.trim().is_empty() {
            return Err(SearchError::Validation("CPF cannot be empty".to_string()));
        }
        if location.trim().is_empty() {
            return Err(SearchError::Validation("Location cannot be empty".to_string()));
        }

        let records = records
            .into_iter()
            .map(|record| ReportRecord {
                person_name: record.person_name,
                primary_identifier: primary_identifier.to_string(),
                beneficiary_id: record.beneficiary_id,
                location: location.to_string(),
                resource_label: record.resource_label,
                amount: record.amount,
                resource_link: record.resource_link,
                detail_records: record.detail_records,
            })
            .collect();

        Ok(Report {
            records,
            primary_identifier: primary_identifier.to_string(),
            location: location.to_string(),
            screenshot,
        })
    }

    /// Report for a search that found nobody.
    pub fn empty() -> Report {
        Report {
            records: Vec::new(),
            primary_identifier: String::new(),
            location: String::new(),
            screenshot: String::new(),
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
