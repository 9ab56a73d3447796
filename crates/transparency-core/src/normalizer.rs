//! Folding scraped tables into canonical records.

use tracing::{info, warn};
use url::Url;

use crate::detail::DetailSource;
use crate::error::SearchError;
use crate::table::{RawRow, RawTable};

/// Person name when the row has no name column.
pub const UNKNOWN_NAME: &str = "Desconhecido";
/// Any other field missing from the source row.
pub const NOT_INFORMED: &str = "Não informado";

pub const NAME_COLUMN: &str = "Nome";
pub const BENEFICIARY_ID_COLUMN: &str = "NIS";
pub const AMOUNT_COLUMN: &str = "Valor Recebido";

/// One received resource, with its detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub person_name: String,
    pub beneficiary_id: String,
    pub resource_label: String,
    pub amount: String,
    pub resource_link: String,
    pub detail_records: Vec<RawRow>,
}

pub struct RecordNormalizer {
    base_url: Url,
}

impl RecordNormalizer {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SearchError::Validation(format!("Invalid base URL '{}': {}", base_url, e)))?;
        Ok(Self { base_url })
    }

    /// One record per row, in table order. Rows with a detail link pull their
    /// detail rows from `details`.
    pub async fn normalize(
        &self,
        tables: Vec<RawTable>,
        details: &dyn DetailSource,
    ) -> Result<Vec<CanonicalRecord>, SearchError> {
        let mut records = Vec::new();

        for table in tables {
            for row in table.rows {
                let (resource_link, detail_records) = match row.detail_link() {
                    Some(href) => match self.resolve(href) {
                        Some(url) => {
                            info!("Scraping details: {}, URL: {}", table.title, url);
                            let rows = details.collect(url.as_str()).await?;
                            (url.to_string(), rows)
                        }
                        None => (NOT_INFORMED.to_string(), Vec::new()),
                    },
                    None => (NOT_INFORMED.to_string(), Vec::new()),
                };

                records.push(CanonicalRecord {
                    person_name: cell_or(&row, NAME_COLUMN, UNKNOWN_NAME),
                    beneficiary_id: cell_or(&row, BENEFICIARY_ID_COLUMN, NOT_INFORMED),
                    resource_label: table.title.clone(),
                    amount: cell_or(&row, AMOUNT_COLUMN, NOT_INFORMED),
                    resource_link,
                    detail_records,
                });
            }
        }

        Ok(records)
    }

    fn resolve(&self, href: &str) -> Option<Url> {
        match self.base_url.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring malformed detail link '{}': {}", href, e);
                None
            }
        }
    }
}

fn cell_or(row: &RawRow, column: &str, default: &str) -> String {
    row.get(column)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
