//! HTML table parsing for the financial-resources and detail pages.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Title given to a resource table without a `<strong>` caption.
pub const UNTITLED_TABLE: &str = "Sem título";

/// Key under which a row's detail link is serialized.
pub const DETAIL_LINK_KEY: &str = "Detalhar";

static RESOURCE_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("div.br-table"));
static DATA_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table.dataTable"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("thead th"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("tbody"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static EMPTY_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.dataTables_empty"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// One table row: cells in column order, keyed by header text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
    detail_link: Option<String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. A repeated header overwrites the earlier value in place.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn with_detail_link(mut self, href: impl Into<String>) -> Self {
        self.detail_link = Some(href.into());
        self
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    /// Raw `href` of the first anchor in the row, if any.
    pub fn detail_link(&self) -> Option<&str> {
        self.detail_link.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.detail_link.is_none()
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The link replaces any cell that shares its key.
        let cells: Vec<_> = self
            .cells
            .iter()
            .filter(|(header, _)| self.detail_link.is_none() || header != DETAIL_LINK_KEY)
            .collect();

        let len = cells.len() + usize::from(self.detail_link.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (header, value) in cells {
            map.serialize_entry(header, value)?;
        }
        if let Some(link) = &self.detail_link {
            map.serialize_entry(DETAIL_LINK_KEY, link)?;
        }
        map.end()
    }
}

/// Rows read back from a report are detail rows, so every entry is a cell.
impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RawRow;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of column header to cell text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
                let mut row = RawRow::new();
                while let Some((header, value)) = access.next_entry::<String, String>()? {
                    row.insert(header, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A titled table from the financial-resources page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub title: String,
    pub rows: Vec<RawRow>,
}

/// Parse every `div.br-table` of the page. Tables without body rows are
/// dropped.
pub fn parse_titled_tables(markup: &str) -> Vec<RawTable> {
    let document = Html::parse_document(markup);

    document
        .select(&RESOURCE_TABLE)
        .filter_map(|table| {
            let title = table
                .select(&TITLE)
                .next()
                .map(|strong| element_text(&strong))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_TABLE.to_string());

            let rows = parse_rows(&table, true);
            (!rows.is_empty()).then_some(RawTable { title, rows })
        })
        .collect()
}

/// Parse the first `table.dataTable` of a detail page.
///
/// Returns `None` when no table is on the page and an empty vector when the
/// table has no data rows (including the "no records" placeholder row).
pub fn parse_data_table(markup: &str) -> Option<Vec<RawRow>> {
    let document = Html::parse_document(markup);
    let table = document.select(&DATA_TABLE).next()?;
    Some(parse_rows(&table, false))
}

fn parse_rows(table: &ElementRef<'_>, with_links: bool) -> Vec<RawRow> {
    let headers: Vec<String> = table
        .select(&HEADER_CELL)
        .map(|th| element_text(&th))
        .collect();

    let Some(body) = table.select(&BODY).next() else {
        return Vec::new();
    };

    body.select(&ROW)
        .filter(|tr| tr.select(&EMPTY_CELL).next().is_none())
        .map(|tr| {
            let mut row = RawRow::new();
            for (header, td) in headers.iter().zip(tr.select(&CELL)) {
                row.insert(header.clone(), element_text(&td));
            }
            if with_links {
                row.detail_link = tr
                    .select(&ANCHOR)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string);
            }
            row
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Text content with whitespace runs collapsed.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
