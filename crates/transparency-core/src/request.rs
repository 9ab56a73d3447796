//! Search request and its closed vocabularies.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::driver::Locator;
use crate::error::SearchError;
use crate::identity::{normalize_identifier, normalize_name};
use crate::selectors;

/// Which value of the request is typed into the search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    ByName,
    #[default]
    ByPrimaryId,
    BySecondaryId,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::ByName => "name",
            SearchMode::ByPrimaryId => "cpf",
            SearchMode::BySecondaryId => "nis",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "by_name" => Ok(SearchMode::ByName),
            "cpf" | "by_primary_id" => Ok(SearchMode::ByPrimaryId),
            "nis" | "by_secondary_id" => Ok(SearchMode::BySecondaryId),
            other => Err(SearchError::Validation(format!(
                "Invalid option '{}'. Use: name, cpf, nis",
                other
            ))),
        }
    }
}

/// Refinements offered by the portal's "Refine a Busca" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    SocialPrograms,
}

impl FilterKind {
    pub const ALL: &'static [FilterKind] = &[FilterKind::SocialPrograms];

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::SocialPrograms => "social_programs",
        }
    }

    /// Control that toggles this filter inside the refine panel.
    pub fn locator(&self) -> Locator {
        match self {
            FilterKind::SocialPrograms => selectors::SOCIAL_PROGRAMS_FILTER,
        }
    }

    fn available() -> String {
        let mut names: Vec<_> = Self::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| SearchError::UnknownFilter {
                invalid: s.to_string(),
                available: Self::available(),
            })
    }
}

/// Parse filter names, rejecting unknown ones and dropping duplicates
/// (first occurrence wins).
pub fn parse_filters<S: AsRef<str>>(names: &[S]) -> Result<Vec<FilterKind>, SearchError> {
    let mut invalid: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| n.parse::<FilterKind>().is_err())
        .collect();

    if !invalid.is_empty() {
        invalid.sort_unstable();
        return Err(SearchError::UnknownFilter {
            invalid: invalid.join(", "),
            available: FilterKind::available(),
        });
    }

    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        let kind: FilterKind = name.as_ref().parse()?;
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }

    if unique.len() < names.len() {
        warn!("Duplicates removed from filters");
    }

    Ok(unique)
}

/// Who to look for and how. Immutable once built.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    target_name: String,
    target_identifier: String,
    secondary_identifier: Option<String>,
    search_mode: SearchMode,
    active_filters: Vec<FilterKind>,
}

impl SearchRequest {
    /// Validate inputs and build a request.
    pub fn new<S: AsRef<str>>(
        target_name: &str,
        target_identifier: &str,
        secondary_identifier: Option<&str>,
        search_mode: SearchMode,
        filters: &[S],
    ) -> Result<Self, SearchError> {
        if target_name.trim().is_empty() {
            return Err(SearchError::Validation("Name cannot be empty.".to_string()));
        }
        if target_identifier.trim().is_empty() {
            return Err(SearchError::Validation("CPF cannot be empty.".to_string()));
        }
        if matches!(secondary_identifier, Some(nis) if nis.trim().is_empty()) {
            return Err(SearchError::Validation("NIS cannot be empty.".to_string()));
        }

        Ok(Self {
            target_name: target_name.to_string(),
            target_identifier: target_identifier.to_string(),
            secondary_identifier: secondary_identifier.map(str::to_string),
            search_mode,
            active_filters: parse_filters(filters)?,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target_identifier(&self) -> &str {
        &self.target_identifier
    }

    pub fn secondary_identifier(&self) -> Option<&str> {
        self.secondary_identifier.as_deref()
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn active_filters(&self) -> &[FilterKind] {
        &self.active_filters
    }

    /// The normalized value typed into the search field for this mode.
    pub fn search_value(&self) -> Result<String, SearchError> {
        let value = match self.search_mode {
            SearchMode::ByName => normalize_name(&self.target_name),
            SearchMode::ByPrimaryId => normalize_identifier(&self.target_identifier),
            SearchMode::BySecondaryId => self
                .secondary_identifier
                .as_deref()
                .map(normalize_identifier)
                .unwrap_or_default(),
        };

        if value.is_empty() {
            return Err(SearchError::Validation(format!(
                "Option '{}' has no value.",
                self.search_mode
            )));
        }

        Ok(value)
    }
}
