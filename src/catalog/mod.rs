mod cache;
mod error;
mod fetch;
mod parse;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

pub use cache::{CatalogCache, NoopCache, TtlCache};
pub use error::CatalogError;
pub use fetch::TleSource;
pub use parse::line_checksum;

/// One named element set with its derived propagation constants.
pub struct TleEntry {
    pub name: String,
    pub elements: Elements,
    pub constants: Constants,
}

impl TleEntry {
    pub fn epoch(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.elements.datetime, Utc)
    }
}

// The derived propagation constants have no useful text form, so keep the
// debug output to the identifying fields.
impl fmt::Debug for TleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TleEntry")
            .field("name", &self.name)
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

/// A parsed multi-satellite catalog with a case-insensitive name index.
pub struct Catalog {
    entries: Vec<TleEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let entries = parse::parse_catalog_text(text)?;
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (normalize_name(&entry.name), i))
            .collect();
        Ok(Self { entries, index })
    }

    /// Exact name match, ignoring case and surrounding whitespace. Never
    /// guesses a closest match.
    pub fn select(&self, name: &str) -> Result<&TleEntry, CatalogError> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

#[cfg(test)]
pub mod test_fixtures {
    //! A small fixed catalog anchored at a well-known ISS element epoch.

    pub const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    pub const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    /// Two named entries sharing the same element lines; the second exists
    /// only to exercise name selection.
    pub const ISS_CATALOG: &str = concat!(
        "ISS (ZARYA)\n",
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927\n",
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537\n",
        "\n",
        "ZARYA TEST TARGET\n",
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927\n",
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537\n",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::ISS_CATALOG;

    #[test]
    fn selection_is_case_insensitive_and_trimmed() {
        let catalog = Catalog::parse(ISS_CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.select("iss (zarya)").unwrap().name, "ISS (ZARYA)");
        assert_eq!(catalog.select("  ISS (ZARYA) ").unwrap().name, "ISS (ZARYA)");
        assert_eq!(
            catalog.select("zarya test target").unwrap().name,
            "ZARYA TEST TARGET"
        );
    }

    #[test]
    fn unknown_name_lists_available_entries() {
        let catalog = Catalog::parse(ISS_CATALOG).unwrap();
        let err = catalog.select("NOT A REAL SATELLITE").unwrap_err();
        match err {
            CatalogError::NotFound { name, available } => {
                assert_eq!(name, "NOT A REAL SATELLITE");
                assert_eq!(available, vec!["ISS (ZARYA)", "ZARYA TEST TARGET"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn entries_have_a_debug_form() {
        let catalog = Catalog::parse(ISS_CATALOG).unwrap();
        let entry = catalog.select("ISS (ZARYA)").unwrap();
        let debug = format!("{entry:?}");
        assert!(debug.contains("TleEntry"), "{debug}");
        assert!(debug.contains("ISS (ZARYA)"), "{debug}");
    }

    #[test]
    fn epoch_matches_the_element_set() {
        let catalog = Catalog::parse(ISS_CATALOG).unwrap();
        let epoch = catalog.select("ISS (ZARYA)").unwrap().epoch();
        // day-of-year 264.51782528 of 2008
        assert_eq!(epoch.format("%Y-%m-%d").to_string(), "2008-09-20");
    }
}
