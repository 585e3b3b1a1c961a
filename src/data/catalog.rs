//! Built-in FRED series catalog (display label -> series id).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::EtlError;

/// One selectable series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesEntry {
    pub label: &'static str,
    pub series_id: &'static str,
}

const BUILTIN_ENTRIES: [SeriesEntry; 9] = [
    SeriesEntry { label: "Unemployment Rate", series_id: "UNRATE" },
    SeriesEntry { label: "M2 Money Stock", series_id: "M2SL" },
    SeriesEntry { label: "Federal Funds Rate", series_id: "FEDFUNDS" },
    SeriesEntry { label: "Housing Starts", series_id: "HOUST" },
    SeriesEntry { label: "Gross Domestic Product", series_id: "GDP" },
    SeriesEntry { label: "Discount Rate", series_id: "DFF" },
    SeriesEntry { label: "Gold Prices", series_id: "GOLDAMGBD228NLBM" },
    SeriesEntry { label: "Consumer Price Index (Inflation)", series_id: "CPIAUCSL" },
    SeriesEntry { label: "S&P 500 Index", series_id: "SP500" },
];

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| Catalog::new(BUILTIN_ENTRIES.to_vec()));

/// Immutable label/id registry. Built once; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<SeriesEntry>,
    by_label: HashMap<&'static str, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<SeriesEntry>) -> Self {
        let by_label = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.label, idx))
            .collect();
        Self { entries, by_label }
    }

    /// The process-wide catalog of supported series.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    /// Exact label lookup.
    pub fn lookup(&self, label: &str) -> Result<&'static str, EtlError> {
        self.by_label
            .get(label)
            .map(|&idx| self.entries[idx].series_id)
            .ok_or_else(|| EtlError::UnknownSeries(label.to_string()))
    }

    /// Resolve a label, or failing that a series id (ids are matched case-insensitively).
    pub fn resolve(&self, input: &str) -> Result<SeriesEntry, EtlError> {
        let input = input.trim();
        if let Some(&idx) = self.by_label.get(input) {
            return Ok(self.entries[idx]);
        }
        self.entries
            .iter()
            .find(|entry| entry.series_id.eq_ignore_ascii_case(input))
            .copied()
            .ok_or_else(|| EtlError::UnknownSeries(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_label() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.lookup("Unemployment Rate").unwrap(), "UNRATE");
        assert_eq!(catalog.lookup("S&P 500 Index").unwrap(), "SP500");
    }

    #[test]
    fn lookup_unknown_label_fails() {
        let err = Catalog::builtin().lookup("Bitcoin").unwrap_err();
        assert!(matches!(err, EtlError::UnknownSeries(ref l) if l == "Bitcoin"));
    }

    #[test]
    fn lookup_is_exact_on_labels() {
        assert!(Catalog::builtin().lookup("unemployment rate").is_err());
    }

    #[test]
    fn resolve_accepts_labels_and_ids() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve("Gold Prices").unwrap().series_id, "GOLDAMGBD228NLBM");
        let entry = catalog.resolve("cpiaucsl").unwrap();
        assert_eq!(entry.label, "Consumer Price Index (Inflation)");
        assert!(catalog.resolve("NOPE").is_err());
    }

    #[test]
    fn builtin_order_is_stable() {
        let ids: Vec<_> = Catalog::builtin().entries().iter().map(|e| e.series_id).collect();
        assert_eq!(ids.first(), Some(&"UNRATE"));
        assert_eq!(ids.last(), Some(&"SP500"));
        assert_eq!(ids.len(), 9);
    }
}
