//! Filter selection state for filtered list views.
//!
//! Filters are only serialized into requests; nothing here evaluates a
//! filter against data. Every selection change yields a [`PageReset`] that
//! the owning view applies to its [`Pagination`] before the next fetch.

use std::collections::BTreeMap;

use crate::models::Severity;
use crate::pagination::Pagination;

/// Query parameter name for the severity filter.
pub const SEVERITY: &str = "severity";

/// Query parameter name for the acknowledgement filter.
pub const ACKNOWLEDGED: &str = "acknowledged";

/// Query parameter name for the detection class filter.
pub const CLASS: &str = "class";

/// Signal that the listening pagination must return to page 1.
#[must_use = "a filter change must reset pagination before the next fetch"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReset;

impl PageReset {
    pub fn apply(self, pagination: &mut Pagination) {
        pagination.reset();
    }
}

/// Mapping of filter name to selected value. An absent entry means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    selected: BTreeMap<&'static str, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value of `name`; `None` clears it back to "all".
    pub fn set(&mut self, name: &'static str, value: Option<String>) -> PageReset {
        match value {
            Some(v) if !v.is_empty() => {
                self.selected.insert(name, v);
            }
            _ => {
                self.selected.remove(name);
            }
        }
        PageReset
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.selected.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) -> PageReset {
        self.selected.clear();
        PageReset
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected filters as query pairs, in stable name order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.selected.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

// ---------------------------------------------------------------------------
// Alert filters
// ---------------------------------------------------------------------------

/// Acknowledgement filter choices offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckFilter {
    Unacknowledged,
    Acknowledged,
}

impl AckFilter {
    fn as_query(self) -> &'static str {
        match self {
            AckFilter::Unacknowledged => "false",
            AckFilter::Acknowledged => "true",
        }
    }
}

/// Typed front for the alert list's [`FilterSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilters {
    set: FilterSet,
}

impl AlertFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// A complete selection, built before any list has been fetched.
    pub fn selecting(severity: Option<Severity>, ack: Option<AckFilter>) -> Self {
        let mut filters = Self::new();
        let _ = filters.set_severity(severity);
        let _ = filters.set_acknowledged(ack);
        filters
    }

    pub fn set_severity(&mut self, severity: Option<Severity>) -> PageReset {
        self.set
            .set(SEVERITY, severity.map(|s| s.as_str().to_string()))
    }

    pub fn set_acknowledged(&mut self, ack: Option<AckFilter>) -> PageReset {
        self.set
            .set(ACKNOWLEDGED, ack.map(|a| a.as_query().to_string()))
    }

    pub fn severity(&self) -> Option<Severity> {
        self.set.get(SEVERITY).and_then(|s| s.parse().ok())
    }

    pub fn acknowledged(&self) -> Option<AckFilter> {
        match self.set.get(ACKNOWLEDGED) {
            Some("true") => Some(AckFilter::Acknowledged),
            Some("false") => Some(AckFilter::Unacknowledged),
            _ => None,
        }
    }

    pub fn clear(&mut self) -> PageReset {
        self.set.clear()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.set.query_pairs()
    }
}
