//! Presentational values derived from a [`StatisticsSnapshot`].
//!
//! Recomputed in full from each snapshot; nothing is updated incrementally.

use crate::models::{Severity, StatisticsSnapshot};

/// One row of the "objects by class" chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBar {
    pub class_name: String,
    pub count: u64,
    /// `count / max(all counts)`, in `0.0..=1.0`.
    pub width: f64,
}

impl ClassBar {
    pub fn width_percent(&self) -> f64 {
        self.width * 100.0
    }
}

/// Fixed colour and icon for a severity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    pub color: &'static str,
    pub icon: &'static str,
}

/// One row of the "alerts by severity" list.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityRow {
    pub label: String,
    pub severity: Severity,
    pub count: u64,
    pub style: SeverityStyle,
}

pub fn severity_style(severity: Severity) -> SeverityStyle {
    match severity {
        Severity::High => SeverityStyle {
            color: "#dc3545",
            icon: "🔴",
        },
        Severity::Medium => SeverityStyle {
            color: "#ff9800",
            icon: "🟠",
        },
        Severity::Low => SeverityStyle {
            color: "#28a745",
            icon: "🟢",
        },
        Severity::Unknown => SeverityStyle {
            color: "#6c757d",
            icon: "⚪",
        },
    }
}

/// Bars scaled against the largest class count, in snapshot order.
pub fn class_bars(snapshot: &StatisticsSnapshot) -> Vec<ClassBar> {
    let max = snapshot.class_statistics.values().copied().max().unwrap_or(0);
    snapshot
        .class_statistics
        .iter()
        .map(|(class_name, &count)| ClassBar {
            class_name: class_name.clone(),
            count,
            width: if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            },
        })
        .collect()
}

pub fn severity_rows(snapshot: &StatisticsSnapshot) -> Vec<SeverityRow> {
    snapshot
        .severity_statistics
        .iter()
        .map(|(label, &count)| {
            let severity: Severity = label.parse().unwrap_or(Severity::Unknown);
            SeverityRow {
                label: label.clone(),
                severity,
                count,
                style: severity_style(severity),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn snapshot(classes: &[(&str, u64)], severities: &[(&str, u64)]) -> StatisticsSnapshot {
        StatisticsSnapshot {
            class_statistics: classes
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<IndexMap<_, _>>(),
            severity_statistics: severities
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<IndexMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn bars_scale_to_largest_class() {
        let bars = class_bars(&snapshot(&[("truck", 10), ("warehouse", 4)], &[]));
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].width_percent(), 100.0);
        assert!((bars[1].width_percent() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_counts_give_empty_bars() {
        let bars = class_bars(&snapshot(&[("truck", 0)], &[]));
        assert_eq!(bars[0].width, 0.0);
        assert!(class_bars(&StatisticsSnapshot::default()).is_empty());
    }

    #[test]
    fn severity_rows_use_fixed_palette() {
        let rows = severity_rows(&snapshot(&[], &[("high", 2), ("low", 1), ("critical", 5)]));
        assert_eq!(rows[0].style.color, "#dc3545");
        assert_eq!(rows[1].style.color, "#28a745");
        assert_eq!(rows[2].severity, Severity::Unknown);
        assert_eq!(rows[2].style.color, "#6c757d");
        assert_eq!(rows[2].label, "critical");
    }
}
