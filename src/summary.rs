//! The "Temperature Values" summary table.
//!
//! Points are listed first (`P1`, `P2`, ...) with their value, followed by
//! boxes (`B1`, ...) with min, average and max. The table is a snapshot of
//! the store; the session rebuilds it after a short debounce.

use std::fmt;

use crate::annotation::{Annotation, Scope};
use crate::constants::SUMMARY_UNIT;
use crate::store::{AnnotationStore, Listed};

pub const SUMMARY_TITLE: &str = "Temperature Values";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Value,
    Min,
    Average,
    Max,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Value => "VALUE",
            Metric::Min => "MIN",
            Metric::Average => "AVERAGE",
            Metric::Max => "MAX",
        }
    }
}

/// One annotation's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    /// Listing label such as `P1` or `B2`
    pub label: String,
    pub name: String,
    pub values: Vec<(Metric, f32)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    entries: Vec<SummaryEntry>,
}

impl Summary {
    /// Build the table from the current annotations.
    pub fn build(store: &AnnotationStore) -> Self {
        let entry = |listed: Listed<'_>| {
            let values = match listed.annotation {
                Annotation::Point(p) => vec![(Metric::Value, p.temperature)],
                Annotation::Box(b) => vec![
                    (Metric::Min, b.min_temp),
                    (Metric::Average, b.avg_temp),
                    (Metric::Max, b.max_temp),
                ],
            };
            SummaryEntry {
                label: listed.label(),
                name: listed.annotation.name().to_string(),
                values,
            }
        };

        let entries = store
            .list(Scope::Points)
            .chain(store.list(Scope::Boxes))
            .map(entry)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", SUMMARY_TITLE)?;
        for entry in &self.entries {
            for (i, (metric, value)) in entry.values.iter().enumerate() {
                let label = if i == 0 { entry.label.as_str() } else { "" };
                writeln!(
                    f,
                    "{:<5} {:<8} {:.1}{}",
                    label,
                    metric.name(),
                    value,
                    SUMMARY_UNIT
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::data::DataImage;

    fn populated() -> AnnotationStore {
        let image = DataImage::new(Array2::from_elem((20, 20), 42.0), "flat.npy").unwrap();
        let mut store = AnnotationStore::new();
        store.begin_box(1.0, 1.0);
        store.update_box(5.0, 5.0);
        store.commit_box(&image, "box").unwrap();
        store.place_point(&image, 3.0, 3.0, "first").unwrap();
        store.place_point(&image, 4.0, 4.0, "second").unwrap();
        store
    }

    #[test]
    fn test_points_come_before_boxes() {
        let summary = Summary::build(&populated());
        let labels: Vec<_> = summary.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["P1", "P2", "B1"]);
        assert_eq!(summary.entries()[2].values.len(), 3);
    }

    #[test]
    fn test_display_rows() {
        let text = Summary::build(&populated()).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], SUMMARY_TITLE);
        assert_eq!(lines[1], "P1    VALUE    42.0℃");
        assert_eq!(lines[3], "B1    MIN      42.0℃");
        assert_eq!(lines[4], "      AVERAGE  42.0℃");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_empty_store() {
        let summary = Summary::build(&AnnotationStore::new());
        assert!(summary.is_empty());
        assert_eq!(summary.to_string(), "Temperature Values\n");
    }
}
