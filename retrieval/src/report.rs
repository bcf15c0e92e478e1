//! Precision@k breakdowns.

use std::cmp::Reverse;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::evaluator::mean;

/// Result of a full leave-one-out evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport<L> {
    /// Neighbor cut-off the evaluation ran with.
    pub k: usize,

    /// Mean of `per_item`.
    pub precision: f64,

    /// Fraction of each item's top-k neighbors sharing its label, in row order.
    pub per_item: Vec<f64>,

    /// Precision grouped by label, largest classes first.
    pub per_label: Vec<LabelPrecision<L>>,
}

/// Precision of the items carrying one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelPrecision<L> {
    /// The label.
    pub label: L,

    /// Number of items with this label.
    pub items: usize,

    /// Mean per-item precision over those items.
    pub precision: f64,
}

impl<L: Eq + Hash + Clone> EvaluationReport<L> {
    pub(crate) fn new(k: usize, labels: &[L], per_item: Vec<f64>) -> Self {
        let mut groups: IndexMap<&L, (usize, f64)> = IndexMap::new();
        for (label, precision) in labels.iter().zip(&per_item) {
            let entry = groups.entry(label).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += precision;
        }

        let mut per_label: Vec<LabelPrecision<L>> = groups
            .into_iter()
            .map(|(label, (items, total))| LabelPrecision {
                label: label.clone(),
                items,
                precision: total / items as f64,
            })
            .collect();
        // Stable sort keeps first-appearance order among equal counts.
        per_label.sort_by_key(|entry| Reverse(entry.items));

        Self {
            k,
            precision: mean(&per_item),
            per_item,
            per_label,
        }
    }

    /// Breakdown entry for one label.
    pub fn label(&self, label: &L) -> Option<&LabelPrecision<L>> {
        self.per_label.iter().find(|entry| &entry.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_groups_by_label() {
        let labels = ["rose", "tulip", "rose", "daisy", "tulip", "rose"];
        let per_item = vec![1.0, 0.5, 0.0, 1.0, 0.5, 0.5];

        let report = EvaluationReport::new(2, &labels, per_item);

        assert_eq!(report.k, 2);
        assert_eq!(report.precision, 3.5 / 6.0);
        let order: Vec<(&str, usize)> = report
            .per_label
            .iter()
            .map(|entry| (entry.label, entry.items))
            .collect();
        assert_eq!(order, vec![("rose", 3), ("tulip", 2), ("daisy", 1)]);
        assert_eq!(report.label(&"rose").unwrap().precision, 0.5);
        assert_eq!(report.label(&"tulip").unwrap().precision, 0.5);
        assert!(report.label(&"sunflower").is_none());
    }

    #[test]
    fn test_equal_counts_keep_first_appearance() {
        let labels = [7, 3, 3, 7];
        let report = EvaluationReport::new(1, &labels, vec![1.0, 0.0, 1.0, 0.0]);
        let order: Vec<i32> = report.per_label.iter().map(|entry| entry.label).collect();
        assert_eq!(order, vec![7, 3]);
    }
}
