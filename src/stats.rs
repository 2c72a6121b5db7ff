//! Aggregate statistics over the annotation collection.

use chrono::Utc;
use serde::Serialize;

use crate::model::Annotation;

/// Summary counters for dashboards and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    /// Annotations whose comment is non-blank.
    pub with_text: usize,
    /// Mean comment length in characters, 0 for an empty collection.
    pub avg_text_length: f64,
    /// Annotations created on the current UTC calendar day.
    pub created_today: usize,
}

impl CollectionStats {
    pub fn compute(annotations: &[Annotation]) -> Self {
        let total = annotations.len();
        let with_text = annotations.iter().filter(|a| a.has_text()).count();
        let avg_text_length = if total == 0 {
            0.0
        } else {
            let total_chars: usize = annotations.iter().map(|a| a.text.chars().count()).sum();
            total_chars as f64 / total as f64
        };
        let today = Utc::now().date_naive();
        let created_today = annotations
            .iter()
            .filter(|a| a.created.date_naive() == today)
            .count();
        Self {
            total,
            with_text,
            avg_text_length,
            created_today,
        }
    }
}
