//! Answer normalization and end-of-quiz statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical form used to compare a response with the answer key:
/// surrounding whitespace and parentheses removed, uppercased.
pub fn normalize_answer(answer: &str) -> String {
    answer
        .trim()
        .trim_matches(['(', ')'])
        .trim()
        .to_uppercase()
}

/// 1 if the normalized response equals the normalized correct answer, else 0
pub fn score(response: &str, correct_answer: &str) -> u32 {
    u32::from(normalize_answer(response) == normalize_answer(correct_answer))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub correct: u32,
    pub total: u32,
}

impl CategoryScore {
    pub fn accuracy_percent(&self) -> f64 {
        percent(self.correct, self.total)
    }
}

/// Scores shown on the completion page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub correct: u32,
    pub total: u32,
    /// Sorted by category name
    pub per_category: Vec<CategoryScore>,
    /// Mean seconds per answer; zero for an empty quiz
    pub average_time: f64,
}

impl QuizSummary {
    /// Build from (category, score, seconds) per answered question
    pub(crate) fn from_outcomes<'a>(outcomes: impl Iterator<Item = (&'a str, u32, f64)>) -> Self {
        let mut by_category: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        let mut total_time = 0.0;
        let mut total = 0;
        let mut correct = 0;

        for (category, points, seconds) in outcomes {
            let entry = by_category.entry(category).or_default();
            entry.0 += points;
            entry.1 += 1;
            correct += points;
            total += 1;
            total_time += seconds;
        }

        Self {
            correct,
            total,
            per_category: by_category
                .into_iter()
                .map(|(category, (correct, total))| CategoryScore {
                    category: category.to_string(),
                    correct,
                    total,
                })
                .collect(),
            average_time: if total == 0 {
                0.0
            } else {
                total_time / f64::from(total)
            },
        }
    }

    pub fn accuracy_percent(&self) -> f64 {
        percent(self.correct, self.total)
    }
}

fn percent(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(correct) * 100.0 / f64::from(total)
    }
}
