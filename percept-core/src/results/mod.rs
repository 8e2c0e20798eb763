//! Append-only results file: one row per completed participant
//!
//! The column set is derived from the whole catalog so every row has the
//! same shape no matter which items a participant actually saw.

pub mod csv;
mod store;

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::session::QuizSession;

pub use store::{ParticipationSummary, ResultsStore};

/// Leading columns describing the participant
pub const PARTICIPANT_COLUMNS: [&str; 3] = ["name", "age", "gender"];

/// Extensions removed from item ids when naming columns
const MEDIA_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Item id without its media extension
pub fn item_stem(item_id: &str) -> &str {
    MEDIA_EXTENSIONS
        .iter()
        .find_map(|ext| item_id.strip_suffix(ext))
        .unwrap_or(item_id)
}

/// Column layout of the results file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSchema {
    columns: Vec<String>,
    /// (category, item id) -> index of the response column
    response_index: HashMap<(String, String), usize>,
}

impl ResultSchema {
    /// Participant columns, then a response and a time column per item in
    /// category order and item id order
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut columns: Vec<String> = PARTICIPANT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut response_index = HashMap::new();

        for item in catalog.items() {
            let base = format!("{}_{}", item.category, item_stem(&item.item_id));
            response_index.insert((item.category.clone(), item.item_id.clone()), columns.len());
            columns.push(format!("{}_response", base));
            columns.push(format!("{}_time", base));
        }

        Self {
            columns,
            response_index,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Flatten a session into a full-width row.
    ///
    /// Answers are placed by item, so the shuffled presentation order never
    /// matters. Items the participant did not see stay empty.
    pub fn row_for(&self, session: &QuizSession) -> Vec<String> {
        let profile = session.profile();
        let mut row = vec![String::new(); self.columns.len()];
        row[0] = profile.name().to_string();
        row[1] = profile.age().to_string();
        row[2] = profile.gender().to_string();

        for (item, response, seconds) in session.answers() {
            let key = (item.category.clone(), item.item_id.clone());
            if let Some(&index) = self.response_index.get(&key) {
                row[index] = response.to_string();
                row[index + 1] = seconds.to_string();
            }
        }
        row
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assignment::Assignment;
    use crate::catalog::Category;
    use crate::catalog::tests::item;
    use crate::config::QuizConfig;
    use crate::session::{Gender, ParticipantProfile, plan_questions};
    use chrono::{DateTime, Duration};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    pub(crate) fn catalog() -> Catalog {
        Catalog::from_categories([
            Category::new(
                "slippage",
                [item("slippage", "s2.jpg", "A"), item("slippage", "s1.png", "B")],
            ),
            Category::new("abstract", [item("abstract", "a1.jpeg", "C")]),
        ])
    }

    /// A finished session that saw only `seen` (category, item id) pairs
    pub(crate) fn finished_session(catalog: &Catalog, seen: &[(&str, &str)]) -> QuizSession {
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut items: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (category, id) in seen {
            items
                .entry(category.to_string())
                .or_default()
                .push(id.to_string());
        }
        let assignment = Assignment {
            participant_id: "Ada_1".to_string(),
            items,
            persisted: true,
        };
        let mut rng = StdRng::seed_from_u64(2);
        let questions = plan_questions(catalog, &assignment, &QuizConfig::default(), &mut rng);

        let profile = ParticipantProfile::new("Ada", 30, Gender::Female, t0).unwrap();
        let mut session = QuizSession::new(profile);
        session.start(questions, t0).unwrap();
        let mut now = t0;
        while session.current().is_some() {
            now += Duration::milliseconds(1500);
            session.submit("A", now).unwrap();
        }
        session
    }

    #[test]
    fn test_item_stem() {
        assert_eq!(item_stem("a1.png"), "a1");
        assert_eq!(item_stem("a1.jpeg"), "a1");
        assert_eq!(item_stem("a1.gif"), "a1.gif");
    }

    #[test]
    fn test_columns_follow_catalog_order() {
        let schema = ResultSchema::from_catalog(&catalog());
        assert_eq!(
            schema.columns(),
            [
                "name",
                "age",
                "gender",
                "abstract_a1_response",
                "abstract_a1_time",
                "slippage_s1_response",
                "slippage_s1_time",
                "slippage_s2_response",
                "slippage_s2_time",
            ]
        );
    }

    #[test]
    fn test_row_is_full_width_with_blanks_for_unseen_items() {
        let catalog = catalog();
        let schema = ResultSchema::from_catalog(&catalog);
        let session = finished_session(&catalog, &[("slippage", "s2.jpg")]);

        let row = schema.row_for(&session);

        assert_eq!(row.len(), schema.len());
        assert_eq!(&row[..3], ["Ada", "30", "Female"]);
        assert_eq!(row[3], "");
        assert_eq!(row[5], "");
        assert_eq!(row[7], "A");
        assert_eq!(row[8], "1.5");
    }

    #[test]
    fn test_row_width_is_independent_of_items_seen() {
        let catalog = catalog();
        let schema = ResultSchema::from_catalog(&catalog);
        let few = finished_session(&catalog, &[("abstract", "a1.jpeg")]);
        let all = finished_session(
            &catalog,
            &[
                ("abstract", "a1.jpeg"),
                ("slippage", "s1.png"),
                ("slippage", "s2.jpg"),
            ],
        );

        assert_eq!(schema.row_for(&few).len(), schema.row_for(&all).len());
    }
}
