//! Quiz session state machine
//!
//! `Setup -> InProgress -> Complete`, forward only. Each submitted answer
//! records the wall-clock seconds since the previous step.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::profile::ParticipantProfile;
use super::scoring::{QuizSummary, score};
use crate::assignment::Assignment;
use crate::catalog::{Catalog, CatalogItem};
use crate::config::QuizConfig;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizState {
    Setup,
    InProgress,
    Complete,
}

/// One catalog item as presented to the participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub item: CatalogItem,
    pub options: &'static [&'static str],
}

/// Turn an assignment into a shuffled question list.
///
/// Assigned ids missing from the catalog are dropped.
pub fn plan_questions<R: Rng + ?Sized>(
    catalog: &Catalog,
    assignment: &Assignment,
    config: &QuizConfig,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions: Vec<Question> = assignment
        .items
        .iter()
        .flat_map(|(category, ids)| ids.iter().map(move |id| (category, id)))
        .filter_map(|(category, id)| catalog.item(category, id))
        .map(|item| Question {
            options: config.options_for(&item.category),
            item: item.clone(),
        })
        .collect();
    questions.shuffle(rng);
    questions
}

/// One participant's run through the quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    profile: ParticipantProfile,
    state: QuizState,
    questions: Vec<Question>,
    responses: Vec<String>,
    times: Vec<f64>,
    step_started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn new(profile: ParticipantProfile) -> Self {
        Self {
            profile,
            state: QuizState::Setup,
            questions: Vec::new(),
            responses: Vec::new(),
            times: Vec::new(),
            step_started_at: None,
        }
    }

    pub fn profile(&self) -> &ParticipantProfile {
        &self.profile
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Zero-based index of the question being shown
    pub fn position(&self) -> usize {
        self.responses.len()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Begin the quiz; an empty plan completes immediately
    pub fn start(&mut self, questions: Vec<Question>, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.expect_state(QuizState::Setup)?;
        self.questions = questions;
        self.step_started_at = Some(now);
        self.state = if self.questions.is_empty() {
            QuizState::Complete
        } else {
            QuizState::InProgress
        };
        Ok(())
    }

    /// Question awaiting an answer, if the quiz is in progress
    pub fn current(&self) -> Option<&Question> {
        match self.state {
            QuizState::InProgress => self.questions.get(self.position()),
            _ => None,
        }
    }

    /// Seconds spent on the current step so far
    pub fn elapsed(&self, now: DateTime<Utc>) -> f64 {
        self.step_started_at
            .map(|started| seconds_between(started, now))
            .unwrap_or(0.0)
    }

    /// Record `choice` for the current question and advance.
    ///
    /// Returns the seconds recorded for the step. The session is left
    /// untouched on error.
    pub fn submit(&mut self, choice: &str, now: DateTime<Utc>) -> Result<f64, SessionError> {
        self.expect_state(QuizState::InProgress)?;
        let question = self
            .current()
            .ok_or_else(|| self.state_error(QuizState::InProgress))?;
        if !question.options.iter().any(|option| *option == choice) {
            return Err(SessionError::UnknownOption {
                choice: choice.to_string(),
            });
        }

        let seconds = round2(self.elapsed(now));
        self.responses.push(choice.to_string());
        self.times.push(seconds);
        self.step_started_at = Some(now);

        if self.responses.len() == self.questions.len() {
            self.state = QuizState::Complete;
        }
        Ok(seconds)
    }

    /// Per-question (item, response, seconds) in the order presented
    pub fn answers(&self) -> impl Iterator<Item = (&CatalogItem, &str, f64)> {
        self.questions
            .iter()
            .zip(&self.responses)
            .zip(&self.times)
            .map(|((q, r), t)| (&q.item, r.as_str(), *t))
    }

    /// Score the finished quiz
    pub fn summary(&self) -> Result<QuizSummary, SessionError> {
        self.expect_state(QuizState::Complete)?;
        Ok(QuizSummary::from_outcomes(self.answers().map(
            |(item, response, seconds)| {
                (
                    item.category.as_str(),
                    score(response, &item.correct_answer),
                    seconds,
                )
            },
        )))
    }

    fn expect_state(&self, expected: QuizState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.state_error(expected))
        }
    }

    fn state_error(&self, expected: QuizState) -> SessionError {
        SessionError::InvalidState {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", self.state),
        }
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    ((end - start).num_milliseconds().max(0) as f64) / 1000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
