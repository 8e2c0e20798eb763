//! Participant sessions: profile, question plan, answer collection and scoring

mod profile;
mod scoring;
mod state;

pub use profile::{Gender, MAX_AGE, MIN_AGE, ParticipantProfile};
pub use scoring::{CategoryScore, QuizSummary, normalize_answer, score};
pub use state::{Question, QuizSession, QuizState, plan_questions};
