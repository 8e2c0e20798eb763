//! Participant page handlers: setup, question loop, summary

use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use percept_core::{
    Gender, ParticipantProfile, ParticipationSummary, QuizSession, QuizState, SessionError,
    plan_questions,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::render::{self, QuestionView, SetupView};
use crate::{ActiveSession, AppState, CompletedSession, SaveOutcome};

/// Fields posted by the setup form
#[derive(Debug, Default, Deserialize)]
pub struct StartForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
}

/// Field posted by a question page; absent when no option was picked
#[derive(Debug, Default, Deserialize)]
pub struct AnswerForm {
    pub choice: Option<String>,
}

fn quiz_url(id: Uuid) -> String {
    format!("/quiz/{}", id)
}

fn done_url(id: Uuid) -> String {
    format!("/quiz/{}/done", id)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()
}

/// Session ids travel in the URL; anything unparseable is simply unknown
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

async fn participation(state: &AppState) -> Option<ParticipationSummary> {
    match state.results.summary().await {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Could not read results summary: {}", e);
            None
        }
    }
}

async fn render_setup(state: &AppState, form: &StartForm, error: Option<&str>) -> String {
    let summary = participation(state).await;
    render::setup_page(&SetupView {
        categories: state.catalog.category_names().collect(),
        items_per_category: state.config.items_per_category,
        summary: summary.as_ref(),
        error,
        name: &form.name,
        age: &form.age,
        gender: form.gender.parse().ok(),
    })
}

/// GET / - setup form
pub async fn setup(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_setup(&state, &StartForm::default(), None).await)
}

fn validate(form: &StartForm) -> Result<ParticipantProfile, SessionError> {
    let age = form
        .age
        .trim()
        .parse::<u32>()
        .map_err(|_| SessionError::InvalidProfile("age must be a whole number".to_string()))?;
    let gender: Gender = form.gender.parse()?;
    ParticipantProfile::new(&form.name, age, gender, Utc::now())
}

/// POST /start - create the participant, assign items, begin the quiz
pub async fn start(State(state): State<Arc<AppState>>, Form(form): Form<StartForm>) -> Response {
    let profile = match validate(&form) {
        Ok(profile) => profile,
        Err(e) => {
            let page = render_setup(&state, &form, Some(&e.to_string())).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    state.expire_sessions(Utc::now()).await;

    let assignment = state.assigner.assign(profile.participant_id()).await;
    let mut rng = StdRng::from_entropy();
    let questions = plan_questions(&state.catalog, &assignment, &state.config, &mut rng);

    let now = Utc::now();
    let mut quiz = QuizSession::new(profile);
    if let Err(e) = quiz.start(questions, now) {
        warn!("Fresh session refused to start: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    let id = Uuid::new_v4();
    info!(
        "Session {} started for {} with {} questions",
        id,
        quiz.profile().participant_id(),
        quiz.len()
    );
    state
        .sessions
        .write()
        .await
        .insert(id, ActiveSession::new(quiz, now));

    Redirect::to(&quiz_url(id)).into_response()
}

fn render_question(id: Uuid, quiz: &QuizSession, notice: Option<&str>) -> Option<String> {
    let question = quiz.current()?;
    // the first question has no previous step worth timing on screen
    let elapsed = (quiz.position() > 0).then(|| quiz.elapsed(Utc::now()));
    Some(render::question_page(&QuestionView {
        session_id: id,
        position: quiz.position(),
        total: quiz.len(),
        question,
        elapsed,
        notice,
    }))
}

/// GET /quiz/:id - current question
pub async fn question(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return not_found();
    };
    let mut sessions = state.sessions.write().await;
    if !sessions.contains_key(&id) {
        drop(sessions);
        return finished_or_missing(&state, id).await;
    }
    let Some(active) = sessions.get_mut(&id) else {
        return not_found();
    };
    active.last_active = Utc::now();

    match render_question(id, &active.quiz, None) {
        Some(page) => Html(page).into_response(),
        None => Redirect::to(&done_url(id)).into_response(),
    }
}

/// Sessions leave the active map once flushed; point those at their summary
async fn finished_or_missing(state: &AppState, id: Uuid) -> Response {
    if state.completed.read().await.contains_key(&id) {
        Redirect::to(&done_url(id)).into_response()
    } else {
        not_found()
    }
}

/// POST /quiz/:id/answer - record one choice and move on
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Form(form): Form<AnswerForm>,
) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return not_found();
    };
    let mut sessions = state.sessions.write().await;
    if !sessions.contains_key(&id) {
        drop(sessions);
        return finished_or_missing(&state, id).await;
    }
    let Some(active) = sessions.get_mut(&id) else {
        return not_found();
    };
    active.last_active = Utc::now();

    let Some(choice) = form.choice.filter(|c| !c.is_empty()) else {
        return match render_question(id, &active.quiz, Some("Please select an answer.")) {
            Some(page) => (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response(),
            None => Redirect::to(&done_url(id)).into_response(),
        };
    };

    match active.quiz.submit(&choice, Utc::now()) {
        Ok(_) if active.quiz.state() == QuizState::Complete => {
            Redirect::to(&done_url(id)).into_response()
        }
        Ok(_) => Redirect::to(&quiz_url(id)).into_response(),
        Err(e @ SessionError::UnknownOption { .. }) => {
            match render_question(id, &active.quiz, Some(&e.to_string())) {
                Some(page) => (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response(),
                None => Redirect::to(&done_url(id)).into_response(),
            }
        }
        Err(_) => Redirect::to(&done_url(id)).into_response(),
    }
}

/// GET /quiz/:id/done - score, persist once, show summary.
///
/// The first request for a finished session moves it out of the active map
/// and leaves only its summary behind, so later requests (refreshes) render
/// the stored outcome instead of appending again.
pub async fn done(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return not_found();
    };

    let quiz = {
        let mut sessions = state.sessions.write().await;
        let mut completed = state.completed.write().await;
        if let Some(finished) = completed.get(&id) {
            return Html(render::summary_page(id, &finished.summary, &finished.outcome))
                .into_response();
        }
        let Some(active) = sessions.get(&id) else {
            return not_found();
        };
        if active.quiz.state() != QuizState::Complete {
            return Redirect::to(&quiz_url(id)).into_response();
        }
        let summary = match active.quiz.summary() {
            Ok(summary) => summary,
            Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        };
        let Some(active) = sessions.remove(&id) else {
            return not_found();
        };
        completed.insert(
            id,
            CompletedSession {
                summary,
                outcome: SaveOutcome::Pending,
                finished_at: Utc::now(),
            },
        );
        active.quiz
    };

    let outcome = match state.results.append(&quiz).await {
        Ok(()) => SaveOutcome::Saved,
        Err(e) => {
            warn!("Failed to save results for session {}: {}", id, e);
            SaveOutcome::Failed(e.to_string())
        }
    };
    info!("Session {} flushed", id);

    let mut completed = state.completed.write().await;
    match completed.get_mut(&id) {
        Some(finished) => {
            finished.outcome = outcome;
            Html(render::summary_page(id, &finished.summary, &finished.outcome)).into_response()
        }
        // expired between flush and render
        None => match quiz.summary() {
            Ok(summary) => Html(render::summary_page(id, &summary, &outcome)).into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
    }
}

/// POST /quiz/:id/restart - discard the session and go back to setup
pub async fn restart(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Redirect {
    if let Some(id) = parse_id(&raw_id) {
        state.sessions.write().await.remove(&id);
        state.completed.write().await.remove(&id);
    }
    Redirect::to("/")
}
