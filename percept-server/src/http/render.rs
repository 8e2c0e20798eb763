//! Server-side HTML for the participant page flow

use std::fmt::Write;

use percept_core::{Gender, ParticipationSummary, Question, QuizSummary};
use uuid::Uuid;

use crate::SaveOutcome;

const TITLE: &str = "Perception Quiz";

const INSTRUCTIONS: [&str; 6] = [
    "Read each question carefully.",
    "Observe the image provided with full attention.",
    "Select the best answer from the options offered.",
    "You cannot go back to previous questions once submitted.",
    "Your response time for each question will be recorded.",
    "Take your time to understand each question, but answer as accurately as possible.",
];

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// URL of an item's media file
pub fn media_url(category: &str, item_id: &str) -> String {
    format!(
        "/media/{}/{}",
        urlencoding::encode(category),
        urlencoding::encode(item_id)
    )
}

fn layout(title: &str, body: &str, sidebar: Option<&str>) -> String {
    let aside = sidebar
        .map(|s| format!("<aside>{}</aside>", s))
        .unwrap_or_default();
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"/assets/style.css\">\n</head>\n\
         <body>\n<main>\n{}\n</main>\n{}\n</body>\n</html>\n",
        escape(title),
        body,
        aside
    )
}

/// Inputs for the setup form
#[derive(Debug, Default)]
pub struct SetupView<'a> {
    pub categories: Vec<&'a str>,
    pub items_per_category: usize,
    pub summary: Option<&'a ParticipationSummary>,
    pub error: Option<&'a str>,
    pub name: &'a str,
    pub age: &'a str,
    pub gender: Option<Gender>,
}

pub fn setup_page(view: &SetupView<'_>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{} Setup</h1>\n<h3>Welcome to the {}</h3>\n<p>This quiz tests your visual \
         perception across different cognitive tasks. You will see {} image(s) from each \
         category, and your responses and reaction times will be recorded.</p>\n",
        TITLE, TITLE, view.items_per_category
    );

    if let Some(error) = view.error {
        let _ = writeln!(body, "<div class=\"notice error\">{}</div>", escape(error));
    }

    let age = if view.age.is_empty() { "25" } else { view.age };
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/start\">\n<div class=\"fields\">\n\
         <label>Enter your name:<input type=\"text\" name=\"name\" value=\"{}\" required></label>\n\
         <label>Select your gender:<select name=\"gender\">",
        escape(view.name)
    );
    for gender in Gender::ALL {
        let selected = if view.gender == Some(gender) { " selected" } else { "" };
        let _ = write!(body, "<option{}>{}</option>", selected, gender);
    }
    let _ = write!(
        body,
        "</select></label>\n<label>Enter your age:<input type=\"number\" name=\"age\" \
         min=\"1\" max=\"120\" value=\"{}\"></label>\n</div>\n",
        escape(age)
    );

    body.push_str("<h3>Test Instructions:</h3>\n<ol>\n");
    for instruction in INSTRUCTIONS {
        let _ = writeln!(body, "<li>{}</li>", instruction);
    }
    let _ = writeln!(
        body,
        "<li>Each participant sees {} image(s) per category, balanced across participants.</li>\n</ol>",
        view.items_per_category
    );

    let names: Vec<String> = view.categories.iter().map(|c| escape(c)).collect();
    let _ = write!(
        body,
        "<div class=\"notice info\">You will answer questions from {} different categories: {}</div>\n\
         <button class=\"primary\" type=\"submit\">Start Test</button>\n</form>",
        names.len(),
        names.join(", ")
    );

    layout(TITLE, &body, Some(&statistics_panel(view.summary)))
}

fn statistics_panel(summary: Option<&ParticipationSummary>) -> String {
    let mut panel = String::from("<h2>Quiz Statistics</h2>\n");
    let Some(summary) = summary.filter(|s| s.participants > 0) else {
        panel.push_str("<p class=\"muted\">No completed participants yet.</p>");
        return panel;
    };

    let _ = writeln!(
        panel,
        "<h3>Participation Summary</h3>\n<p>Total participants: {}</p>",
        summary.participants
    );
    if let Some(age) = summary.average_age {
        let _ = writeln!(panel, "<p>Average age: {:.1}</p>", age);
    }
    for (gender, count) in &summary.genders {
        let _ = writeln!(panel, "<p>{}: {}</p>", escape(gender), count);
    }
    panel
}

/// Inputs for one question page
#[derive(Debug)]
pub struct QuestionView<'a> {
    pub session_id: Uuid,
    /// Zero-based
    pub position: usize,
    pub total: usize,
    pub question: &'a Question,
    pub elapsed: Option<f64>,
    pub notice: Option<&'a str>,
}

pub fn question_page(view: &QuestionView<'_>) -> String {
    let item = &view.question.item;
    let number = view.position + 1;
    let mut body = String::new();

    let _ = write!(
        body,
        "<progress value=\"{}\" max=\"{}\"></progress>\n<p>Question {} of {}</p>\n\
         <p><strong>Category</strong>: {}</p>\n",
        number,
        view.total,
        number,
        view.total,
        escape(&item.category)
    );
    let _ = write!(
        body,
        "<figure class=\"stimulus\"><img src=\"{}\" alt=\"{}\">\
         <figcaption class=\"muted\">{} - {}</figcaption></figure>\n",
        escape(&media_url(&item.category, &item.item_id)),
        escape(&item.item_id),
        escape(&item.category),
        escape(&item.item_id)
    );
    let _ = write!(
        body,
        "<p><strong>Question:</strong></p>\n<p>{}</p>\n",
        escape(&item.prompt)
    );

    if let Some(notice) = view.notice {
        let _ = writeln!(body, "<div class=\"notice error\">{}</div>", escape(notice));
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/quiz/{}/answer\">\n<fieldset class=\"options\">\
         <legend>Select your answer:</legend>\n",
        view.session_id
    );
    for option in view.question.options {
        let _ = writeln!(
            body,
            "<label><input type=\"radio\" name=\"choice\" value=\"{}\" required> {}</label>",
            option, option
        );
    }
    body.push_str(
        "</fieldset>\n<button class=\"primary\" type=\"submit\">Submit Answer</button>\n</form>\n",
    );

    if let Some(elapsed) = view.elapsed {
        let _ = writeln!(
            body,
            "<p class=\"muted\">Time elapsed: {:.1} seconds</p>",
            elapsed
        );
    }

    layout(TITLE, &body, None)
}

pub fn summary_page(session_id: Uuid, summary: &QuizSummary, outcome: &SaveOutcome) -> String {
    let mut body = String::from(
        "<h1>Quiz Completed!</h1>\n\
         <div class=\"notice ok\">Thank you for participating in the Perception Quiz!</div>\n",
    );

    let _ = writeln!(
        body,
        "<p><strong>Overall Accuracy</strong>: {:.1}% ({}/{})</p>",
        summary.accuracy_percent(),
        summary.correct,
        summary.total
    );
    body.push_str("<h3>Performance by Category:</h3>\n<ul>\n");
    for category in &summary.per_category {
        let _ = writeln!(
            body,
            "<li><strong>{}</strong>: {:.1}% ({}/{})</li>",
            escape(&category.category),
            category.accuracy_percent(),
            category.correct,
            category.total
        );
    }
    let _ = writeln!(
        body,
        "</ul>\n<p><strong>Average Response Time</strong>: {:.2} seconds</p>",
        summary.average_time
    );

    match outcome {
        SaveOutcome::Saved => {
            body.push_str("<div class=\"notice ok\">Your results have been saved successfully!</div>\n")
        }
        SaveOutcome::Pending => {
            body.push_str("<div class=\"notice info\">Your results are being saved.</div>\n")
        }
        SaveOutcome::Failed(message) => {
            let _ = writeln!(
                body,
                "<div class=\"notice error\">Error saving results: {}</div>",
                escape(message)
            );
        }
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/quiz/{}/restart\">\
         <button class=\"primary\" type=\"submit\">Take Quiz Again</button></form>",
        session_id
    );

    layout(TITLE, &body, None)
}

pub fn not_found_page() -> String {
    layout(
        TITLE,
        "<h1>Session not found</h1>\n<p>This quiz session does not exist or has ended.</p>\n\
         <p><a href=\"/\">Start a new quiz</a></p>",
        None,
    )
}
