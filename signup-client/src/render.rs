//! HTML rendering for the activity page
//!
//! Askama templates produce the same markup the page shows: the activity cards,
//! the activity selector and the surrounding page chrome.

use crate::page::{ActivitiesView, PageState, ACTIVITIES_FAILED, LOADING_ACTIVITIES, PLACEHOLDER_OPTION};
use askama::Template;
use signup_core::{ActivitySnapshot, ErrorContext, NamedActivity, SignupError, SignupResult};
use std::fmt;

/// The unregister action bound to one participant row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterAction {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub email: String,
    /// Only present when a session was active when the card was rendered
    pub action: Option<UnregisterAction>,
}

/// One rendered activity card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: Vec<ParticipantRow>,
}

impl ActivityCard {
    pub fn from_entry(entry: &NamedActivity, authenticated: bool) -> Self {
        let participants = entry
            .activity
            .participants
            .iter()
            .map(|email| ParticipantRow {
                email: email.clone(),
                action: authenticated.then(|| UnregisterAction {
                    activity: entry.name.clone(),
                    email: email.clone(),
                }),
            })
            .collect();

        Self {
            name: entry.name.clone(),
            description: entry.activity.description.clone(),
            schedule: entry.activity.schedule.clone(),
            spots_left: entry.activity.spots_left(),
            participants,
        }
    }

    /// Cards for a whole snapshot, in snapshot order
    pub fn from_snapshot(snapshot: &ActivitySnapshot, authenticated: bool) -> Vec<Self> {
        snapshot
            .iter()
            .map(|entry| Self::from_entry(entry, authenticated))
            .collect()
    }
}

#[derive(Template)]
#[template(path = "activities.html")]
struct ActivitiesListTemplate<'a> {
    cards: &'a [ActivityCard],
}

#[derive(Template)]
#[template(path = "activity_select.html")]
struct ActivitySelectTemplate<'a> {
    placeholder: &'a str,
    options: &'a [String],
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    user_status: &'a str,
    auth_button_label: &'a str,
    user_menu_visible: bool,
    signup_visible: bool,
    login_modal_visible: bool,
    activities_html: String,
    options_html: String,
    signup_email: &'a str,
    login_username: &'a str,
    message_class: String,
    message_text: &'a str,
    login_message_class: String,
    login_message_text: &'a str,
}

fn render_error(e: askama::Error, operation: &str) -> SignupError {
    SignupError::Render {
        message: format!("Failed to render {}: {}", operation, e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("render").with_operation(operation),
    }
}

/// Markup for the activities list area
pub fn render_activities(view: &ActivitiesView) -> SignupResult<String> {
    match view {
        ActivitiesView::Loading => Ok(format!("<p>{}</p>", LOADING_ACTIVITIES)),
        ActivitiesView::Failed => Ok(format!("<p>{}</p>", ACTIVITIES_FAILED)),
        ActivitiesView::Loaded(cards) => ActivitiesListTemplate { cards }
            .render()
            .map_err(|e| render_error(e, "activities")),
    }
}

/// Options for the activity selector, placeholder first
pub fn render_activity_options(options: &[String]) -> SignupResult<String> {
    ActivitySelectTemplate {
        placeholder: PLACEHOLDER_OPTION,
        options,
    }
    .render()
    .map_err(|e| render_error(e, "activity_options"))
}

/// Full HTML document for the current page state
pub fn render_page(page: &PageState) -> SignupResult<String> {
    let (message_text, message_class) = banner_parts(page.message.current());
    let (login_message_text, login_message_class) = banner_parts(page.login_message.current());

    PageTemplate {
        user_status: &page.user_status,
        auth_button_label: &page.auth_button_label,
        user_menu_visible: page.user_menu_visible,
        signup_visible: page.signup_visible,
        login_modal_visible: page.login_modal_visible,
        activities_html: render_activities(&page.activities)?,
        options_html: render_activity_options(&page.activity_options)?,
        signup_email: &page.signup_form.email,
        login_username: &page.login_form.username,
        message_class,
        message_text,
        login_message_class,
        login_message_text,
    }
    .render()
    .map_err(|e| render_error(e, "page"))
}

fn banner_parts(message: Option<&signup_core::UiMessage>) -> (&str, String) {
    match message {
        Some(message) => (message.text.as_str(), message.kind.to_string()),
        None => ("", "hidden".to_string()),
    }
}

/// Plain-text view of the page for terminals
pub struct TextPage<'a>(pub &'a PageState);

impl fmt::Display for TextPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;

        writeln!(f, "[{}]  ({})", page.user_status, page.auth_button_label)?;
        if let Some(message) = page.message.current() {
            writeln!(f, "{}: {}", message.kind, message.text)?;
        }
        if page.login_modal_visible {
            writeln!(f, "-- login --")?;
            if let Some(message) = page.login_message.current() {
                writeln!(f, "{}: {}", message.kind, message.text)?;
            }
        }
        writeln!(f)?;

        let cards = match &page.activities {
            ActivitiesView::Loading => return writeln!(f, "{}", LOADING_ACTIVITIES),
            ActivitiesView::Failed => return writeln!(f, "{}", ACTIVITIES_FAILED),
            ActivitiesView::Loaded(cards) => cards,
        };

        for card in cards {
            writeln!(f, "{}", card.name)?;
            writeln!(f, "  {}", card.description)?;
            writeln!(f, "  Schedule: {}", card.schedule)?;
            writeln!(f, "  Availability: {} spots left", card.spots_left)?;
            if card.participants.is_empty() {
                writeln!(f, "  No participants yet")?;
            } else {
                writeln!(f, "  Participants:")?;
                for row in &card.participants {
                    let marker = if row.action.is_some() { " [x]" } else { "" };
                    writeln!(f, "    - {}{}", row.email, marker)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

pub fn render_text(page: &PageState) -> String {
    TextPage(page).to_string()
}
