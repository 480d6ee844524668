//! Page state - everything the activity page shows at a given moment

use crate::render::{ActivityCard, UnregisterAction};
use signup_core::{ActivitySnapshot, UiMessage};

pub const PLACEHOLDER_OPTION: &str = "-- Select an activity --";
pub const LOADING_ACTIVITIES: &str = "Loading activities...";
pub const ACTIVITIES_FAILED: &str = "Failed to load activities. Please try again later.";
pub const NOT_LOGGED_IN: &str = "Not logged in";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    /// Selected activity; empty means the placeholder is selected
    pub activity: String,
}

impl SignupForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitiesView {
    Loading,
    Loaded(Vec<ActivityCard>),
    Failed,
}

/// A message area that can be shown and hidden.
///
/// Every `show` bumps the generation so a delayed hide only clears the message
/// it was scheduled for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    message: Option<UiMessage>,
    generation: u64,
}

impl Banner {
    /// Show a message and return its generation
    pub fn show(&mut self, message: UiMessage) -> u64 {
        self.generation += 1;
        self.message = Some(message);
        self.generation
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    /// Hide only if nothing newer has been shown since `generation`
    pub fn hide_if_current(&mut self, generation: u64) -> bool {
        if self.generation == generation && self.message.is_some() {
            self.message = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&UiMessage> {
        self.message.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub user_status: String,
    pub auth_button_label: String,
    pub signup_visible: bool,
    pub user_menu_visible: bool,
    pub login_modal_visible: bool,
    /// Inline message inside the login modal
    pub login_message: Banner,
    /// Feedback for signup and unregister
    pub message: Banner,
    pub activities: ActivitiesView,
    /// Activity names in the selector, placeholder excluded
    pub activity_options: Vec<String>,
    pub login_form: LoginForm,
    pub signup_form: SignupForm,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    pub fn new() -> Self {
        Self {
            user_status: NOT_LOGGED_IN.to_string(),
            auth_button_label: "Login".to_string(),
            signup_visible: false,
            user_menu_visible: false,
            login_modal_visible: false,
            login_message: Banner::default(),
            message: Banner::default(),
            activities: ActivitiesView::Loading,
            activity_options: Vec::new(),
            login_form: LoginForm::default(),
            signup_form: SignupForm::default(),
        }
    }

    /// Derive the auth-dependent parts of the page from the logged-in username
    pub fn apply_auth(&mut self, username: Option<&str>) {
        match username {
            Some(username) => {
                self.user_status = format!("Logged in as: {}", username);
                self.auth_button_label = "Logout".to_string();
                self.signup_visible = true;
            }
            None => {
                self.user_status = NOT_LOGGED_IN.to_string();
                self.auth_button_label = "Login".to_string();
                self.signup_visible = false;
            }
        }
    }

    /// Replace the list and the selector options with a fresh snapshot
    pub fn show_snapshot(&mut self, snapshot: &ActivitySnapshot, authenticated: bool) {
        self.activities = ActivitiesView::Loaded(ActivityCard::from_snapshot(snapshot, authenticated));
        self.activity_options = snapshot.names().map(str::to_string).collect();
    }

    /// Put the static failure text in place of the list. Options are left alone.
    pub fn show_activities_failed(&mut self) {
        self.activities = ActivitiesView::Failed;
    }

    /// Close the login modal, hiding its message and clearing the form
    pub fn close_login_modal(&mut self) {
        self.login_modal_visible = false;
        self.login_message.hide();
        self.login_form.reset();
    }

    pub fn cards(&self) -> &[ActivityCard] {
        match &self.activities {
            ActivitiesView::Loaded(cards) => cards.as_slice(),
            _ => &[],
        }
    }

    /// Unregister actions currently rendered, in page order
    pub fn unregister_actions(&self) -> Vec<&UnregisterAction> {
        self.cards()
            .iter()
            .flat_map(|card| card.participants.iter())
            .filter_map(|row| row.action.as_ref())
            .collect()
    }
}
