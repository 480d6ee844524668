//! UI Controller - turns page interactions into API calls and page updates
//!
//! Every handler runs request, parse and page update in sequence. Nothing is
//! de-duplicated or cancelled: overlapping fetches simply overwrite each other in
//! the order they resolve. Failures never escape a handler; they are logged and
//! shown on the page.

use crate::api::SignupApi;
use crate::page::PageState;
use crate::render::UnregisterAction;
use crate::session::{login_failure_text, SessionManager};
use crate::store::KeyValueStore;
use signup_core::{ClientConfig, SignupError, SignupResult, UiMessage};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const SIGNUP_REQUIRES_LOGIN: &str = "You must be logged in to register students.";
pub const UNREGISTER_REQUIRES_LOGIN: &str = "You must be logged in to unregister students.";
pub const SIGNUP_FAILED: &str = "Failed to register student. Please try again.";
pub const UNREGISTER_FAILED: &str = "Failed to unregister. Please try again.";
pub const GENERIC_REJECTION: &str = "An error occurred";

/// Auto-hide delays for transient messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Delay between "Login successful!" and the page refresh
    pub login_confirm: Duration,
    /// How long signup/unregister feedback stays visible
    pub feedback_hide: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            login_confirm: Duration::from_millis(1000),
            feedback_hide: Duration::from_millis(5000),
        }
    }
}

impl From<&ClientConfig> for Timings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            login_confirm: Duration::from_millis(config.login_confirm_ms),
            feedback_hide: Duration::from_millis(config.feedback_hide_ms),
        }
    }
}

/// Where a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    UserIcon,
    /// The user menu or anything inside it
    UserMenu,
    /// The dimmed area around the login dialog
    LoginModalBackdrop,
    Elsewhere,
}

/// Which registration action is running; selects the texts shown
#[derive(Debug, Clone, Copy)]
enum Registration {
    Signup,
    Unregister,
}

impl Registration {
    fn name(self) -> &'static str {
        match self {
            Registration::Signup => "signup",
            Registration::Unregister => "unregister",
        }
    }

    fn requires_login(self) -> &'static str {
        match self {
            Registration::Signup => SIGNUP_REQUIRES_LOGIN,
            Registration::Unregister => UNREGISTER_REQUIRES_LOGIN,
        }
    }

    fn transport_failure(self) -> &'static str {
        match self {
            Registration::Signup => SIGNUP_FAILED,
            Registration::Unregister => UNREGISTER_FAILED,
        }
    }
}

struct Inner {
    api: Arc<dyn SignupApi>,
    session: Mutex<SessionManager>,
    page: RwLock<PageState>,
    timings: Timings,
    pending: StdMutex<Vec<JoinHandle<()>>>,
}

/// Cheaply cloneable handle to the page controller
#[derive(Clone)]
pub struct UiController {
    inner: Arc<Inner>,
}

impl UiController {
    pub fn new(api: Arc<dyn SignupApi>, store: Arc<dyn KeyValueStore>, timings: Timings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                session: Mutex::new(SessionManager::new(store)),
                page: RwLock::new(PageState::new()),
                timings,
                pending: StdMutex::new(Vec::new()),
            }),
        }
    }

    /// Page load: restore the session, derive the auth UI, fetch activities
    pub async fn start(&self) {
        {
            let mut session = self.inner.session.lock().await;
            if let Err(e) = session.load_session() {
                e.log();
                warn!("Continuing without a stored session");
            }
        }

        self.update_auth_ui().await;
        self.fetch_activities().await;
    }

    /// Copy of the current page state
    pub async fn page(&self) -> PageState {
        self.inner.page.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.lock().await.is_authenticated()
    }

    pub async fn username(&self) -> Option<String> {
        self.inner
            .session
            .lock()
            .await
            .username()
            .map(str::to_string)
    }

    /// Re-derive status text, auth button and signup visibility from the session
    pub async fn update_auth_ui(&self) {
        let username = self.username().await;
        self.inner.page.write().await.apply_auth(username.as_deref());
    }

    /// Fetch the snapshot and rebuild the list and selector
    pub async fn fetch_activities(&self) {
        match self.inner.api.fetch_activities().await {
            Ok(snapshot) => {
                let authenticated = self.is_authenticated().await;
                self.inner
                    .page
                    .write()
                    .await
                    .show_snapshot(&snapshot, authenticated);
                debug!(count = snapshot.len(), authenticated, "Rendered activities");
            }
            Err(e) => {
                error!(error = %e, "Error fetching activities");
                self.inner.page.write().await.show_activities_failed();
            }
        }
    }

    pub async fn toggle_user_menu(&self) {
        let mut page = self.inner.page.write().await;
        page.user_menu_visible = !page.user_menu_visible;
    }

    /// A click somewhere on the page
    pub async fn click(&self, target: ClickTarget) {
        let mut page = self.inner.page.write().await;

        if !matches!(target, ClickTarget::UserIcon | ClickTarget::UserMenu) {
            page.user_menu_visible = false;
        }
        if target == ClickTarget::LoginModalBackdrop && page.login_modal_visible {
            page.close_login_modal();
        }
    }

    /// The Login/Logout button in the user menu
    pub async fn auth_button(&self) {
        let has_token = self.inner.session.lock().await.token().is_some();

        if has_token {
            self.logout().await;
        } else {
            let mut page = self.inner.page.write().await;
            page.login_modal_visible = true;
            page.user_menu_visible = false;
        }
    }

    /// The close button of the login dialog
    pub async fn close_login_modal(&self) {
        self.inner.page.write().await.close_login_modal();
    }

    pub async fn set_login_form(&self, username: &str, password: &str) {
        let mut page = self.inner.page.write().await;
        page.login_form.username = username.to_string();
        page.login_form.password = password.to_string();
    }

    /// Fill in the login form and submit it
    pub async fn login(&self, username: &str, password: &str) -> UiMessage {
        self.set_login_form(username, password).await;
        self.submit_login().await
    }

    /// Submit the login form. Returns the message shown inside the dialog.
    pub async fn submit_login(&self) -> UiMessage {
        let form = self.inner.page.read().await.login_form.clone();

        let result = {
            let mut session = self.inner.session.lock().await;
            session
                .login(self.inner.api.as_ref(), &form.username, &form.password)
                .await
        };

        let message = match result {
            Ok(session) => {
                info!(username = %session.username, "Login accepted");
                UiMessage::success(LOGIN_SUCCESS)
            }
            Err(e) => {
                if e.is_transport() {
                    error!(error = %e, "Error logging in");
                } else {
                    e.log();
                }
                UiMessage::error(login_failure_text(&e))
            }
        };

        let accepted = !message.is_error();
        self.inner.page.write().await.login_message.show(message.clone());

        if accepted {
            self.schedule_login_confirm();
        }

        message
    }

    /// Best-effort server logout, then clear the session and refresh the page
    pub async fn logout(&self) {
        {
            let mut session = self.inner.session.lock().await;
            if let Err(e) = session.logout(self.inner.api.as_ref()).await {
                e.log();
            }
        }

        self.update_auth_ui().await;
        self.fetch_activities().await;
        self.inner.page.write().await.user_menu_visible = false;
    }

    pub async fn set_signup_form(&self, email: &str, activity: &str) {
        let mut page = self.inner.page.write().await;
        page.signup_form.email = email.to_string();
        page.signup_form.activity = activity.to_string();
    }

    /// Fill in the signup form and submit it
    pub async fn signup(&self, email: &str, activity: &str) -> UiMessage {
        self.set_signup_form(email, activity).await;
        self.submit_signup().await
    }

    /// Submit the signup form. Returns the feedback shown.
    pub async fn submit_signup(&self) -> UiMessage {
        let form = self.inner.page.read().await.signup_form.clone();
        self.register(Registration::Signup, &form.activity, &form.email)
            .await
    }

    /// Remove a participant from an activity. Returns the feedback shown.
    pub async fn unregister(&self, activity: &str, email: &str) -> UiMessage {
        self.register(Registration::Unregister, activity, email)
            .await
    }

    /// Invoke the action attached to a rendered participant row
    pub async fn activate(&self, action: &UnregisterAction) -> UiMessage {
        self.unregister(&action.activity, &action.email).await
    }

    async fn register(&self, kind: Registration, activity: &str, email: &str) -> UiMessage {
        let token = self
            .inner
            .session
            .lock()
            .await
            .token()
            .map(str::to_string);

        let Some(token) = token else {
            debug!(action = kind.name(), "Rejected locally: not logged in");
            return self.show_feedback(UiMessage::error(kind.requires_login())).await;
        };

        let result = match kind {
            Registration::Signup => self.inner.api.signup(activity, email, &token).await,
            Registration::Unregister => self.inner.api.unregister(activity, email, &token).await,
        };

        match result {
            Ok(text) => {
                info!(action = kind.name(), activity = %activity, email = %email, "Request accepted");
                if matches!(kind, Registration::Signup) {
                    self.inner.page.write().await.signup_form.reset();
                }
                let message = self.show_feedback(UiMessage::success(text)).await;
                self.fetch_activities().await;
                message
            }
            Err(e) => {
                let message = rejection_message(&e, kind.transport_failure());
                if e.is_transport() {
                    error!(action = kind.name(), error = %e, "Request failed");
                } else {
                    e.log();
                }
                self.show_feedback(message).await
            }
        }
    }

    /// Show the feedback banner and schedule it to hide
    async fn show_feedback(&self, message: UiMessage) -> UiMessage {
        let generation = self.inner.page.write().await.message.show(message.clone());
        self.schedule_feedback_hide(generation);
        message
    }

    fn schedule_feedback_hide(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        // Counted from when the message was shown, not from when the task first runs
        let deadline = Instant::now() + self.inner.timings.feedback_hide;

        self.track(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if inner.page.write().await.message.hide_if_current(generation) {
                debug!(generation, "Feedback message hidden");
            }
        }));
    }

    fn schedule_login_confirm(&self) {
        let controller = self.clone();
        let deadline = Instant::now() + self.inner.timings.login_confirm;

        self.track(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            controller.inner.page.write().await.close_login_modal();
            controller.update_auth_ui().await;
            controller.fetch_activities().await;
        }));
    }

    fn track(&self, handle: JoinHandle<()>) {
        match self.inner.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|task| !task.is_finished());
                pending.push(handle);
            }
            Err(_) => warn!("Pending task list poisoned; timer left untracked"),
        }
    }

    fn take_pending(&self) -> Vec<JoinHandle<()>> {
        self.inner
            .pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    /// Wait until every scheduled hide/refresh has run
    pub async fn wait_idle(&self) {
        loop {
            let handles = self.take_pending();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Scheduled page task failed");
                }
            }
        }
    }

    /// Drop every scheduled hide/refresh without running it
    pub fn shutdown(&self) {
        for handle in self.take_pending() {
            handle.abort();
        }
    }
}

/// Feedback for a failed signup/unregister
fn rejection_message(error: &SignupError, transport_failure: &str) -> UiMessage {
    match error {
        SignupError::Rejected { .. } => UiMessage::error(error.detail().unwrap_or(GENERIC_REJECTION)),
        _ => UiMessage::error(transport_failure),
    }
}

/// Build a controller from configuration using the HTTP client
pub fn from_config(
    config: &ClientConfig,
    store: Arc<dyn KeyValueStore>,
) -> SignupResult<UiController> {
    let api = crate::api::HttpSignupApi::new(crate::api::ApiClientConfig::from(config))?;
    Ok(UiController::new(Arc::new(api), store, Timings::from(config)))
}
