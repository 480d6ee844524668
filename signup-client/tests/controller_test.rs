//! End-to-end behavior of the page controller against an in-memory server

mod common;

use common::{FakeApi, PASSWORD, TEACHER, TOKEN};
use signup_client::page::{ACTIVITIES_FAILED, NOT_LOGGED_IN};
use signup_client::{
    render_page, ActivitiesView, ClickTarget, KeyValueStore, MemoryStore, MessageKind, Timings,
    UiController,
};
use signup_core::{AUTH_TOKEN_KEY, CURRENT_USERNAME_KEY};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    api: Arc<FakeApi>,
    store: Arc<MemoryStore>,
    controller: UiController,
}

impl Harness {
    fn new() -> Self {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(MemoryStore::new());
        let controller = UiController::new(api.clone(), store.clone(), Timings::default());
        Self {
            api,
            store,
            controller,
        }
    }

    fn with_stored_session() -> Self {
        let harness = Self::new();
        harness.store.set(AUTH_TOKEN_KEY, TOKEN).unwrap();
        harness.store.set(CURRENT_USERNAME_KEY, TEACHER).unwrap();
        harness
    }
}

/// Let spawned timer tasks whose deadline has passed run to completion
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_without_session() {
    let h = Harness::new();
    h.controller.start().await;

    let page = h.controller.page().await;
    assert_eq!(page.user_status, NOT_LOGGED_IN);
    assert_eq!(page.auth_button_label, "Login");
    assert!(!page.signup_visible);
    assert_eq!(page.cards().len(), 3);
    assert!(page.unregister_actions().is_empty());
    assert_eq!(
        page.activity_options,
        vec!["Chess Club", "Programming Class", "Drama Club"]
    );
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 1);

    let html = render_page(&page).unwrap();
    assert!(html.contains("Not logged in"));
    assert!(!html.contains("delete-btn"));
}

#[tokio::test(start_paused = true)]
async fn test_start_with_stored_session() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    let page = h.controller.page().await;
    assert_eq!(page.user_status, "Logged in as: mrodriguez");
    assert_eq!(page.auth_button_label, "Logout");
    assert!(page.signup_visible);
    assert_eq!(page.unregister_actions().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_start_clears_partial_session() {
    let h = Harness::new();
    h.store.set(CURRENT_USERNAME_KEY, TEACHER).unwrap();
    h.controller.start().await;

    assert!(!h.controller.is_authenticated().await);
    assert!(h.store.keys().is_empty());
    assert!(!h.controller.page().await.signup_visible);
}

#[tokio::test(start_paused = true)]
async fn test_spots_left_can_go_negative() {
    let h = Harness::new();
    h.controller.start().await;

    let page = h.controller.page().await;
    let programming = page
        .cards()
        .iter()
        .find(|card| card.name == "Programming Class")
        .unwrap();
    assert_eq!(programming.spots_left, -1);
}

#[tokio::test(start_paused = true)]
async fn test_login_success_refreshes_after_delay() {
    let h = Harness::new();
    h.controller.start().await;
    h.controller.auth_button().await;
    assert!(h.controller.page().await.login_modal_visible);

    let message = h.controller.login(TEACHER, PASSWORD).await;
    assert_eq!(message.kind, MessageKind::Success);
    assert_eq!(message.text, "Login successful!");

    // Persisted immediately, page not yet updated
    assert_eq!(h.store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some(TOKEN));
    assert_eq!(
        h.store.get(CURRENT_USERNAME_KEY).unwrap().as_deref(),
        Some(TEACHER)
    );
    let page = h.controller.page().await;
    assert!(page.login_modal_visible);
    assert!(!page.signup_visible);
    assert_eq!(page.login_message.current().unwrap().text, "Login successful!");

    advance(999).await;
    assert!(h.controller.page().await.login_modal_visible);
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 1);

    advance(2).await;

    let page = h.controller.page().await;
    assert!(!page.login_modal_visible);
    assert!(!page.login_message.is_visible());
    assert_eq!(page.login_form.username, "");
    assert!(page.signup_visible);
    assert_eq!(page.user_status, "Logged in as: mrodriguez");
    assert_eq!(page.unregister_actions().len(), 4);
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_login_with_wrong_password() {
    let h = Harness::new();
    h.controller.start().await;
    h.controller.auth_button().await;

    let message = h.controller.login(TEACHER, "wrong").await;
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.text, "Invalid username or password");

    let page = h.controller.page().await;
    assert!(page.login_modal_visible);
    assert_eq!(
        page.login_message.current().unwrap().text,
        "Invalid username or password"
    );
    assert!(h.store.keys().is_empty());
    assert!(!h.controller.is_authenticated().await);
}

#[tokio::test(start_paused = true)]
async fn test_login_when_server_unreachable() {
    let h = Harness::new();
    h.controller.start().await;
    h.api.set_offline(true);

    let message = h.controller.login(TEACHER, PASSWORD).await;
    assert_eq!(message.text, "Login failed. Please try again.");
    assert!(h.store.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_signup_requires_login_without_network_call() {
    let h = Harness::new();
    h.controller.start().await;
    let calls_before = h.api.network_calls();

    let message = h
        .controller
        .signup("new@mergington.edu", "Chess Club")
        .await;
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.text, "You must be logged in to register students.");
    assert_eq!(h.api.network_calls(), calls_before);

    advance(4999).await;
    assert!(h.controller.page().await.message.is_visible());

    advance(2).await;
    assert!(!h.controller.page().await.message.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_unregister_requires_login_without_network_call() {
    let h = Harness::new();
    h.controller.start().await;

    let message = h
        .controller
        .unregister("Chess Club", "michael@mergington.edu")
        .await;
    assert_eq!(message.text, "You must be logged in to unregister students.");
    assert_eq!(h.api.unregister_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        h.api.participants("Chess Club"),
        vec!["michael@mergington.edu", "daniel@mergington.edu"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_signup_success_resets_form_and_refreshes() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    let message = h
        .controller
        .signup("new@mergington.edu", "Drama Club")
        .await;
    assert_eq!(message.kind, MessageKind::Success);
    assert_eq!(message.text, "Signed up new@mergington.edu for Drama Club");

    let page = h.controller.page().await;
    assert_eq!(page.signup_form.email, "");
    assert_eq!(page.signup_form.activity, "");
    assert_eq!(page.message.current().unwrap().kind, MessageKind::Success);
    let drama = page
        .cards()
        .iter()
        .find(|card| card.name == "Drama Club")
        .unwrap();
    assert_eq!(drama.participants.len(), 1);
    assert_eq!(drama.spots_left, 19);
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_signup_rejection_keeps_form() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    let message = h
        .controller
        .signup("michael@mergington.edu", "Chess Club")
        .await;
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.text, "Student is already signed up");

    let page = h.controller.page().await;
    assert_eq!(page.signup_form.email, "michael@mergington.edu");
    assert_eq!(page.signup_form.activity, "Chess Club");
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_signup_transport_failure() {
    let h = Harness::with_stored_session();
    h.controller.start().await;
    h.api.set_offline(true);

    let message = h
        .controller
        .signup("new@mergington.edu", "Chess Club")
        .await;
    assert_eq!(message.text, "Failed to register student. Please try again.");

    advance(5001).await;
    assert!(!h.controller.page().await.message.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_unregister_via_rendered_action() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    let page = h.controller.page().await;
    let action = page
        .unregister_actions()
        .into_iter()
        .find(|action| action.email == "daniel@mergington.edu")
        .cloned()
        .unwrap();
    assert_eq!(action.activity, "Chess Club");

    let message = h.controller.activate(&action).await;
    assert_eq!(
        message.text,
        "Unregistered daniel@mergington.edu from Chess Club"
    );
    assert_eq!(
        h.api.participants("Chess Club"),
        vec!["michael@mergington.edu"]
    );

    let page = h.controller.page().await;
    assert!(page
        .unregister_actions()
        .iter()
        .all(|action| action.email != "daniel@mergington.edu"));
}

#[tokio::test(start_paused = true)]
async fn test_unregister_rejected_with_detail() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    let message = h
        .controller
        .unregister("Chess Club", "nobody@mergington.edu")
        .await;
    assert_eq!(message.text, "Student is not signed up for this activity");
    assert_eq!(message.kind, MessageKind::Error);
}

#[tokio::test(start_paused = true)]
async fn test_newer_feedback_survives_older_timer() {
    let h = Harness::with_stored_session();
    h.controller.start().await;

    h.controller
        .signup("michael@mergington.edu", "Chess Club")
        .await;
    advance(3000).await;

    let second = h
        .controller
        .signup("new@mergington.edu", "Chess Club")
        .await;
    advance(2500).await;

    // First timer fired at 5000 ms but the second message is newer
    let page = h.controller.page().await;
    assert_eq!(page.message.current(), Some(&second));

    advance(3000).await;
    assert!(!h.controller.page().await.message.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_close_and_backdrop_hide_login_modal() {
    let h = Harness::new();
    h.controller.start().await;

    h.controller.auth_button().await;
    h.controller.login(TEACHER, "wrong").await;
    h.controller.close_login_modal().await;
    let page = h.controller.page().await;
    assert!(!page.login_modal_visible);
    assert!(!page.login_message.is_visible());

    h.controller.auth_button().await;
    h.controller.set_login_form(TEACHER, "typed").await;
    h.controller.click(ClickTarget::UserMenu).await;
    assert!(h.controller.page().await.login_modal_visible);

    h.controller.click(ClickTarget::LoginModalBackdrop).await;
    let page = h.controller.page().await;
    assert!(!page.login_modal_visible);
    assert_eq!(page.login_form.password, "");
}

#[tokio::test(start_paused = true)]
async fn test_user_menu_toggle_and_outside_click() {
    let h = Harness::new();
    h.controller.start().await;

    h.controller.toggle_user_menu().await;
    assert!(h.controller.page().await.user_menu_visible);

    h.controller.click(ClickTarget::UserIcon).await;
    h.controller.click(ClickTarget::UserMenu).await;
    assert!(h.controller.page().await.user_menu_visible);

    h.controller.click(ClickTarget::Elsewhere).await;
    assert!(!h.controller.page().await.user_menu_visible);

    h.controller.toggle_user_menu().await;
    h.controller.toggle_user_menu().await;
    assert!(!h.controller.page().await.user_menu_visible);
}

#[tokio::test(start_paused = true)]
async fn test_auth_button_logs_out() {
    let h = Harness::with_stored_session();
    h.controller.start().await;
    h.controller.toggle_user_menu().await;

    h.controller.auth_button().await;

    assert_eq!(h.api.logout_calls.load(Ordering::SeqCst), 1);
    assert!(h.store.keys().is_empty());
    let page = h.controller.page().await;
    assert_eq!(page.user_status, NOT_LOGGED_IN);
    assert!(!page.signup_visible);
    assert!(!page.user_menu_visible);
    assert!(!page.login_modal_visible);
    assert!(page.unregister_actions().is_empty());
    assert_eq!(h.api.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_logout_when_server_unreachable() {
    let h = Harness::with_stored_session();
    h.controller.start().await;
    h.api.set_offline(true);

    h.controller.logout().await;

    assert!(h.store.keys().is_empty());
    let page = h.controller.page().await;
    assert!(!page.signup_visible);
    assert_eq!(page.activities, ActivitiesView::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_shows_static_text() {
    let h = Harness::new();
    h.api.set_offline(true);
    h.controller.start().await;

    let page = h.controller.page().await;
    assert_eq!(page.activities, ActivitiesView::Failed);
    assert!(page.activity_options.is_empty());

    let html = render_page(&page).unwrap();
    assert!(html.contains(ACTIVITIES_FAILED));
}

#[tokio::test(start_paused = true)]
async fn test_hide_delay_counts_from_when_message_was_shown() {
    let h = Harness::new();
    h.controller.start().await;

    // No yield between showing the message and moving the clock
    h.controller
        .signup("new@mergington.edu", "Chess Club")
        .await;
    tokio::time::advance(Duration::from_millis(5001)).await;
    settle().await;
    assert!(!h.controller.page().await.message.is_visible());

    h.controller.auth_button().await;
    h.controller.login(TEACHER, PASSWORD).await;
    tokio::time::advance(Duration::from_millis(1001)).await;
    settle().await;
    let page = h.controller.page().await;
    assert!(!page.login_modal_visible);
    assert!(page.signup_visible);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_timers() {
    let h = Harness::new();
    h.controller.start().await;
    h.controller
        .signup("new@mergington.edu", "Chess Club")
        .await;

    h.controller.shutdown();
    advance(6000).await;
    assert!(h.controller.page().await.message.is_visible());
}
