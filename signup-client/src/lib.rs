//! Signup Client - page controller for the activity sign-up service
//!
//! Holds the logged-in session, renders the activity list and forwards login,
//! logout, signup and unregister actions to the server's REST API.

pub mod api;
pub mod controller;
pub mod page;
pub mod render;
pub mod session;
pub mod store;

pub use api::{ApiClientConfig, HttpSignupApi, SignupApi};
pub use controller::{from_config, ClickTarget, Timings, UiController};
pub use page::{ActivitiesView, Banner, PageState};
pub use render::{render_page, render_text, ActivityCard, TextPage, UnregisterAction};
pub use session::SessionManager;
pub use store::{FileStore, KeyValueStore, MemoryStore};

// Re-export the shared types so callers need only this crate
pub use signup_core::{
    Activity, ActivitySnapshot, ClientConfig, MessageKind, Session, SignupError, SignupResult,
    UiMessage,
};
