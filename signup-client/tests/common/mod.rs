//! Shared test fixtures: an in-memory stand-in for the activities server

#![allow(dead_code)]

use async_trait::async_trait;
use signup_client::{Activity, ActivitySnapshot, Session, SignupApi, SignupError, SignupResult};
use signup_core::{network_error, ErrorContext, NamedActivity};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEACHER: &str = "mrodriguez";
pub const PASSWORD: &str = "art123";
pub const TOKEN: &str = "token-mrodriguez";

pub fn seed_activities() -> Vec<NamedActivity> {
    vec![
        NamedActivity {
            name: "Chess Club".to_string(),
            activity: Activity {
                description: "Learn strategies and compete in chess tournaments".to_string(),
                schedule: "Fridays, 3:30 PM - 5:00 PM".to_string(),
                max_participants: 12,
                participants: vec![
                    "michael@mergington.edu".to_string(),
                    "daniel@mergington.edu".to_string(),
                ],
            },
        },
        NamedActivity {
            name: "Programming Class".to_string(),
            activity: Activity {
                description: "Learn programming fundamentals".to_string(),
                schedule: "Tuesdays and Thursdays, 3:30 PM - 4:30 PM".to_string(),
                max_participants: 1,
                participants: vec![
                    "emma@mergington.edu".to_string(),
                    "sophia@mergington.edu".to_string(),
                ],
            },
        },
        NamedActivity {
            name: "Drama Club".to_string(),
            activity: Activity {
                description: "Act, direct and produce plays".to_string(),
                schedule: "Wednesdays, 4:00 PM - 5:30 PM".to_string(),
                max_participants: 20,
                participants: vec![],
            },
        },
    ]
}

/// Counts every call and behaves like the real server for the happy and sad paths
#[derive(Default)]
pub struct FakeApi {
    pub activities: Mutex<Vec<NamedActivity>>,
    pub offline: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub signup_calls: AtomicUsize,
    pub unregister_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            activities: Mutex::new(seed_activities()),
            ..Default::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn network_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
            + self.login_calls.load(Ordering::SeqCst)
            + self.logout_calls.load(Ordering::SeqCst)
            + self.signup_calls.load(Ordering::SeqCst)
            + self.unregister_calls.load(Ordering::SeqCst)
    }

    pub fn participants(&self, activity: &str) -> Vec<String> {
        self.activities
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.name == activity)
            .map(|entry| entry.activity.participants.clone())
            .unwrap_or_default()
    }

    fn check_online(&self) -> SignupResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(network_error!("connection refused", "fake_api"))
        } else {
            Ok(())
        }
    }

    fn reject(status: u16, detail: &str) -> SignupError {
        SignupError::Rejected {
            status,
            detail: Some(detail.to_string()),
            context: ErrorContext::new("fake_api"),
        }
    }

    fn check_token(token: &str) -> SignupResult<()> {
        if token == TOKEN {
            Ok(())
        } else {
            Err(Self::reject(401, "Invalid or expired token"))
        }
    }
}

#[async_trait]
impl SignupApi for FakeApi {
    async fn fetch_activities(&self) -> SignupResult<ActivitySnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(ActivitySnapshot::new(self.activities.lock().unwrap().clone()))
    }

    async fn login(&self, username: &str, password: &str) -> SignupResult<Session> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if username == TEACHER && password == PASSWORD {
            Ok(Session::new(TOKEN, TEACHER))
        } else {
            Err(SignupError::Rejected {
                status: 401,
                detail: None,
                context: ErrorContext::new("fake_api"),
            })
        }
    }

    async fn logout(&self, _token: &str) -> SignupResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()
    }

    async fn signup(&self, activity: &str, email: &str, token: &str) -> SignupResult<String> {
        self.signup_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Self::check_token(token)?;

        let mut activities = self.activities.lock().unwrap();
        let entry = activities
            .iter_mut()
            .find(|entry| entry.name == activity)
            .ok_or_else(|| Self::reject(404, "Activity not found"))?;

        if entry.activity.participants.iter().any(|p| p == email) {
            return Err(Self::reject(400, "Student is already signed up"));
        }
        entry.activity.participants.push(email.to_string());
        Ok(format!("Signed up {} for {}", email, activity))
    }

    async fn unregister(&self, activity: &str, email: &str, token: &str) -> SignupResult<String> {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Self::check_token(token)?;

        let mut activities = self.activities.lock().unwrap();
        let entry = activities
            .iter_mut()
            .find(|entry| entry.name == activity)
            .ok_or_else(|| Self::reject(404, "Activity not found"))?;

        let before = entry.activity.participants.len();
        entry.activity.participants.retain(|p| p != email);
        if entry.activity.participants.len() == before {
            return Err(Self::reject(
                400,
                "Student is not signed up for this activity",
            ));
        }
        Ok(format!("Unregistered {} from {}", email, activity))
    }
}
