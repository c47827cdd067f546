//! Test doubles for the remote API and notifications.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::context::{ApiMessage, UserApi};
use crate::error::{Result, UsersError};
use crate::notify::Notifier;
use crate::types::{Draft, User, UserId};

pub fn sample_user(id: &str) -> User {
    User {
        id: UserId::from(id),
        name: "Ana Pérez".to_string(),
        email: "ana@example.com".to_string(),
        phone: "912345678".to_string(),
        region: "Valparaíso".to_string(),
        commune: "Viña del Mar".to_string(),
    }
}

pub fn valid_draft() -> Draft {
    Draft {
        id: None,
        name: "Ana Pérez".to_string(),
        email: "ana@example.com".to_string(),
        phone: "912345678".to_string(),
        region: "Metropolitana".to_string(),
        commune: "Santiago".to_string(),
    }
}

#[derive(Clone)]
pub enum Reply {
    Message(ApiMessage),
    Transport(String),
}

/// In-memory `UserApi` that records calls and answers with canned replies.
pub struct StubApi {
    users: Mutex<Vec<User>>,
    reply: Mutex<Reply>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    last_draft: Mutex<Option<Draft>>,
}

impl StubApi {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            reply: Mutex::new(Reply::Message(ApiMessage::ok("saved"))),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            last_draft: Mutex::new(None),
        }
    }

    pub fn replying(self, reply: Reply) -> Self {
        *self.reply.lock().unwrap() = reply;
        self
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn set_users(&self, users: Vec<User>) {
        *self.users.lock().unwrap() = users;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn last_draft(&self) -> Option<Draft> {
        self.last_draft.lock().unwrap().clone()
    }

    fn answer(&self, draft: &Draft) -> Result<ApiMessage> {
        *self.last_draft.lock().unwrap() = Some(draft.clone());
        match self.reply.lock().unwrap().clone() {
            Reply::Message(message) => Ok(message),
            Reply::Transport(message) => Err(UsersError::ApiError {
                status: 503,
                message,
            }),
        }
    }
}

#[async_trait]
impl UserApi for StubApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, draft: &Draft) -> Result<ApiMessage> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(draft)
    }

    async fn update_user(&self, draft: &Draft) -> Result<ApiMessage> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::Error(message.to_string()));
    }
}
