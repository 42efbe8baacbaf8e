//! Chat session
//!
//! One per logged-in user taking part in the room. Wraps a
//! `DispatcherHandle` so the user's name is attached to every event.

use tracing::{debug, info};

use crate::dispatcher::DispatcherHandle;
use crate::error::SubmitError;
use crate::types::SessionId;

/// A user's presence in the chat room
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    username: String,
    dispatcher: DispatcherHandle,
}

impl ChatSession {
    /// Submit a join and return the session
    ///
    /// Fails if the join queue is full; nothing is submitted in that case.
    pub fn join(
        username: impl Into<String>,
        dispatcher: DispatcherHandle,
    ) -> Result<Self, SubmitError> {
        let username = username.into();
        dispatcher.submit_join(username.clone())?;

        let id = SessionId::new();
        info!("Session {} opened for {}", id, username);
        Ok(Self {
            id,
            username,
            dispatcher,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Send a message to the room
    pub fn send(&self, body: impl Into<String>) -> Result<(), SubmitError> {
        debug!("Session {} sending message", self.id);
        self.dispatcher
            .submit_message(self.username.clone(), body)
    }

    /// Leave the room and close the session
    ///
    /// On failure the session is handed back so the caller can retry.
    pub fn leave(self) -> Result<(), (Self, SubmitError)> {
        match self.dispatcher.submit_leave(self.username.clone()) {
            Ok(()) => {
                info!("Session {} closed for {}", self.id, self.username);
                Ok(())
            }
            Err(e) => Err((self, e)),
        }
    }
}
