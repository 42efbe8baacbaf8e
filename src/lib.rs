//! Chat Registry Library
//!
//! A small user registry with password login and one shared chat room.
//!
//! # Features
//! - User registration with username rules and roles
//! - Argon2id password hashing and login
//! - A shared chat room: join, send, leave
//! - Structured reports for every room event
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RoomDispatcher` is the actor that owns room membership
//! - Sessions submit events through a cloneable `DispatcherHandle`
//! - No locks on the membership - all changes go through the dispatcher loop
//! - Reports go through a bounded queue to a pool of report workers, so their
//!   order is not guaranteed and a stalled sink drops reports instead of buffering
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use chat_registry::{spawn_dispatcher, ChatSession, DispatcherConfig, TracingSink};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (handle, task) =
//!         spawn_dispatcher(&DispatcherConfig::default(), Arc::new(TracingSink)).unwrap();
//!
//!     let session = ChatSession::join("alice", handle.clone()).unwrap();
//!     session.send("hello").unwrap();
//!     session.leave().unwrap();
//!
//!     drop(handle);
//!     let membership = task.await.unwrap();
//!     assert!(membership.is_empty());
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod password;
pub mod registry;
pub mod report;
pub mod room;
pub mod service;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use config::{AccountPolicy, CliPrompts, Config, DispatcherConfig, HashConfig, ReportFormat};
pub use dispatcher::{spawn_dispatcher, DispatcherHandle, RoomDispatcher};
pub use error::{AppError, AuthError, ConfigError, RegistryError, ReportError, SubmitError};
pub use message::{ChatMessage, EventKind, Report};
pub use password::PasswordHasher;
pub use registry::{InMemoryUserRepository, NewUser, User, UserRepository};
pub use report::{open_sink, ChannelSink, JsonLinesSink, ReportSink, TracingSink};
pub use room::RoomMembership;
pub use service::UserService;
pub use session::ChatSession;
pub use types::{Role, SessionId, UserId};
