// src/lib.rs

//! mapvote-client - headless client for the map-vote election demo
//!
//! Talks to the election REST API and holds the state the views render
//! from: the seat directory, the selected seat, the vote in progress, the
//! captcha widget and the polled results dashboard.

pub mod captcha;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod i18n;
pub mod results;
pub mod seat_loader;
pub mod session;
pub mod storage;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use captcha::{CaptchaHost, CaptchaLoader, MountOutcome, MountPoint, PresetTokenHost};
pub use directory::SeatDirectory;
pub use error::{ApiError, CaptchaError, SessionError};
pub use gateway::{ApiClient, ElectionApi};
pub use i18n::{Language, Text};
pub use results::ResultsPoller;
pub use seat_loader::{DetailSource, LoadState, SeatLoader};
pub use session::{SessionState, VoteFeedback, VoteSession};
pub use storage::PreferenceStore;
