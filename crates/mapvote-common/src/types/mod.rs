//! Data types exchanged with the election API

pub mod captcha;
pub mod constituency;
pub mod news;
pub mod stats;
pub mod tally;
pub mod vote;

pub use captcha::{CaptchaConfig, CaptchaProvider};
pub use constituency::{Candidate, ConstituencyDetail, ConstituencySummary, Leader};
pub use news::{NewsFeed, NewsItem};
pub use stats::{ProjectionMeta, ProjectionOutcome, SeatLeadership, StatsSnapshot, TopSeat};
pub use tally::{Standing, TallyMap};
pub use vote::{VoteReceipt, VoteRequest};

/// Sequential constituency number, unique per seat.
pub type ConstituencyNo = u32;

/// Candidate identifier as issued by the API.
pub type CandidateId = String;
