//! User-facing strings in the two supported languages.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use mapvote_common::{ConstituencySummary, Error};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Bn,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Bn => "bn",
        }
    }

    /// Seat name as it should be shown in this language.
    pub fn seat_name<'a>(&self, seat: &'a ConstituencySummary) -> &'a str {
        match (self, seat.seat_bn.as_deref()) {
            (Language::Bn, Some(local)) if !local.is_empty() => local,
            _ => &seat.seat,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "bn" => Ok(Language::Bn),
            other => Err(Error::Config(format!("unsupported language: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    VoteRecorded,
    AlreadyVoted,
    VoteFailed,
    SeatsFound,
    LoadingSeat,
    SelectConstituency,
    StatusNoVotes,
    StatusTied,
    StatusLeading,
    Constituency,
    TotalVotes,
    Dashboard,
    Refreshing,
    UpdatedAt,
    SeatsReporting,
    TiedSeats,
    NoVoteSeats,
    TopSeats,
    Projection,
    ProjectedWinner,
    ProjectionTie,
    ProjectionInsufficient,
    VotesByAlliance,
    VotesByParty,
    SeatsByAlliance,
    SeatsByParty,
    SeatResult,
    Headlines,
    NewsDisclaimer,
}

impl Text {
    pub fn render(self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.english(),
            Language::Bn => self.bangla(),
        }
    }

    fn english(self) -> &'static str {
        match self {
            Text::VoteRecorded => "Vote recorded. Thank you.",
            Text::AlreadyVoted => "You already voted from this device/browser.",
            Text::VoteFailed => "Vote failed",
            Text::SeatsFound => "seats found",
            Text::LoadingSeat => "Loading seat details…",
            Text::SelectConstituency => "Select a constituency",
            Text::StatusNoVotes => "No votes yet",
            Text::StatusTied => "Tied",
            Text::StatusLeading => "leading",
            Text::Constituency => "Constituency",
            Text::TotalVotes => "Total Votes",
            Text::Dashboard => "Election Dashboard",
            Text::Refreshing => "Refreshing…",
            Text::UpdatedAt => "Updated at",
            Text::SeatsReporting => "Seats Reporting",
            Text::TiedSeats => "Tied Seats",
            Text::NoVoteSeats => "No Votes",
            Text::TopSeats => "Top 10 Seats by Votes",
            Text::Projection => "Projection (Seats)",
            Text::ProjectedWinner => "Projected winner",
            Text::ProjectionTie => "Projected tie",
            Text::ProjectionInsufficient => "Insufficient data for projection.",
            Text::VotesByAlliance => "Votes by Alliance",
            Text::VotesByParty => "Votes by Party",
            Text::SeatsByAlliance => "Seats Leading by Alliance",
            Text::SeatsByParty => "Seats Leading by Party",
            Text::SeatResult => "Seat Result",
            Text::Headlines => "Latest Headlines",
            Text::NewsDisclaimer => "Sources are external news outlets.",
        }
    }

    fn bangla(self) -> &'static str {
        match self {
            Text::VoteRecorded => "ভোট গ্রহণ করা হয়েছে। ধন্যবাদ।",
            Text::AlreadyVoted => "আপনি ইতিমধ্যে এই ডিভাইস থেকে ভোট দিয়েছেন।",
            Text::VoteFailed => "ভোট ব্যর্থ হয়েছে",
            Text::SeatsFound => "টি আসন পাওয়া গেছে",
            Text::LoadingSeat => "আসনের তথ্য লোড হচ্ছে…",
            Text::SelectConstituency => "একটি আসন নির্বাচন করুন",
            Text::StatusNoVotes => "এখনও কোনো ভোট নেই",
            Text::StatusTied => "সমতা",
            Text::StatusLeading => "অগ্রগামী",
            Text::Constituency => "আসন",
            Text::TotalVotes => "মোট ভোট",
            Text::Dashboard => "নির্বাচন ড্যাশবোর্ড",
            Text::Refreshing => "আপডেট হচ্ছে…",
            Text::UpdatedAt => "আপডেট সময়",
            Text::SeatsReporting => "রিপোর্টিং আসন",
            Text::TiedSeats => "সমতা আসন",
            Text::NoVoteSeats => "কোনো ভোট নেই",
            Text::TopSeats => "সর্বোচ্চ ভোটের শীর্ষ ১০ আসন",
            Text::Projection => "সম্ভাব্য আসন (প্রক্ষেপণ)",
            Text::ProjectedWinner => "সম্ভাব্য বিজয়ী",
            Text::ProjectionTie => "সম্ভাব্য সমতা",
            Text::ProjectionInsufficient => "প্রক্ষেপণের জন্য পর্যাপ্ত তথ্য নেই।",
            Text::VotesByAlliance => "জোটভিত্তিক ভোট",
            Text::VotesByParty => "দলভিত্তিক ভোট",
            Text::SeatsByAlliance => "জোটভিত্তিক লিডিং আসন",
            Text::SeatsByParty => "দলভিত্তিক লিডিং আসন",
            Text::SeatResult => "আসনের ফলাফল",
            Text::Headlines => "সর্বশেষ শিরোনাম",
            Text::NewsDisclaimer => "সংবাদ উৎস বাইরের সাইট।",
        }
    }
}
