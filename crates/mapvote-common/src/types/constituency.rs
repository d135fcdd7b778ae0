use serde::{Deserialize, Serialize};

use super::{CandidateId, ConstituencyNo, TallyMap};

/// Directory entry for one seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencySummary {
    pub constituency_no: ConstituencyNo,
    pub seat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_bn: Option<String>,
    #[serde(default)]
    pub division: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_bn: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
}

impl ConstituencySummary {
    /// Case-insensitive substring match on the primary or localized seat name.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.seat.to_lowercase().contains(&needle)
            || self
                .seat_bn
                .as_deref()
                .is_some_and(|alt| alt.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: CandidateId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_bn: Option<String>,
    #[serde(default)]
    pub party: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_bn: Option<String>,
    #[serde(default)]
    pub alliance_key: Option<String>,
}

/// Server's view of who leads a seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub candidate_id: CandidateId,
    pub name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub alliance_key: Option<String>,
    pub votes: u64,
}

/// Full record for a selected seat, including its current tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencyDetail {
    pub constituency_no: ConstituencyNo,
    pub seat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_bn: Option<String>,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub totals: TallyMap,
    #[serde(default)]
    pub leader: Option<Leader>,
    #[serde(default)]
    pub is_tied: bool,
}

impl ConstituencyDetail {
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.candidate_id == candidate_id)
    }

    /// Notes with blank strings treated as absent.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }
}
