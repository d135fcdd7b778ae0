use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Candidate, ConstituencyNo};

/// Bucket names the server adds to `seats_leading_by_alliance`.
pub const TIED_BUCKET: &str = "tied";
pub const NO_VOTES_BUCKET: &str = "no_votes";

/// Aggregate results as served by `GET /api/results/overall`.
///
/// Every rollup here is computed server-side; the client only derives
/// display figures from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_votes: u64,
    pub votes_by_alliance: BTreeMap<String, u64>,
    pub votes_by_party: BTreeMap<String, u64>,
    pub seats_leading_by_alliance: BTreeMap<String, u64>,
    pub seats_leading_by_party: BTreeMap<String, u64>,
    pub constituencies_count: u64,
    pub disabled_count: u64,
    pub leaders_by_constituency: BTreeMap<ConstituencyNo, SeatLeadership>,
    pub top_seats_by_votes: Vec<TopSeat>,
    pub projection_by_party: BTreeMap<String, u64>,
    pub projection_meta: Option<ProjectionMeta>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatLeadership {
    #[serde(default)]
    pub leader: Option<Candidate>,
    #[serde(default)]
    pub is_tied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSeat {
    pub constituency_no: ConstituencyNo,
    pub seat: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub total_votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionMeta {
    pub seats_total: u64,
    pub seats_current: u64,
    pub remaining: u64,
    pub method: String,
}

/// Reading of the served seat projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Winner { party: String, seats: u64 },
    Tie { parties: Vec<String>, seats: u64 },
    Insufficient,
}

impl StatsSnapshot {
    pub fn tied_seats(&self) -> u64 {
        self.seats_leading_by_alliance
            .get(TIED_BUCKET)
            .copied()
            .unwrap_or(0)
    }

    pub fn no_vote_seats(&self) -> u64 {
        self.seats_leading_by_alliance
            .get(NO_VOTES_BUCKET)
            .copied()
            .unwrap_or(0)
    }

    /// Seats with a single leader.
    pub fn reporting_seats(&self) -> u64 {
        self.constituencies_count
            .saturating_sub(self.disabled_count)
            .saturating_sub(self.tied_seats())
            .saturating_sub(self.no_vote_seats())
    }

    pub fn projected_winner(&self) -> ProjectionOutcome {
        let Some(max) = self.projection_by_party.values().copied().max() else {
            return ProjectionOutcome::Insufficient;
        };
        if max == 0 {
            return ProjectionOutcome::Insufficient;
        }

        let parties: Vec<String> = self
            .projection_by_party
            .iter()
            .filter(|(_, seats)| **seats == max)
            .map(|(party, _)| party.clone())
            .collect();

        match parties.as_slice() {
            [party] => ProjectionOutcome::Winner {
                party: party.clone(),
                seats: max,
            },
            _ => ProjectionOutcome::Tie { parties, seats: max },
        }
    }
}
