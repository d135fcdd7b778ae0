use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CandidateId;

/// Vote counts for one seat, keyed by candidate id.
///
/// A tally is only ever replaced wholesale with what the server returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TallyMap(BTreeMap<CandidateId, u64>);

/// Who is ahead in a seat, derived from its tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Standing {
    NoVotes,
    Tied { votes: u64 },
    Leading { candidate_id: CandidateId, votes: u64 },
}

impl TallyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn votes_for(&self, candidate_id: &str) -> u64 {
        self.0.get(candidate_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn max_votes(&self) -> u64 {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateId, &u64)> {
        self.0.iter()
    }

    pub fn standing(&self) -> Standing {
        let max = self.max_votes();
        if max == 0 {
            return Standing::NoVotes;
        }

        let mut leaders = self.0.iter().filter(|(_, votes)| **votes == max);
        match (leaders.next(), leaders.next()) {
            (Some((candidate_id, _)), None) => Standing::Leading {
                candidate_id: candidate_id.clone(),
                votes: max,
            },
            _ => Standing::Tied { votes: max },
        }
    }

    /// Bar length for a candidate as a whole percentage of the seat maximum.
    pub fn bar_width(&self, candidate_id: &str) -> u8 {
        let max = self.max_votes();
        if max == 0 {
            return 0;
        }
        let ratio = self.votes_for(candidate_id) as f64 / max as f64;
        (ratio * 100.0).round() as u8
    }
}

impl FromIterator<(CandidateId, u64)> for TallyMap {
    fn from_iter<I: IntoIterator<Item = (CandidateId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
