use serde::{Deserialize, Serialize};

use super::{CandidateId, ConstituencyNo, Leader, TallyMap};

/// Body of `POST /api/vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub constituency_no: ConstituencyNo,
    pub candidate_id: CandidateId,
    pub captcha_token: String,
}

/// Successful vote response carrying the seat's fresh tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_tallies: TallyMap,
    #[serde(default)]
    pub leader: Option<Leader>,
    #[serde(default)]
    pub is_tied: bool,
}
