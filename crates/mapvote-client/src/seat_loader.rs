//! Loading of one selected constituency's detail record.
//!
//! Every selection bumps a generation counter and the fetch it starts is
//! tagged with that generation. A fetch that resolves after a newer
//! selection is dropped, so only the currently selected seat is ever shown.

use std::sync::Arc;
use tokio::sync::RwLock;

use mapvote_common::{ConstituencyDetail, ConstituencyNo};

use crate::error::ApiError;
use crate::gateway::ElectionApi;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading { constituency_no: ConstituencyNo },
    Loaded(ConstituencyDetail),
    Failed { constituency_no: ConstituencyNo },
}

impl LoadState {
    pub fn detail(&self) -> Option<&ConstituencyDetail> {
        match self {
            LoadState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    /// Seat the state refers to, if any.
    pub fn constituency_no(&self) -> Option<ConstituencyNo> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { constituency_no } | LoadState::Failed { constituency_no } => {
                Some(*constituency_no)
            }
            LoadState::Loaded(detail) => Some(detail.constituency_no),
        }
    }
}

/// Identifies one selection; handed out by `SeatSlot::begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub constituency_no: ConstituencyNo,
}

/// Selection state for one view.
#[derive(Debug, Clone, Default)]
pub struct SeatSlot {
    state: LoadState,
    generation: u64,
}

impl SeatSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the current detail and enter `Loading` for a new selection.
    pub fn begin(&mut self, constituency_no: ConstituencyNo) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading { constituency_no };
        LoadTicket {
            generation: self.generation,
            constituency_no,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale and the
    /// result was discarded.
    pub fn finish(
        &mut self,
        ticket: &LoadTicket,
        result: Result<ConstituencyDetail, ApiError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale result for constituency {} (generation {} < {})",
                ticket.constituency_no,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(detail) => LoadState::Loaded(detail),
            Err(e) => {
                tracing::warn!(
                    "Failed to load constituency {}: {}",
                    ticket.constituency_no,
                    e
                );
                LoadState::Failed {
                    constituency_no: ticket.constituency_no,
                }
            }
        };
        true
    }
}

/// Which endpoint a loader reads seat detail from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    /// `/api/constituencies/{id}`, used by the vote view
    Ballot,
    /// `/api/results/constituency/{id}`, used by the results view
    Results,
}

impl DetailSource {
    pub async fn fetch<A: ElectionApi>(
        &self,
        api: &A,
        no: ConstituencyNo,
    ) -> Result<ConstituencyDetail, ApiError> {
        match self {
            DetailSource::Ballot => api.constituency(no).await,
            DetailSource::Results => api.constituency_results(no).await,
        }
    }
}

/// Stand-alone loader for views that only display a seat.
pub struct SeatLoader<A: ElectionApi> {
    api: Arc<A>,
    source: DetailSource,
    slot: RwLock<SeatSlot>,
}

impl<A: ElectionApi> SeatLoader<A> {
    pub fn new(api: Arc<A>, source: DetailSource) -> Self {
        Self {
            api,
            source,
            slot: RwLock::new(SeatSlot::new()),
        }
    }

    pub async fn select(&self, no: ConstituencyNo) -> LoadState {
        let ticket = self.slot.write().await.begin(no);
        let result = self.source.fetch(self.api.as_ref(), no).await;

        let mut slot = self.slot.write().await;
        slot.finish(&ticket, result);
        slot.state().clone()
    }

    pub async fn state(&self) -> LoadState {
        self.slot.read().await.state().clone()
    }
}
