//! Seat selection and vote submission for the vote view.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::RwLock;

use mapvote_common::{
    CandidateId, CaptchaConfig, CaptchaProvider, ConstituencyDetail, ConstituencyNo, Standing,
    TallyMap, VoteRequest,
};

use crate::captcha::{CaptchaLoader, MountPoint, PresetTokenHost};
use crate::error::{ApiError, CaptchaError, SessionError};
use crate::gateway::ElectionApi;
use crate::i18n::{Language, Text};
use crate::seat_loader::{DetailSource, LoadState, SeatSlot};

/// Outcome message shown after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteFeedback {
    Recorded,
    /// The server answered 409: this device has voted before
    AlreadyVoted,
    /// The server refused with its own explanation
    Rejected(String),
    /// Network failure or a refusal without any text
    Failed,
}

impl VoteFeedback {
    pub fn from_error(err: &ApiError) -> Self {
        if err.is_conflict() {
            return VoteFeedback::AlreadyVoted;
        }
        match err.message() {
            Some(message) => VoteFeedback::Rejected(message.to_string()),
            None => VoteFeedback::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, VoteFeedback::Recorded)
    }

    pub fn render(&self, lang: Language) -> String {
        match self {
            VoteFeedback::Recorded => Text::VoteRecorded.render(lang).to_string(),
            VoteFeedback::AlreadyVoted => Text::AlreadyVoted.render(lang).to_string(),
            VoteFeedback::Rejected(message) => message.clone(),
            VoteFeedback::Failed => Text::VoteFailed.render(lang).to_string(),
        }
    }
}

/// Everything the vote view renders from.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    slot: SeatSlot,
    selected_candidate: Option<CandidateId>,
    tallies: TallyMap,
    captcha_token: String,
    in_flight: bool,
    feedback: Option<VoteFeedback>,
}

impl SessionState {
    pub fn load_state(&self) -> &LoadState {
        self.slot.state()
    }

    pub fn detail(&self) -> Option<&ConstituencyDetail> {
        self.slot.state().detail()
    }

    pub fn selected_candidate(&self) -> Option<&str> {
        self.selected_candidate.as_deref()
    }

    pub fn tallies(&self) -> &TallyMap {
        &self.tallies
    }

    pub fn standing(&self) -> Standing {
        self.tallies.standing()
    }

    pub fn feedback(&self) -> Option<&VoteFeedback> {
        self.feedback.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// A seat is loaded, a candidate is chosen and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.detail().is_some() && self.selected_candidate.is_some() && !self.in_flight
    }
}

/// Marks a submission as outstanding until dropped, including when the
/// submitting future is cancelled mid-request.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct VoteSession<A: ElectionApi> {
    api: Arc<A>,
    state: RwLock<SessionState>,
    in_flight: AtomicBool,
}

impl<A: ElectionApi> VoteSession<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        let mut state = self.state.read().await.clone();
        state.in_flight = self.in_flight.load(Ordering::SeqCst);
        state
    }

    /// Select a seat and load its detail. Any earlier candidate choice and
    /// feedback message are cleared before the fetch starts.
    pub async fn select_seat(&self, no: ConstituencyNo) -> LoadState {
        let ticket = {
            let mut state = self.state.write().await;
            state.selected_candidate = None;
            state.feedback = None;
            state.tallies = TallyMap::new();
            state.slot.begin(no)
        };

        let result = DetailSource::Ballot.fetch(self.api.as_ref(), no).await;

        let mut state = self.state.write().await;
        let totals = result.as_ref().ok().map(|detail| detail.totals.clone());
        if state.slot.finish(&ticket, result) {
            if let Some(totals) = totals {
                state.tallies = totals;
            }
        }
        state.slot.state().clone()
    }

    pub async fn choose_candidate(&self, candidate_id: &str) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let detail = state.detail().ok_or(SessionError::NoSeatLoaded)?;
        if detail.candidate(candidate_id).is_none() {
            return Err(SessionError::UnknownCandidate {
                candidate_id: candidate_id.to_string(),
                constituency_no: detail.constituency_no,
            });
        }
        state.selected_candidate = Some(candidate_id.to_string());
        Ok(())
    }

    /// Store the token delivered by the captcha widget, possibly empty.
    pub async fn set_captcha_token(&self, token: impl Into<String>) {
        self.state.write().await.captcha_token = token.into();
    }

    /// Fetch the active captcha configuration, run its widget through
    /// `loader` and keep the delivered token for the next submission. When
    /// the configuration cannot be fetched the provider is taken as "none".
    pub async fn solve_captcha(
        &self,
        loader: &CaptchaLoader<PresetTokenHost>,
    ) -> Result<CaptchaProvider, CaptchaError> {
        let config = match self.api.captcha_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Captcha config unavailable, continuing without captcha: {}", e);
                CaptchaConfig::default()
            }
        };

        let token = loader.solve(&config, MountPoint::new("vote"))?;
        self.set_captcha_token(token).await;
        Ok(config.captcha_provider)
    }

    /// Submit the chosen candidate for the loaded seat.
    ///
    /// Tallies change only when the server confirms the vote, and then they
    /// are replaced with exactly what the server returned.
    pub async fn submit_vote(&self) -> Result<VoteFeedback, SessionError> {
        let (request, generation, _in_flight) = {
            let mut state = self.state.write().await;
            let in_flight =
                InFlight::acquire(&self.in_flight).ok_or(SessionError::SubmissionInFlight)?;
            let constituency_no = state
                .detail()
                .map(|detail| detail.constituency_no)
                .ok_or(SessionError::NoSeatLoaded)?;
            let candidate_id = state
                .selected_candidate
                .clone()
                .ok_or(SessionError::NoCandidate)?;

            state.feedback = None;
            let request = VoteRequest {
                constituency_no,
                candidate_id,
                captcha_token: state.captcha_token.clone(),
            };
            (request, state.slot.generation(), in_flight)
        };

        tracing::info!(
            "Submitting vote for candidate {} in constituency {}",
            request.candidate_id,
            request.constituency_no
        );
        let result = self.api.submit_vote(&request).await;

        let mut state = self.state.write().await;
        let still_selected = state.slot.generation() == generation;

        let feedback = match result {
            Ok(receipt) => {
                if still_selected {
                    state.tallies = receipt.new_tallies;
                }
                VoteFeedback::Recorded
            }
            Err(e) => {
                tracing::warn!("Vote submission failed: {}", e);
                VoteFeedback::from_error(&e)
            }
        };

        if still_selected {
            state.feedback = Some(feedback.clone());
        }
        Ok(feedback)
    }
}
