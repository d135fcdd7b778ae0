//! In-memory `ElectionApi` for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};

use mapvote_common::{
    CaptchaConfig, Candidate, ConstituencyDetail, ConstituencyNo, ConstituencySummary, NewsFeed,
    StatsSnapshot, TallyMap, VoteReceipt, VoteRequest,
};

use crate::error::ApiError;
use crate::gateway::ElectionApi;

/// Detail record for seat `no` with one candidate per tally entry.
pub fn detail(no: ConstituencyNo, totals: &[(&str, u64)]) -> ConstituencyDetail {
    ConstituencyDetail {
        constituency_no: no,
        seat: format!("Seat-{no}"),
        seat_bn: None,
        division: "Dhaka".to_string(),
        notes: None,
        is_disabled: false,
        candidates: totals
            .iter()
            .map(|(id, _)| Candidate {
                candidate_id: id.to_string(),
                name: format!("Candidate {id}"),
                name_bn: None,
                party: "IND".to_string(),
                party_bn: None,
                alliance_key: None,
            })
            .collect(),
        totals: tally(totals),
        leader: None,
        is_tied: false,
    }
}

pub fn receipt(totals: &[(&str, u64)]) -> VoteReceipt {
    VoteReceipt {
        ok: true,
        message: None,
        new_tallies: tally(totals),
        leader: None,
        is_tied: false,
    }
}

fn tally(totals: &[(&str, u64)]) -> TallyMap {
    totals
        .iter()
        .map(|(id, votes)| (id.to_string(), *votes))
        .collect()
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: Some("Not found".to_string()),
    }
}

pub struct FakeApi {
    seats: Vec<ConstituencySummary>,
    details: HashMap<ConstituencyNo, ConstituencyDetail>,
    delays: HashMap<ConstituencyNo, Duration>,
    captcha: CaptchaConfig,
    vote_result: Result<VoteReceipt, ApiError>,
    vote_delay: Duration,
    news: NewsFeed,
    stats: Mutex<Vec<StatsSnapshot>>,
    failing: Vec<&'static str>,
    calls: Mutex<HashMap<&'static str, usize>>,
    votes: Mutex<Vec<VoteRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            seats: Vec::new(),
            details: HashMap::new(),
            delays: HashMap::new(),
            captcha: CaptchaConfig::default(),
            vote_result: Ok(receipt(&[])),
            vote_delay: Duration::ZERO,
            news: NewsFeed::default(),
            stats: Mutex::new(Vec::new()),
            failing: Vec::new(),
            calls: Mutex::new(HashMap::new()),
            votes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_seats(mut self, seats: Vec<ConstituencySummary>) -> Self {
        self.seats = seats;
        self
    }

    pub fn with_detail(mut self, detail: ConstituencyDetail) -> Self {
        self.details.insert(detail.constituency_no, detail);
        self
    }

    /// Delay detail fetches for seat `no`.
    pub fn with_delay(mut self, no: ConstituencyNo, delay: Duration) -> Self {
        self.delays.insert(no, delay);
        self
    }

    pub fn with_captcha(mut self, config: CaptchaConfig) -> Self {
        self.captcha = config;
        self
    }

    pub fn with_vote_result(mut self, result: Result<VoteReceipt, ApiError>) -> Self {
        self.vote_result = result;
        self
    }

    pub fn with_vote_delay(mut self, delay: Duration) -> Self {
        self.vote_delay = delay;
        self
    }

    pub fn with_news(mut self, news: NewsFeed) -> Self {
        self.news = news;
        self
    }

    /// Snapshots served by successive `overall_results` calls. The last one
    /// repeats once the list is exhausted.
    pub fn with_stats(self, snapshots: Vec<StatsSnapshot>) -> Self {
        *self.stats.lock() = snapshots;
        self
    }

    /// Make every call to `endpoint` fail with a transport error.
    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.push(endpoint);
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    pub fn last_vote(&self) -> Option<VoteRequest> {
        self.votes.lock().last().cloned()
    }

    fn record(&self, endpoint: &'static str) -> Result<(), ApiError> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        if self.failing.contains(&endpoint) {
            return Err(ApiError::Transport(format!("{endpoint} unavailable")));
        }
        Ok(())
    }

    async fn seat_detail(&self, no: ConstituencyNo) -> Result<ConstituencyDetail, ApiError> {
        if let Some(delay) = self.delays.get(&no) {
            tokio::time::sleep(*delay).await;
        }
        self.details.get(&no).cloned().ok_or_else(not_found)
    }
}

#[async_trait]
impl ElectionApi for FakeApi {
    async fn constituencies(&self) -> Result<Vec<ConstituencySummary>, ApiError> {
        self.record("constituencies")?;
        Ok(self.seats.clone())
    }

    async fn constituency(&self, no: ConstituencyNo) -> Result<ConstituencyDetail, ApiError> {
        self.record("constituency")?;
        self.seat_detail(no).await
    }

    async fn captcha_config(&self) -> Result<CaptchaConfig, ApiError> {
        self.record("captcha_config")?;
        Ok(self.captcha.clone())
    }

    async fn submit_vote(&self, request: &VoteRequest) -> Result<VoteReceipt, ApiError> {
        self.record("submit_vote")?;
        self.votes.lock().push(request.clone());
        if !self.vote_delay.is_zero() {
            tokio::time::sleep(self.vote_delay).await;
        }
        self.vote_result.clone()
    }

    async fn news(&self) -> Result<NewsFeed, ApiError> {
        self.record("news")?;
        Ok(self.news.clone())
    }

    async fn overall_results(&self) -> Result<StatsSnapshot, ApiError> {
        self.record("overall_results")?;
        let mut stats = self.stats.lock();
        if stats.len() > 1 {
            Ok(stats.remove(0))
        } else {
            Ok(stats.first().cloned().unwrap_or_default())
        }
    }

    async fn constituency_results(
        &self,
        no: ConstituencyNo,
    ) -> Result<ConstituencyDetail, ApiError> {
        self.record("constituency_results")?;
        self.seat_detail(no).await
    }
}
