use std::sync::Arc;
use tokio::sync::OnceCell;

use mapvote_common::{ConstituencyNo, ConstituencySummary};

use crate::gateway::ElectionApi;

/// Seats whose primary or localized name contains `query`, case-insensitively.
/// The empty query returns every seat in directory order.
pub fn filter_seats<'a>(
    seats: &'a [ConstituencySummary],
    query: &str,
) -> Vec<&'a ConstituencySummary> {
    if query.is_empty() {
        return seats.iter().collect();
    }
    seats.iter().filter(|seat| seat.matches(query)).collect()
}

/// The constituency list, fetched once per session and filtered locally.
pub struct SeatDirectory<A: ElectionApi> {
    api: Arc<A>,
    seats: OnceCell<Arc<Vec<ConstituencySummary>>>,
}

impl<A: ElectionApi> SeatDirectory<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            seats: OnceCell::new(),
        }
    }

    /// Fetch the directory if it has not been fetched yet. A failed fetch
    /// yields an empty list and is retried on the next call.
    pub async fn load(&self) -> Arc<Vec<ConstituencySummary>> {
        let result = self
            .seats
            .get_or_try_init(|| async {
                let seats = self.api.constituencies().await?;
                tracing::info!("Loaded {} constituencies", seats.len());
                Ok::<_, crate::error::ApiError>(Arc::new(seats))
            })
            .await;

        match result {
            Ok(seats) => seats.clone(),
            Err(e) => {
                tracing::warn!("Failed to load constituency directory: {}", e);
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn search(&self, query: &str) -> Vec<ConstituencySummary> {
        let seats = self.load().await;
        filter_seats(&seats, query).into_iter().cloned().collect()
    }

    pub async fn get(&self, no: ConstituencyNo) -> Option<ConstituencySummary> {
        let seats = self.load().await;
        seats.iter().find(|s| s.constituency_no == no).cloned()
    }
}
