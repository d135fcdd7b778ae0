//! Plain-text rendering of client state for the terminal front-end.

use std::{collections::BTreeMap, fmt::Write};

use mapvote_common::{
    utils::time::display_server_time, Candidate, ConstituencyDetail, ConstituencySummary,
    NewsFeed, ProjectionOutcome, Standing, StatsSnapshot, TallyMap,
};

use crate::i18n::{Language, Text};
use crate::seat_loader::LoadState;

/// Characters in a full-width bar.
const BAR_CELLS: usize = 20;
const TOP_SEATS: usize = 10;

fn candidate_name<'a>(lang: Language, candidate: &'a Candidate) -> &'a str {
    match (lang, candidate.name_bn.as_deref()) {
        (Language::Bn, Some(local)) if !local.is_empty() => local,
        _ => &candidate.name,
    }
}

fn party_name<'a>(lang: Language, candidate: &'a Candidate) -> &'a str {
    match (lang, candidate.party_bn.as_deref()) {
        (Language::Bn, Some(local)) if !local.is_empty() => local,
        _ => &candidate.party,
    }
}

/// Bar for a width given in whole percent.
pub fn bar(percent: u8) -> String {
    let cells = (usize::from(percent.min(100)) * BAR_CELLS + 50) / 100;
    format!("{}{}", "#".repeat(cells), ".".repeat(BAR_CELLS - cells))
}

pub fn seat_list(seats: &[&ConstituencySummary], lang: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", seats.len(), Text::SeatsFound.render(lang));
    for seat in seats {
        let _ = write!(
            out,
            "{:>4}  {} ({})",
            seat.constituency_no,
            lang.seat_name(seat),
            seat.division
        );
        if seat.is_disabled {
            out.push_str("  [disabled]");
        }
        out.push('\n');
    }
    out
}

/// One line describing who is ahead, consistent with `tallies`.
pub fn standing_line(detail: &ConstituencyDetail, tallies: &TallyMap, lang: Language) -> String {
    match tallies.standing() {
        Standing::NoVotes => Text::StatusNoVotes.render(lang).to_string(),
        Standing::Tied { votes } => format!("{} ({})", Text::StatusTied.render(lang), votes),
        Standing::Leading {
            candidate_id,
            votes,
        } => {
            let name = detail
                .candidate(&candidate_id)
                .map(|c| candidate_name(lang, c))
                .unwrap_or(candidate_id.as_str());
            format!("{} {} ({})", name, Text::StatusLeading.render(lang), votes)
        }
    }
}

/// Candidates with their current count and a bar relative to the seat leader.
pub fn seat_detail(detail: &ConstituencyDetail, tallies: &TallyMap, lang: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}: {}",
        Text::Constituency.render(lang),
        detail.constituency_no,
        match (lang, detail.seat_bn.as_deref()) {
            (Language::Bn, Some(local)) if !local.is_empty() => local,
            _ => detail.seat.as_str(),
        }
    );
    if !detail.division.is_empty() {
        let _ = writeln!(out, "{}", detail.division);
    }
    if let Some(notes) = detail.notes() {
        let _ = writeln!(out, "{}", notes);
    }
    if detail.is_disabled {
        let _ = writeln!(out, "[disabled]");
    }

    let name_width = detail
        .candidates
        .iter()
        .map(|c| candidate_name(lang, c).chars().count())
        .max()
        .unwrap_or(0);
    for candidate in &detail.candidates {
        let id = &candidate.candidate_id;
        let name = candidate_name(lang, candidate);
        let pad = name_width.saturating_sub(name.chars().count());
        let _ = writeln!(
            out,
            "  [{}] {}{}  {:<8} {:>6}  {}",
            id,
            name,
            " ".repeat(pad),
            party_name(lang, candidate),
            tallies.votes_for(id),
            bar(tallies.bar_width(id)),
        );
    }

    let _ = writeln!(out, "{}: {}", Text::TotalVotes.render(lang), tallies.total());
    let _ = writeln!(out, "{}", standing_line(detail, tallies, lang));
    out
}

/// Rendering of a loader state; a loaded seat shows its own totals.
pub fn load_state(state: &LoadState, lang: Language) -> String {
    match state {
        LoadState::Idle => format!("{}\n", Text::SelectConstituency.render(lang)),
        LoadState::Loading { .. } => format!("{}\n", Text::LoadingSeat.render(lang)),
        LoadState::Failed { constituency_no } => {
            format!("{} {}: -\n", Text::Constituency.render(lang), constituency_no)
        }
        LoadState::Loaded(detail) => seat_detail(detail, &detail.totals, lang),
    }
}

/// A seat's state under the results heading.
pub fn seat_result(state: &LoadState, lang: Language) -> String {
    format!("{}\n{}", Text::SeatResult.render(lang), load_state(state, lang))
}

fn rollup(out: &mut String, title: Text, values: &BTreeMap<String, u64>, lang: Language) {
    if values.is_empty() {
        return;
    }
    let mut rows: Vec<_> = values.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let _ = writeln!(out, "\n{}", title.render(lang));
    for (key, value) in rows {
        let _ = writeln!(out, "  {:<12} {:>8}", key, value);
    }
}

pub fn dashboard(stats: &StatsSnapshot, refreshing: bool, lang: Language) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", Text::Dashboard.render(lang));
    if refreshing {
        let _ = write!(out, "  {}", Text::Refreshing.render(lang));
    }
    out.push('\n');
    if let Some(updated) = &stats.updated_at {
        let _ = writeln!(
            out,
            "{}: {}",
            Text::UpdatedAt.render(lang),
            display_server_time(updated)
        );
    }

    let _ = writeln!(out, "{}: {}", Text::TotalVotes.render(lang), stats.total_votes);
    let _ = writeln!(
        out,
        "{}: {}",
        Text::SeatsReporting.render(lang),
        stats.reporting_seats()
    );
    let _ = writeln!(out, "{}: {}", Text::TiedSeats.render(lang), stats.tied_seats());
    let _ = writeln!(out, "{}: {}", Text::NoVoteSeats.render(lang), stats.no_vote_seats());

    rollup(&mut out, Text::VotesByAlliance, &stats.votes_by_alliance, lang);
    rollup(&mut out, Text::VotesByParty, &stats.votes_by_party, lang);
    rollup(&mut out, Text::SeatsByAlliance, &stats.seats_leading_by_alliance, lang);
    rollup(&mut out, Text::SeatsByParty, &stats.seats_leading_by_party, lang);

    if !stats.top_seats_by_votes.is_empty() {
        let _ = writeln!(out, "\n{}", Text::TopSeats.render(lang));
        for seat in stats.top_seats_by_votes.iter().take(TOP_SEATS) {
            let _ = writeln!(
                out,
                "{:>4}  {:<20} {:>8}",
                seat.constituency_no, seat.seat, seat.total_votes
            );
        }
    }

    rollup(&mut out, Text::Projection, &stats.projection_by_party, lang);
    if let Some(meta) = &stats.projection_meta {
        let _ = writeln!(
            out,
            "  {}/{} (+{}) {}",
            meta.seats_current, meta.seats_total, meta.remaining, meta.method
        );
    }
    let _ = match stats.projected_winner() {
        ProjectionOutcome::Winner { party, seats } => writeln!(
            out,
            "{}: {} ({})",
            Text::ProjectedWinner.render(lang),
            party,
            seats
        ),
        ProjectionOutcome::Tie { parties, seats } => writeln!(
            out,
            "{}: {} ({})",
            Text::ProjectionTie.render(lang),
            parties.join(", "),
            seats
        ),
        ProjectionOutcome::Insufficient => {
            writeln!(out, "{}", Text::ProjectionInsufficient.render(lang))
        }
    };
    out
}

pub fn news(feed: &NewsFeed, lang: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Text::Headlines.render(lang));
    for item in &feed.items {
        let _ = writeln!(out, "- {}", item.title.as_deref().unwrap_or(""));
        let _ = writeln!(
            out,
            "  {} · {}",
            item.source,
            item.published.as_deref().unwrap_or("")
        );
        if let Some(link) = &item.link {
            let _ = writeln!(out, "  {}", link);
        }
    }
    let _ = writeln!(out, "{}", Text::NewsDisclaimer.render(lang));
    out
}
