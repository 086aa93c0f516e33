// League records: actual head-to-head results against the all-play baseline.
//
// All-play treats every week as a round robin: a team "beats" every other
// team whose score it matched or exceeded that week.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input and per-week rows
// ---------------------------------------------------------------------------

/// One head-to-head game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub week: u32,
    pub home_team: String,
    pub home_score: f64,
    pub away_team: String,
    pub away_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "T")]
    Tie,
}

impl GameResult {
    fn between(score: f64, opponent: f64) -> Self {
        if score > opponent {
            GameResult::Win
        } else if score < opponent {
            GameResult::Loss
        } else {
            GameResult::Tie
        }
    }
}

/// One team's week: its actual result and where it stood against everyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamWeekRecord {
    pub week: u32,
    pub team: String,
    pub score: f64,
    pub result: GameResult,
    /// 1 is the week's top score. Tied teams share the lower rank.
    pub rank_in_week: usize,
    pub all_play_wins: usize,
    pub all_play_losses: usize,
    pub all_play_pct: f64,
}

impl TeamWeekRecord {
    /// "W-L" all-play record for the week.
    pub fn record(&self) -> String {
        format!("{}-{}", self.all_play_wins, self.all_play_losses)
    }
}

/// Season totals for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallRecord {
    pub team: String,
    pub all_play_wins: usize,
    pub all_play_losses: usize,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
    pub all_play_pct: f64,
    pub actual_win_pct: f64,
    /// Actual win pct minus all-play pct. Positive means lucky.
    pub win_pct_over_expected: f64,
}

// ---------------------------------------------------------------------------
// Record table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordTable {
    /// Sorted by week, then rank in week, then team.
    pub weekly: Vec<TeamWeekRecord>,
    /// Sorted by all-play pct, best first.
    pub overall: Vec<OverallRecord>,
}

impl RecordTable {
    pub fn from_matchups(matchups: &[MatchupResult]) -> Self {
        let mut by_week: BTreeMap<u32, Vec<(String, f64, GameResult)>> = BTreeMap::new();
        for m in matchups {
            let week = by_week.entry(m.week).or_default();
            week.push((
                m.home_team.clone(),
                m.home_score,
                GameResult::between(m.home_score, m.away_score),
            ));
            week.push((
                m.away_team.clone(),
                m.away_score,
                GameResult::between(m.away_score, m.home_score),
            ));
        }

        let mut weekly = Vec::new();
        for (week, entries) in &by_week {
            let team_count = entries.len();
            let mut rows: Vec<TeamWeekRecord> = entries
                .iter()
                .map(|(team, score, result)| {
                    let at_or_above = entries.iter().filter(|(_, s, _)| s >= score).count();
                    let at_or_below = entries.iter().filter(|(_, s, _)| s <= score).count();
                    let all_play_wins = at_or_below - 1;
                    let all_play_losses = team_count - 1 - all_play_wins;
                    TeamWeekRecord {
                        week: *week,
                        team: team.clone(),
                        score: *score,
                        result: *result,
                        rank_in_week: at_or_above,
                        all_play_wins,
                        all_play_losses,
                        all_play_pct: pct(all_play_wins, all_play_wins + all_play_losses),
                    }
                })
                .collect();
            rows.sort_by(|a, b| {
                a.rank_in_week
                    .cmp(&b.rank_in_week)
                    .then_with(|| a.team.cmp(&b.team))
            });
            weekly.extend(rows);
        }

        let mut totals: BTreeMap<&str, OverallRecord> = BTreeMap::new();
        for row in &weekly {
            let total = totals.entry(row.team.as_str()).or_insert_with(|| OverallRecord {
                team: row.team.clone(),
                all_play_wins: 0,
                all_play_losses: 0,
                wins: 0,
                losses: 0,
                ties: 0,
                all_play_pct: 0.0,
                actual_win_pct: 0.0,
                win_pct_over_expected: 0.0,
            });
            total.all_play_wins += row.all_play_wins;
            total.all_play_losses += row.all_play_losses;
            match row.result {
                GameResult::Win => total.wins += 1,
                GameResult::Loss => total.losses += 1,
                GameResult::Tie => total.ties += 1,
            }
        }

        let mut overall: Vec<OverallRecord> = totals
            .into_values()
            .map(|mut r| {
                r.all_play_pct = pct(r.all_play_wins, r.all_play_wins + r.all_play_losses);
                r.actual_win_pct = pct(r.wins, r.wins + r.losses + r.ties);
                r.win_pct_over_expected = r.actual_win_pct - r.all_play_pct;
                r
            })
            .collect();
        overall.sort_by(|a, b| {
            b.all_play_pct
                .total_cmp(&a.all_play_pct)
                .then_with(|| a.team.cmp(&b.team))
        });

        RecordTable { weekly, overall }
    }

    /// Overall records ordered by how far actual results outran all-play.
    pub fn luckiest(&self) -> Vec<&OverallRecord> {
        let mut rows: Vec<&OverallRecord> = self.overall.iter().collect();
        rows.sort_by(|a, b| {
            b.win_pct_over_expected
                .total_cmp(&a.win_pct_over_expected)
                .then_with(|| a.team.cmp(&b.team))
        });
        rows
    }

    pub fn team(&self, team: &str) -> Option<&OverallRecord> {
        self.overall.iter().find(|r| r.team == team)
    }

    pub fn week(&self, week: u32) -> impl Iterator<Item = &TeamWeekRecord> {
        self.weekly.iter().filter(move |r| r.week == week)
    }
}

fn pct(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
