use crate::models::{LeaderboardMode, Medal, RankedEntry, Record};
use std::cmp::Reverse;

/// Records in `category`, highest count first. Ties keep insertion order.
pub fn rank_by_category<'a>(records: &'a [Record], category: &str) -> Vec<&'a Record> {
    let mut ranked: Vec<&Record> = records.iter().filter(|r| r.category == category).collect();
    ranked.sort_by_key(|r| Reverse(r.count));
    ranked
}

/// One record per player (names compared case-insensitively), the best of
/// each, ordered by count then duration, both descending.
pub fn personal_bests_by_category<'a>(records: &'a [Record], category: &str) -> Vec<&'a Record> {
    let mut bests: Vec<(String, &Record)> = Vec::new();
    for record in records.iter().filter(|r| r.category == category) {
        let key = record.player_name().to_lowercase();
        match bests.iter_mut().find(|(name, _)| *name == key) {
            Some((_, best)) if record.count > best.count => *best = record,
            Some(_) => {}
            None => bests.push((key, record)),
        }
    }

    let mut ranked: Vec<&Record> = bests.into_iter().map(|(_, record)| record).collect();
    ranked.sort_by_key(|r| (Reverse(r.count), Reverse(r.duration.unwrap_or(0))));
    ranked
}

/// A player's records in `category`, newest first.
pub fn history_for_player<'a>(records: &'a [Record], player: &str, category: &str) -> Vec<&'a Record> {
    let player = player.to_lowercase();
    let mut history: Vec<&Record> = records
        .iter()
        .filter(|r| r.category == category && r.player_name().to_lowercase() == player)
        .collect();
    history.sort_by_key(|r| Reverse(r.date));
    history
}

/// Highest count in `history`; the first one wins a tie.
pub fn personal_best<'a>(history: &[&'a Record]) -> Option<&'a Record> {
    history
        .iter()
        .copied()
        .fold(None, |best: Option<&'a Record>, record| match best {
            Some(current) if current.count >= record.count => Some(current),
            _ => Some(record),
        })
}

pub fn build_leaderboard(records: &[Record], category: &str, mode: LeaderboardMode) -> Vec<RankedEntry> {
    let ranked = match mode {
        LeaderboardMode::AllRecords => rank_by_category(records, category),
        LeaderboardMode::PersonalBests => personal_bests_by_category(records, category),
    };

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, record)| RankedEntry {
            rank: index + 1,
            medal: Medal::for_rank(index + 1),
            record: record.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(id: &str, player: Option<&str>, category: &str, count: u32, duration: Option<u32>, day: i64) -> Record {
        Record {
            id: id.into(),
            player: player.map(str::to_string),
            category: category.to_string(),
            count,
            duration,
            date: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::days(day),
        }
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn empty_collection_ranks_nothing() {
        assert!(rank_by_category(&[], "volley").is_empty());
        assert!(build_leaderboard(&[], "volley", LeaderboardMode::AllRecords).is_empty());
    }

    #[test]
    fn rank_filters_category_and_sorts_descending_with_stable_ties() {
        let records = vec![
            record("a", None, "volley", 5, None, 0),
            record("b", None, "juggle", 50, None, 1),
            record("c", None, "volley", 9, None, 2),
            record("d", None, "volley", 5, None, 3),
        ];
        let ranked = rank_by_category(&records, "volley");
        assert_eq!(ids(&ranked), ["c", "a", "d"]);
        assert!(ranked.iter().all(|r| r.category == "volley"));
        assert!(ranked.windows(2).all(|pair| pair[0].count >= pair[1].count));
    }

    #[test]
    fn personal_best_keeps_highest_record_per_player() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, Some(30), 0),
            record("b", Some("Ann"), "volley", 15, Some(40), 1),
        ];
        let bests = personal_bests_by_category(&records, "volley");
        assert_eq!(bests.len(), 1);
        assert_eq!(bests[0].player.as_deref(), Some("Ann"));
        assert_eq!(bests[0].count, 15);
    }

    #[test]
    fn personal_bests_group_names_case_insensitively() {
        let records = vec![
            record("a", Some("ann"), "volley", 10, Some(30), 0),
            record("b", Some("ANN"), "volley", 12, Some(20), 1),
            record("c", Some("Bob"), "volley", 11, Some(20), 2),
            record("d", Some("Bob"), "juggle", 99, Some(20), 3),
        ];
        let bests = personal_bests_by_category(&records, "volley");
        assert_eq!(ids(&bests), ["b", "c"]);
    }

    #[test]
    fn personal_bests_break_count_ties_by_duration() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, Some(30), 0),
            record("b", Some("Bob"), "volley", 10, Some(60), 1),
            record("c", Some("Cid"), "volley", 10, None, 2),
        ];
        let bests = personal_bests_by_category(&records, "volley");
        assert_eq!(ids(&bests), ["b", "a", "c"]);
    }

    #[test]
    fn personal_bests_first_record_wins_equal_counts() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, Some(30), 0),
            record("b", Some("Ann"), "volley", 10, Some(90), 1),
        ];
        let bests = personal_bests_by_category(&records, "volley");
        assert_eq!(ids(&bests), ["a"]);
    }

    #[test]
    fn history_is_newest_first_and_matches_player_case_insensitively() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, Some(30), 0),
            record("b", Some("ann"), "volley", 8, Some(30), 5),
            record("c", Some("Ann"), "juggle", 20, Some(30), 6),
            record("d", Some("Bob"), "volley", 30, Some(30), 7),
            record("e", Some("ANN"), "volley", 12, Some(30), 2),
        ];
        let history = history_for_player(&records, "aNn", "volley");
        assert_eq!(ids(&history), ["b", "e", "a"]);
        assert_eq!(personal_best(&history).map(|r| r.id.as_str()), Some("e"));
    }

    #[test]
    fn personal_best_first_occurrence_wins_ties() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, None, 3),
            record("b", Some("Ann"), "volley", 10, None, 1),
        ];
        let history = history_for_player(&records, "Ann", "volley");
        assert_eq!(personal_best(&history).map(|r| r.id.as_str()), Some("a"));
        assert!(personal_best(&[]).is_none());
    }

    #[test]
    fn queries_are_idempotent() {
        let records = vec![
            record("a", Some("Ann"), "volley", 10, Some(30), 0),
            record("b", Some("Bob"), "volley", 10, Some(30), 1),
        ];
        assert_eq!(
            ids(&personal_bests_by_category(&records, "volley")),
            ids(&personal_bests_by_category(&records, "volley"))
        );
        assert_eq!(ids(&rank_by_category(&records, "volley")), ids(&rank_by_category(&records, "volley")));
    }

    #[test]
    fn leaderboard_assigns_medals_to_top_three() {
        let records: Vec<Record> = (0..5)
            .map(|i| record(&format!("r{i}"), None, "volley", 10 + i, None, i as i64))
            .collect();
        let board = build_leaderboard(&records, "volley", LeaderboardMode::AllRecords);
        let medals: Vec<_> = board.iter().map(|entry| entry.medal).collect();
        assert_eq!(
            medals,
            [Some(Medal::Gold), Some(Medal::Silver), Some(Medal::Bronze), None, None]
        );
        assert_eq!(board[0].record.count, 14);
        assert_eq!(board[4].rank, 5);
    }
}
