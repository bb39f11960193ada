//! Tests for season window matching, including year wraparound.

use chrono::NaiveDate;
use curb_engine::season::in_season;
use curb_engine::{season_matches, SeasonDate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn no_season_always_matches() {
    for month in 1..=12 {
        assert!(season_matches(0, 0, 0, 0, 15, month));
    }
    assert!(in_season(None, None, date(2015, 2, 28)));
}

#[test]
fn plain_season_boundaries() {
    // January 1st to April 1st.
    assert!(season_matches(1, 1, 1, 4, 1, 4));
    assert!(season_matches(1, 1, 1, 4, 1, 1));
    assert!(!season_matches(1, 1, 1, 4, 10, 4));
    assert!(!season_matches(1, 4, 1, 12, 1, 2));
}

#[test]
fn wraparound_season() {
    // December 1st to April 1st.
    assert!(season_matches(1, 12, 1, 4, 1, 4));
    assert!(!season_matches(1, 12, 1, 4, 2, 4));
    assert!(season_matches(1, 12, 1, 4, 20, 1));
    assert!(season_matches(1, 12, 1, 4, 28, 2));
    assert!(!season_matches(1, 12, 1, 4, 1, 7));
    // March 1st to January 1st excludes February only.
    assert!(!season_matches(1, 3, 1, 1, 1, 2));
}

#[test]
fn wraparound_respects_start_day() {
    assert!(!season_matches(15, 12, 1, 4, 10, 12));
    assert!(season_matches(15, 12, 1, 4, 15, 12));
}

#[test]
fn single_month_season_checks_both_days() {
    assert!(season_matches(10, 6, 20, 6, 15, 6));
    assert!(!season_matches(10, 6, 20, 6, 5, 6));
    assert!(!season_matches(10, 6, 20, 6, 25, 6));
}

#[test]
fn in_season_reads_season_dates() {
    let start: SeasonDate = "04-01".parse().unwrap();
    let end: SeasonDate = "12-01".parse().unwrap();
    assert!(in_season(Some(start), Some(end), date(2015, 4, 7)));
    assert!(!in_season(Some(start), Some(end), date(2015, 3, 31)));
    assert!(!in_season(Some(start), Some(end), date(2015, 12, 2)));
}

#[test]
fn season_date_parsing() {
    let d: SeasonDate = "05-01".parse().unwrap();
    assert_eq!((d.month, d.day), (5, 1));
    assert_eq!(d.to_string(), "05-01");

    assert!("13-01".parse::<SeasonDate>().is_err());
    assert!("05".parse::<SeasonDate>().is_err());
    assert!("ab-cd".parse::<SeasonDate>().is_err());
}
