//! Tests for slot listing.

use curb_engine::slots::annotate;
use curb_engine::{available_slots, parse_checkin, EvaluationQuery, RestrictType, Slot};
use serde_json::json;

fn slots() -> Vec<Slot> {
    serde_json::from_value(json!([
        {
            "id": 1,
            "rules": [{
                "code": "NO-PARK-8-12",
                "agenda": {
                    "1": [[8.0, 12.0]], "2": [[8.0, 12.0]], "3": [[8.0, 12.0]],
                    "4": [[8.0, 12.0]], "5": [[8.0, 12.0]], "6": [null], "7": [null]
                }
            }]
        },
        {
            "id": 2,
            "rules": [{
                "code": "PAY-9-18",
                "restrict_typ": "paid",
                "agenda": {
                    "1": [[9.0, 18.0]], "2": [[9.0, 18.0]], "3": [[9.0, 18.0]],
                    "4": [[9.0, 18.0]], "5": [[9.0, 18.0]], "6": [null], "7": [null]
                }
            }]
        },
        { "id": 3, "rules": [] }
    ]))
    .unwrap()
}

fn query(checkin: &str, hours: f64) -> EvaluationQuery {
    EvaluationQuery::new(parse_checkin(checkin).unwrap()).with_duration(hours)
}

#[test]
fn blocked_slots_are_dropped_and_rest_annotated() {
    let available = available_slots(slots(), &query("2015-04-07T10:00", 1.0)).unwrap();

    let ids: Vec<i64> = available.iter().map(|s| s.id).collect();
    assert_eq!(ids, [2, 3]);
    assert_eq!(available[0].restrict_typ, RestrictType::Paid);
    assert_eq!(available[1].restrict_typ, RestrictType::None);
}

#[test]
fn free_only_search_drops_paid_slots() {
    let q = query("2015-04-07T13:00", 1.0).with_want_paid(false);
    let ids: Vec<i64> = available_slots(slots(), &q)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, [1, 3]);
}

#[test]
fn annotate_uses_checkin_time() {
    let paid = slots().remove(1);
    let evening = parse_checkin("2015-04-07T19:00").unwrap();
    assert_eq!(annotate(paid, evening).unwrap().restrict_typ, RestrictType::None);
}

#[test]
fn evaluation_error_aborts_listing() {
    let mut all = slots();
    all.push(
        serde_json::from_value(json!({
            "id": 4,
            "rules": [{
                "code": "BROKEN",
                "agenda": {
                    "1": [[-3.0, 1.0]], "2": [[-3.0, 1.0]], "3": [[-3.0, 1.0]],
                    "4": [[-3.0, 1.0]], "5": [[-3.0, 1.0]], "6": [null], "7": [null]
                }
            }]
        }))
        .unwrap(),
    );
    assert!(available_slots(all, &query("2015-04-07T13:00", 1.0)).is_err());
}
