use super::*;

use serde_json::json;

fn lines(raw: serde_json::Value) -> Vec<SupplyLine> {
    serde_json::from_value(raw).expect("supply lines")
}

#[test]
fn members_follow_their_header_in_input_order() {
    let supplies = lines(json!([
        { "num": 1, "cog": "A", "nig": 0, "nog": "Cables" },
        { "num": 2, "cog": "B", "nig": 0, "nog": "Tools" },
        { "num": 3, "cog": "B", "nig": 1, "cod": "T-1", "tot": 4 },
        { "num": 4, "cog": "A", "nig": 1, "cod": "C-1", "tot": 10 },
        { "num": 5, "cog": "A", "nig": 2, "cod": "C-2", "tot": "5" },
        { "num": 6, "cog": "Z", "nig": 1, "cod": "ORPHAN", "tot": 99 }
    ]));

    let groups = group_by_header(&supplies);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].title, "Cables");
    let codes: Vec<_> = groups[0]
        .members
        .iter()
        .map(|line| line.code.as_deref())
        .collect();
    assert_eq!(codes, vec![Some("C-1"), Some("C-2")]);
    assert_eq!(groups[0].subtotal(), 15.0);
    assert_eq!(groups[1].title, "Tools");
    assert_eq!(groups[1].members.len(), 1);
    assert!(groups
        .iter()
        .flat_map(|group| &group.members)
        .all(|line| line.code.as_deref() != Some("ORPHAN")));
}

#[test]
fn repeated_header_keeps_position_and_takes_later_title() {
    let supplies = lines(json!([
        { "cog": 1, "nig": 0, "nog": "First" },
        { "cog": 2, "nig": 0, "nog": "Second" },
        { "cog": 1, "nig": 0, "nog": "Renamed" }
    ]));

    let groups = group_by_header(&supplies);
    let titles: Vec<_> = groups.iter().map(|group| group.title.as_str()).collect();
    assert_eq!(titles, vec!["Renamed", "Second"]);
}

#[test]
fn subtotal_treats_non_numeric_totals_as_zero() {
    let supplies = lines(json!([
        { "cog": "A", "nig": 0, "nog": "Mixed" },
        { "cog": "A", "nig": 1, "tot": 10 },
        { "cog": "A", "nig": 2, "tot": "x" },
        { "cog": "A", "nig": 3, "tot": 5 },
        { "cog": "A", "nig": 4 }
    ]));

    let groups = group_by_header(&supplies);
    assert_eq!(subtotal(groups[0].members.iter().copied()), 15.0);
}

#[test]
fn loose_item_indexes_follow_numeric_reading() {
    let supplies = lines(json!([
        { "cog": "A", "nig": 0, "nog": "Numeric header" },
        { "cog": "B", "nig": "0", "nog": "Text zero is not a header" },
        { "cog": "A", "nig": "1.5", "tot": 2 },
        { "cog": "A", "nig": 0.5, "tot": 3 },
        { "cog": "A", "nig": -1, "tot": 100 },
        { "cog": "A", "tot": 100 }
    ]));

    let groups = group_by_header(&supplies);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "Numeric header");
    assert_eq!(groups[0].members.len(), 2);
    assert_eq!(groups[0].subtotal(), 5.0);
}
