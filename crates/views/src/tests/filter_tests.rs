use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Item {
    name: &'static str,
    stock: i64,
}

struct NameAndStock {
    name: TextQuery,
    stock: InclusiveRange<i64>,
}

impl Filter<Item> for NameAndStock {
    fn matches(&self, item: &Item) -> bool {
        self.name.matches(item.name) && self.stock.contains(&item.stock)
    }

    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.stock.is_empty()
    }
}

fn items() -> Vec<Item> {
    vec![
        Item { name: "Laptop", stock: 4 },
        Item { name: "Cable HDMI", stock: 5 },
        Item { name: "Mouse", stock: 10 },
        Item { name: "Monitor", stock: 11 },
    ]
}

#[test]
fn empty_filter_returns_everything_in_order() {
    let filter = NameAndStock {
        name: TextQuery::default(),
        stock: InclusiveRange::default(),
    };
    assert_eq!(filter.apply(&items()), items());
}

#[test]
fn range_bounds_are_inclusive() {
    let filter = NameAndStock {
        name: TextQuery::default(),
        stock: InclusiveRange::new(Some(5), Some(10)),
    };
    let names: Vec<_> = filter.apply(&items()).iter().map(|item| item.name).collect();
    assert_eq!(names, vec!["Cable HDMI", "Mouse"]);
}

#[test]
fn criteria_are_combined_with_and() {
    let filter = NameAndStock {
        name: TextQuery::new("MO"),
        stock: InclusiveRange::new(None, Some(10)),
    };
    let names: Vec<_> = filter.apply(&items()).iter().map(|item| item.name).collect();
    assert_eq!(names, vec!["Mouse"]);
}

#[test]
fn text_query_ignores_case_and_missing_fields() {
    let query = TextQuery::new("tech");
    assert!(query.matches("TechSAC"));
    assert!(query.matches_any([None, Some("Hi-Tech")]));
    assert!(!query.matches_any([None, None]));
    assert!(TextQuery::default().matches_any([None]));
}
