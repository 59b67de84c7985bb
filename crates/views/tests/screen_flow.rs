use serde_json::json;
use shared::{
    domain::Product,
    error::{ApiError, FailureKind},
    quotation::SupplyLine,
};
use views::{
    group_by_header,
    screens::products::{ProductFilter, ProductsScreen},
    InclusiveRange, LayoutMode, TableBody, TextQuery,
};

fn catalogue(count: i64) -> Vec<Product> {
    (1..=count)
        .map(|n| Product::new(format!("P-{n:02}"), format!("Product {n}"), 1.0, n))
        .collect()
}

#[test]
fn fetched_rows_flow_through_filter_into_pages() {
    let mut screen = ProductsScreen::new(10);
    screen.begin_load();
    screen.apply(Ok::<_, ApiError>(catalogue(23)));

    assert_eq!(screen.table().page_count(), 3);
    assert!(screen.table_mut().go_to_page(3));
    assert_eq!(screen.table().visible().len(), 3);

    screen.set_filter(ProductFilter {
        stock: InclusiveRange::new(Some(5), Some(10)),
        ..ProductFilter::default()
    });
    assert_eq!(screen.table().current_page(), 1);
    assert_eq!(screen.table().len(), 6);

    screen.set_filter(ProductFilter {
        search: TextQuery::new("product 2"),
        ..ProductFilter::default()
    });
    let view = screen.table().view(LayoutMode::Mobile);
    let TableBody::Cards(cards) = view.body else {
        panic!("narrow layout renders cards");
    };
    // Product 2 and Product 20..=23
    assert_eq!(cards.len(), 5);
    assert_eq!(cards[0].subtitle, "5 / 5 records");
}

#[test]
fn failed_fetch_clears_previous_rows() {
    let mut screen = ProductsScreen::new(10);
    screen.apply(Ok::<_, ApiError>(catalogue(4)));
    assert_eq!(screen.table().len(), 4);

    screen.begin_load();
    screen.apply(Err::<Vec<Product>, _>(ApiError::new(
        FailureKind::Network,
        "connection refused",
    )));

    assert!(screen.table().is_empty());
    assert_eq!(
        screen.state().error().map(|err| err.kind),
        Some(FailureKind::Network)
    );
}

#[test]
fn grouped_supplies_keep_input_order() {
    let lines: Vec<SupplyLine> = serde_json::from_value(json!([
        { "cog": "B", "nig": 0, "nog": "Second" },
        { "cog": "A", "nig": 0, "nog": "First" },
        { "cog": "A", "nig": 1, "des": "a1", "tot": 10 },
        { "cog": "B", "nig": 1, "des": "b1", "tot": "x" },
        { "cog": "A", "nig": 2, "des": "a2", "tot": 5 }
    ]))
    .expect("supply lines");

    let groups = group_by_header(&lines);

    let titles: Vec<&str> = groups.iter().map(|group| group.title.as_str()).collect();
    assert_eq!(titles, ["Second", "First"]);
    assert_eq!(groups[1].members.len(), 2);
    assert_eq!(groups[1].subtotal(), 15.0);
    assert_eq!(groups[0].subtotal(), 0.0);
}
