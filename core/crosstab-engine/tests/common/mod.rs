//! FILENAME: tests/common/mod.rs
//! Shared fixtures for cross table integration tests.

#![allow(dead_code)]

use crosstab_engine::{
    BuiltinMethod, CrossTabDefinition, Record, StatMethod, StatValue, StatisticSpec,
};

/// Sample sales data: (region, product, quarter, sales, quantity).
pub struct SalesFixture;

impl SalesFixture {
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Apples", "Q1", 100.0, 10.0),
            ("North", "Oranges", "Q1", 150.0, 15.0),
            ("South", "Apples", "Q1", 200.0, 20.0),
            ("North", "Apples", "Q2", 120.0, 12.0),
            ("South", "Oranges", "Q2", 250.0, 0.0),
            ("East", "Apples", "Q2", 80.0, 8.0),
            ("South", "Apples", "Q2", 210.0, 21.0),
            ("North", "Oranges", "Q2", 160.0, 16.0),
        ]
    }

    pub fn records() -> Vec<Record> {
        Self::data()
            .into_iter()
            .map(|(region, product, quarter, sales, quantity)| {
                Record::new()
                    .with("Region", region)
                    .with("Product", product)
                    .with("Quarter", quarter)
                    .with("Sales", sales)
                    .with("Quantity", quantity)
            })
            .collect()
    }

    /// Region and product as rows, quarter as columns.
    pub fn definition() -> CrossTabDefinition {
        let mut def = CrossTabDefinition::new();
        def.row_keys = vec!["Region".to_string(), "Product".to_string()];
        def.column_keys = vec!["Quarter".to_string()];
        def.statistics = vec![
            StatisticSpec::new("Sales", "Sum of Sales", BuiltinMethod::Sum),
            StatisticSpec::new("Sales", "Count", BuiltinMethod::Count),
            StatisticSpec::new("Quantity", "Sum of Quantity", BuiltinMethod::Sum),
            StatisticSpec::new("Quantity", "Orders with Quantity", BuiltinMethod::Count2),
            StatisticSpec::new("Sales", "Average Sale", BuiltinMethod::Avg),
        ];
        def
    }

    /// Adds a custom "price per unit" statistic built on two sums.
    pub fn definition_with_price() -> CrossTabDefinition {
        let mut def = Self::definition();
        def.statistics.push(StatisticSpec::new(
            "Sales",
            "Price per Unit",
            StatMethod::custom(|stats, _| {
                let sales = stats.get("Sum of Sales").map(StatValue::as_number);
                let quantity = stats.get("Sum of Quantity").map(StatValue::as_number);
                match (sales, quantity) {
                    (Some(s), Some(q)) => StatValue::Number(s / q),
                    _ => StatValue::Number(f64::NAN),
                }
            }),
        ));
        def
    }
}

pub fn number(value: Option<&StatValue>) -> f64 {
    match value {
        Some(StatValue::Number(n)) => *n,
        other => panic!("expected a number, got {:?}", other),
    }
}
