//! Property-based tests for line item batches.

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::batch::{LineItemBatch, LineItemInput, LineItemValidationError};

/// Strategy for a price in cents between 0.00 and 100,000.00.
fn price_cents() -> impl Strategy<Value = i64> {
    0i64..10_000_000i64
}

/// Strategy for a quantity between 0 and 1,000.
fn quantity() -> impl Strategy<Value = i32> {
    0i32..1_000i32
}

/// Encodes a number the way a client might: JSON number or string.
fn encode(as_string: bool, value: Decimal) -> Value {
    if as_string {
        json!(value.to_string())
    } else {
        serde_json::to_value(value.to_string().parse::<serde_json::Number>().unwrap()).unwrap()
    }
}

fn arb_item() -> impl Strategy<Value = (String, i32, i64, bool)> {
    ("[a-zA-Z][a-zA-Z0-9 ]{0,30}", quantity(), price_cents(), any::<bool>())
}

fn to_input(name: &str, qty: i32, cents: i64, as_string: bool) -> LineItemInput {
    LineItemInput {
        name: name.to_string(),
        description: None,
        quantity: encode(as_string, Decimal::from(qty)),
        price: encode(as_string, Decimal::new(cents, 2)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The batch total equals the sum of price * quantity.
    #[test]
    fn prop_total_matches_sum(items in prop::collection::vec(arb_item(), 0..20)) {
        let inputs: Vec<_> = items
            .iter()
            .map(|(n, q, c, s)| to_input(n, *q, *c, *s))
            .collect();

        let expected: Decimal = items
            .iter()
            .map(|(_, q, c, _)| Decimal::new(*c, 2) * Decimal::from(*q))
            .sum();

        let batch = LineItemBatch::prepare(&inputs).unwrap();
        prop_assert_eq!(batch.total(), expected);
        prop_assert_eq!(batch.items().len(), items.len());
    }

    /// Stored items keep submission order and values.
    #[test]
    fn prop_items_preserved(items in prop::collection::vec(arb_item(), 1..10)) {
        let inputs: Vec<_> = items
            .iter()
            .map(|(n, q, c, s)| to_input(n, *q, *c, *s))
            .collect();

        let batch = LineItemBatch::prepare(&inputs).unwrap();
        for (draft, (name, qty, cents, _)) in batch.items().iter().zip(&items) {
            prop_assert_eq!(&draft.name, name.trim());
            prop_assert_eq!(draft.quantity, *qty);
            prop_assert_eq!(draft.price, Decimal::new(*cents, 2));
        }
    }

    /// One non-numeric price anywhere rejects the whole batch.
    #[test]
    fn prop_bad_price_rejects_batch(
        items in prop::collection::vec(arb_item(), 1..10),
        position in any::<prop::sample::Index>(),
        garbage in "[a-z]{1,8}",
    ) {
        let mut inputs: Vec<_> = items
            .iter()
            .map(|(n, q, c, s)| to_input(n, *q, *c, *s))
            .collect();
        let index = position.index(inputs.len());
        inputs[index].price = json!(garbage);

        prop_assert_eq!(
            LineItemBatch::prepare(&inputs),
            Err(LineItemValidationError::InvalidPrice { index })
        );
    }
}
