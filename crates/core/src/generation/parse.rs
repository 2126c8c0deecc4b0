//! Parsing of generated cash advance drafts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use motortrack_shared::types::MotorcycleId;

use crate::generation::GenerationError;
use crate::workflow::draft::{CashAdvanceDraft, DraftSource};

/// Turn a generator's JSON answer into a draft.
///
/// Accepts camelCase or snake_case keys. Amounts may be strings or JSON
/// numbers; numbers are read from their decimal text, never through a float.
/// Any `id` or `status` the generator supplies is ignored: identity and
/// status are assigned on creation.
pub fn parse_generated_draft(value: &Value) -> Result<CashAdvanceDraft, GenerationError> {
    let object = value
        .as_object()
        .ok_or_else(|| GenerationError::Malformed("expected a JSON object".to_string()))?;

    let personnel = string_field(object, &["personnel"])?;
    let purpose = string_field(object, &["purpose"])?;
    let amount = amount_field(object)?;

    let date_text = string_field(object, &["date"])?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|e| GenerationError::Malformed(format!("date '{date_text}': {e}")))?;

    let ids = field(object, &["motorcycleIds", "motorcycle_ids"])
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::Malformed("motorcycleIds must be an array".to_string()))?;

    let motorcycle_ids = ids
        .iter()
        .map(|id| {
            id.as_str()
                .and_then(|s| MotorcycleId::from_str(s).ok())
                .ok_or_else(|| GenerationError::Malformed(format!("invalid motorcycle id {id}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CashAdvanceDraft {
        personnel,
        purpose,
        amount,
        date,
        motorcycle_ids,
        source: DraftSource::Generated,
    })
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Result<String, GenerationError> {
    field(object, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::Malformed(format!("{} must be a string", keys[0])))
}

fn amount_field(object: &Map<String, Value>) -> Result<Decimal, GenerationError> {
    let text = match field(object, &["amount"]) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(GenerationError::Malformed("amount is required".to_string())),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| GenerationError::Malformed(format!("amount '{text}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_camel_case_draft() {
        let id = MotorcycleId::new();
        let draft = parse_generated_draft(&json!({
            "id": "CA-999",
            "personnel": "Lito Liaison",
            "purpose": "LTO registration",
            "amount": 2500,
            "date": "2024-03-01",
            "status": "Approved",
            "motorcycleIds": [id.to_string()],
        }))
        .unwrap();

        assert_eq!(draft.amount, dec!(2500));
        assert_eq!(draft.motorcycle_ids, vec![id]);
        assert_eq!(draft.source, DraftSource::Generated);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_snake_case_and_string_amount() {
        let draft = parse_generated_draft(&json!({
            "personnel": "Lito Liaison",
            "purpose": "LTO registration",
            "amount": "2500.50",
            "date": "2024-03-01",
            "motorcycle_ids": [],
        }))
        .unwrap();
        assert_eq!(draft.amount, dec!(2500.50));
        assert!(draft.motorcycle_ids.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_generated_draft(&json!("Sure! Here is your cash advance")),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_generated_draft(&json!({
                "personnel": "Lito", "purpose": "LTO", "amount": "lots",
                "date": "2024-03-01", "motorcycleIds": []
            })),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_generated_draft(&json!({
                "personnel": "Lito", "purpose": "LTO", "amount": 1,
                "date": "March 1", "motorcycleIds": []
            })),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_generated_draft(&json!({
                "personnel": "Lito", "purpose": "LTO", "amount": 1,
                "date": "2024-03-01", "motorcycleIds": ["m1"]
            })),
            Err(GenerationError::Malformed(_))
        ));
    }
}
