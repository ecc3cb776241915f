//! Value types that definition documents may name besides the builtin ones.

use argform_core::{SemanticType, TypedValue, ValueTransformer};
use argform_extract::TransformerRegistry;

/// Registry with the custom types the binary understands.
///
/// - `positive_int`: integer `>= 1`
/// - `non_negative_int`: integer `>= 0`
/// - `port`: integer in `1..=65535`
/// - `unit_float`: float in `0.0..=1.0`
pub fn builtin_registry() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    registry.register("positive_int", bounded_int(1, i64::MAX));
    registry.register("non_negative_int", bounded_int(0, i64::MAX));
    registry.register("port", bounded_int(1, 65535));
    registry.register(
        "unit_float",
        ValueTransformer::returning(SemanticType::Float, |raw| {
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("`{raw}` is not a number"))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{value} is outside 0.0..=1.0"));
            }
            Ok(TypedValue::Float(value))
        }),
    );
    registry
}

fn bounded_int(min: i64, max: i64) -> ValueTransformer {
    ValueTransformer::returning(SemanticType::Integer, move |raw| {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("`{raw}` is not an integer"))?;
        if value < min {
            return Err(format!("must be at least {min}, got {value}"));
        }
        if value > max {
            return Err(format!("must be at most {max}, got {value}"));
        }
        Ok(TypedValue::Integer(value))
    })
}
