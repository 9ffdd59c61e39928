use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on USD valuations.
pub const USD_PRECISION: u32 = 4;

/// Truncates towards zero to `precision` decimal places. Never rounds up.
pub fn round_down(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::ToZero)
}

/// Rounds away from zero to `precision` decimal places.
pub fn round_up(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::AwayFromZero)
}

pub fn round_usd(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(USD_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of decimal places expressed by an increment such as `0.001`.
pub fn precision_of_increment(increment: Decimal) -> u32 {
    if increment.is_zero() {
        return 0;
    }
    let normalized = increment.normalize();
    if normalized >= Decimal::ONE {
        0
    } else {
        normalized.scale()
    }
}

/// Serde helpers for venue fields that arrive as decimal strings, sometimes empty.
pub mod decimal_or_zero {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(Decimal::ZERO),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Decimal::ZERO),
            Some(Value::String(s)) => Decimal::from_str(s.trim())
                .or_else(|_| Decimal::from_scientific(s.trim()))
                .map_err(|e| serde::de::Error::custom(format!("Invalid decimal '{}': {}", s, e))),
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .map_err(|e| serde::de::Error::custom(format!("Invalid decimal '{}': {}", n, e))),
            Some(other) => Err(serde::de::Error::custom(format!("Expected decimal, got {}", other))),
        }
    }
}

/// Precision fields that venues send as `"4"`, `4` or an increment like `"0.0001"`.
pub mod precision_from_str {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(0),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(serde::de::Error::custom(format!("Expected precision, got {}", other))),
        };

        if raw.is_empty() {
            return Ok(0);
        }
        if let Ok(places) = raw.parse::<u32>() {
            return Ok(places);
        }
        Decimal::from_str(&raw)
            .map(super::precision_of_increment)
            .map_err(|e| serde::de::Error::custom(format!("Invalid precision '{}': {}", raw, e)))
    }
}

/// Increment fields such as `"0.0001"` or `"1"`, always read as a step size.
pub mod increment_precision {
    use serde::Deserializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let increment = super::decimal_or_zero::deserialize(deserializer)?;
        Ok(super::precision_of_increment(increment))
    }
}
