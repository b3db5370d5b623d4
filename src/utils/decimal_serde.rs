use rust_decimal::Decimal;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;

// Ledger amounts cross the serialization boundary as strings, rounded to the
// ledger precision on the way out so intermediate division artifacts never
// leak into output.

fn rounded(value: &Decimal) -> String {
    value.round_dp(DECIMAL_PRECISION).to_string()
}

pub mod decimal_serde {
    use super::*;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&rounded(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Decimal::from_str(&s).map_err(|_| D::Error::custom("expected a decimal number"))
    }
}

// `None` means the metric is unavailable, which is distinct from zero and
// must round-trip as such.
pub mod decimal_serde_option {
    use super::*;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&rounded(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| {
                Decimal::from_str(&s).map_err(|_| D::Error::custom("expected a decimal number"))
            })
            .transpose()
    }
}
