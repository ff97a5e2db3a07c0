use serde::Serializer;
use serde::ser::SerializeMap;

use crate::Rates;

// 2^53 - 1, above this integral floats are no longer exact
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Writes whole-number rates as JSON integers (`160` rather than `160.0`).
pub fn serialize<S: Serializer>(
    rates: &Rates,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(rates.len()))?;
    for (currency, rate) in rates {
        if rate.fract() == 0.0 && rate.abs() <= MAX_EXACT_INTEGER {
            map.serialize_entry(currency, &(*rate as i64))?;
        } else {
            map.serialize_entry(currency, rate)?;
        }
    }
    map.end()
}
