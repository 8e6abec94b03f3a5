//! Feed types

use rust_decimal::Decimal;
use std::collections::HashMap;

/// Latest observed price per symbol from one poll cycle
pub type PriceMap = HashMap<String, Decimal>;
