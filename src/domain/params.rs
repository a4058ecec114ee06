//! Lenient request argument handling shared by the REST and MCP adapters
//!
//! Arguments arrive as loose JSON from both surfaces. Numeric fields accept
//! numbers or numeric strings; anything unreadable counts as absent.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest stay that gets priced. Longer ranges count as no dates.
pub const MAX_NIGHTS: u32 = 3_650;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adults: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
}

impl SearchParams {
    /// Reads the known fields out of a JSON value. Non-object input yields
    /// empty params.
    pub fn from_value(value: &Value) -> Self {
        Self {
            location: text_field(value, "location"),
            checkin: text_field(value, "checkin"),
            checkout: text_field(value, "checkout"),
            adults: count_field(value, "adults"),
            children: count_field(value, "children"),
            infants: count_field(value, "infants"),
            pets: count_field(value, "pets"),
            min_price: count_field(value, "minPrice"),
            max_price: count_field(value, "maxPrice"),
        }
    }

    /// Number of nights between check-in and check-out, when both dates are
    /// readable, in order and at most [`MAX_NIGHTS`] apart.
    pub fn nights(&self) -> Option<u32> {
        let checkin = parse_date(self.checkin.as_deref()?)?;
        let checkout = parse_date(self.checkout.as_deref()?)?;
        let nights = (checkout - checkin).num_days();
        u32::try_from(nights)
            .ok()
            .filter(|nights| (1..=MAX_NIGHTS).contains(nights))
    }
}

pub fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn count_field(value: &Value, key: &str) -> Option<u32> {
    match value.get(key)? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n.trunc() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => leading_integer(text.trim()),
        _ => None,
    }
}

/// Parses the leading run of ASCII digits, so `"2 adults"` reads as 2.
fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
