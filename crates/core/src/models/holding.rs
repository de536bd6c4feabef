use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Open-ended key/value bag attached to a holding. Not validated —
/// carries whatever display data the frontend wants to keep around
/// (display name, icon URL, market stats, external price-lookup id).
pub type Metadata = serde_json::Map<String, Value>;

/// One symbol's quantity and cost-basis record within a user's portfolio.
///
/// `symbol` is always stored normalized (trimmed, uppercased); within one
/// portfolio no two holdings share the same symbol. `amount` and `avg_price`
/// are always finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Stable identifier assigned at creation, used for targeted update/delete.
    pub id: Uuid,

    /// Normalized ticker symbol (e.g., "BTC", "ETH").
    pub symbol: String,

    /// Quantity held.
    pub amount: f64,

    /// Average cost basis per unit.
    pub avg_price: f64,

    /// Optional free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Optional external display data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation of this holding.
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    /// Create a new holding with a fresh id and current timestamps.
    ///
    /// `symbol` must already be normalized by the caller. Numeric fields are
    /// clamped to finite non-negative values.
    pub fn new(
        symbol: impl Into<String>,
        amount: f64,
        avg_price: f64,
        notes: Option<String>,
        metadata: Option<Metadata>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            amount: clamp_stored(amount),
            avg_price: clamp_stored(avg_price),
            notes,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Clamp a value destined for a stored `amount`/`avg_price` field:
/// NaN, infinities, and negatives all become 0.
pub(crate) fn clamp_stored(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// A raw candidate holding, as submitted to replace/add/import.
///
/// Deserialization is deliberately lenient, matching what the surrounding
/// JSON API accepts: `symbol` may be any scalar (stringified), `amount` and
/// `avgPrice` may be numbers, numeric strings, or bools — anything else
/// coerces to 0. Negative amounts are kept here; import treats them as
/// deltas, while paths that store the value directly clamp them to 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    #[serde(default, deserialize_with = "de_scalar_string")]
    pub symbol: Option<String>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub amount: f64,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub avg_price: f64,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl HoldingInput {
    pub fn new(symbol: impl Into<String>, amount: f64, avg_price: f64) -> Self {
        Self {
            symbol: Some(symbol.into()),
            amount,
            avg_price,
            notes: None,
            metadata: None,
        }
    }

    /// Attach free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach external display metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Partial update for a single holding. Only supplied fields are changed.
///
/// Every field uses a double `Option` (or `Option` with a lenient inner
/// coercion) so a supplied `null` is distinguishable from the field being
/// absent: `null` notes/metadata clear the field, a `null` number coerces
/// to 0, and an absent field is left alone. Absent fields are omitted on
/// serialization so a round-trip preserves that distinction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPatch {
    #[serde(
        default,
        deserialize_with = "de_opt_lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,

    #[serde(
        default,
        deserialize_with = "de_opt_lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_price: Option<f64>,

    #[serde(
        default,
        deserialize_with = "de_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "de_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<Option<Metadata>>,
}

impl HoldingPatch {
    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn avg_price(mut self, avg_price: f64) -> Self {
        self.avg_price = Some(avg_price);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Coerce an arbitrary JSON value to f64: numbers pass through, numeric
/// strings are parsed, bools map to 1/0, everything else (and non-finite
/// results) becomes 0.
pub(crate) fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

/// A supplied numeric field always coerces, so `null` stores 0; only a field
/// that is absent altogether reads as `None` (leave unchanged).
fn de_opt_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(coerce_number(&value)))
}

/// Stringify any JSON scalar; null and structured values read as "no symbol".
fn de_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Mark a field as explicitly supplied, even when its value is `null`.
fn de_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
