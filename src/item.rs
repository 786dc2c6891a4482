//! Print-queue item records.

use serde::{Deserialize, Deserializer, Serialize};

/// One point-of-sale item queued for printing.
///
/// Serialized field names follow the point-of-sale item export, so exported
/// rows deserialize directly. Extra export columns are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintItem {
    /// Opaque identifier, unique within a queue.
    #[serde(rename = "Token")]
    pub token: String,
    #[serde(rename = "Item Name", default)]
    pub name: String,
    /// Barcode source. Empty means no barcode.
    #[serde(rename = "SKU", default)]
    pub sku: String,
    /// Decimal-formatted price. Empty means no price.
    #[serde(rename = "Price", default)]
    pub price: String,
    /// Labels to print. `None` is an unset count and prints nothing.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub count: Option<u32>,
}

impl PrintItem {
    /// Build an item with an unset count.
    pub fn new(
        token: impl Into<String>,
        name: impl Into<String>,
        sku: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            sku: sku.into(),
            price: price.into(),
            count: None,
        }
    }

    /// Set the label count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Number of labels this item contributes. Unset counts contribute none.
    pub fn label_count(&self) -> usize {
        self.count.unwrap_or(0) as usize
    }

    /// SKU when it carries barcode data.
    pub fn sku(&self) -> Option<&str> {
        non_blank(&self.sku)
    }

    /// Price when one is set.
    pub fn price(&self) -> Option<&str> {
        non_blank(&self.price)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Single-field edit applied through [`crate::PrintQueue::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemEdit {
    Name(String),
    Sku(String),
    Price(String),
    Count(Option<u32>),
}

impl ItemEdit {
    pub(crate) fn apply(self, item: &mut PrintItem) {
        match self {
            Self::Name(name) => item.name = name,
            Self::Sku(sku) => item.sku = sku,
            Self::Price(price) => item.price = price,
            Self::Count(count) => item.count = count,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accept integers, integral floats, numeric strings, `""`, and `null`.
/// Anything else (negative, fractional, garbage) is an unset count.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCount>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawCount::Int(value)) => u32::try_from(value).ok(),
        Some(RawCount::Float(value))
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 =>
        {
            u32::try_from(value as u64).ok()
        }
        Some(RawCount::Float(_)) => None,
        Some(RawCount::Text(text)) => text.trim().parse::<u32>().ok(),
        None => None,
    })
}
