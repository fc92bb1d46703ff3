//! Order event payloads for the ranking service
//!
//! Order events arrive as free-form text. Two bracketed fields carry the
//! data the ranking needs:
//!
//! ```text
//! Order (sku-42) placed at 2024-01-01T00:00:00Z with quantity (3)
//!       ^^^^^^^                                            ^
//!       product id                                         quantity
//! ```
//!
//! Decoding is a pure function. A payload that does not carry both fields
//! is rejected with a [`DecodeError`] and must not reach the store.

/// Marker opening the product identifier field.
pub const PRODUCT_MARKER: &str = "Order (";
/// Marker opening the quantity field.
pub const QUANTITY_MARKER: &str = "quantity (";
/// Marker closing either field.
pub const FIELD_END: &str = ")";

/// Opaque product identifier, never empty once decoded.
pub type ProductId = String;

/// Ordered quantity carried by a single event.
pub type Quantity = u64;

/// A successfully decoded order event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderEvent {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl OrderEvent {
    pub fn new(product_id: impl Into<ProductId>, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Reasons a payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing product id field `Order (...)`")]
    MissingProductId,

    #[error("empty product id")]
    EmptyProductId,

    #[error("missing quantity field `quantity (...)`")]
    MissingQuantity,

    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),
}

impl DecodeError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::MissingProductId => "missing_product_id",
            DecodeError::EmptyProductId => "empty_product_id",
            DecodeError::MissingQuantity => "missing_quantity",
            DecodeError::InvalidQuantity(_) => "invalid_quantity",
        }
    }
}

/// Decode a raw payload into an [`OrderEvent`].
pub fn decode(payload: &str) -> Result<OrderEvent, DecodeError> {
    let product_id = match extract_between(payload, PRODUCT_MARKER, FIELD_END) {
        None => return Err(DecodeError::MissingProductId),
        Some("") => return Err(DecodeError::EmptyProductId),
        Some(id) => id,
    };

    let quantity = match extract_between(payload, QUANTITY_MARKER, FIELD_END) {
        None | Some("") => return Err(DecodeError::MissingQuantity),
        Some(raw) => parse_quantity(raw)?,
    };

    Ok(OrderEvent::new(product_id, quantity))
}

/// Return the text between the first `start` marker and the first `end`
/// marker after it. `None` when either marker is absent.
fn extract_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let len = rest.find(end)?;
    Some(&rest[..len])
}

/// Plain decimal digits only: no sign, no whitespace.
fn parse_quantity(raw: &str) -> Result<Quantity, DecodeError> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidQuantity(raw.to_string()));
    }
    raw.parse::<Quantity>()
        .map_err(|_| DecodeError::InvalidQuantity(raw.to_string()))
}
