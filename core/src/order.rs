//! Orders and the JSON shapes exchanged with the sidecar.
//!
//! An order payload is opaque to the gateway. The only field it ever looks at
//! is `orderId`, which becomes the record key in the state store; everything
//! else is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

/// Name of the payload field carrying the order identifier.
pub const ORDER_ID_FIELD: &str = "orderId";

/// Largest integer an `f64` represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Errors raised while interpreting an order payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The payload is not a JSON object, so it cannot carry an `orderId`.
    #[error("order data must be a JSON object")]
    NotAnObject,

    /// The payload has no `orderId` field.
    #[error("order data is missing `orderId`")]
    MissingOrderId,

    /// The `orderId` field is neither a string nor a number.
    #[error("`orderId` must be a string or a number, got {0}")]
    InvalidOrderId(&'static str),

    /// A publish event was built without any target.
    #[error("an event needs at least one target")]
    NoTargets,
}

/// String form of an order identifier, used verbatim as a record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Derive an order id from a JSON value.
    ///
    /// Strings are taken as-is and numbers use their canonical decimal form,
    /// so `"42"`, `42` and `42.0` all yield the key `"42"`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidOrderId`] for any other JSON type.
    pub fn from_value(value: &Value) -> Result<Self, OrderError> {
        match value {
            Value::String(s) => Ok(Self(s.clone())),
            Value::Number(n) => Ok(Self(number_key(n))),
            Value::Null => Err(OrderError::InvalidOrderId("null")),
            Value::Bool(_) => Err(OrderError::InvalidOrderId("a boolean")),
            Value::Array(_) => Err(OrderError::InvalidOrderId("an array")),
            Value::Object(_) => Err(OrderError::InvalidOrderId("an object")),
        }
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Integral floats within the safe-integer range drop their fraction.
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            #[allow(clippy::cast_possible_truncation)]
            let whole = f as i64;
            whole.to_string()
        }
        _ => n.to_string(),
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An order: its identifier plus the untouched payload it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    data: Value,
}

impl Order {
    /// Read `orderId` out of an order payload.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotAnObject`] if `data` is not a JSON object
    /// - [`OrderError::MissingOrderId`] if the object has no `orderId`
    /// - [`OrderError::InvalidOrderId`] if `orderId` is not a string or number
    pub fn from_data(data: Value) -> Result<Self, OrderError> {
        let id = {
            let object = data.as_object().ok_or(OrderError::NotAnObject)?;
            let raw = object
                .get(ORDER_ID_FIELD)
                .ok_or(OrderError::MissingOrderId)?;
            OrderId::from_value(raw)?
        };

        Ok(Self { id, data })
    }

    /// The order identifier.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Turn the order into the state record stored under its id.
    #[must_use]
    pub fn into_record(self) -> Record {
        Record {
            key: self.id.0,
            value: self.data,
        }
    }
}

/// A `{key, value}` pair persisted in a sidecar store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record key.
    pub key: String,
    /// Record value, opaque JSON.
    pub value: Value,
}

impl Record {
    /// Create a record.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Instructions to persist records, returned to the sidecar from a
/// subscription delivery.
///
/// Serializes as `{"state": {"storeId": ..., "records": [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDirective {
    /// The write to perform.
    pub state: StateWrite,
}

/// The body of a [`StateDirective`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateWrite {
    /// Target store.
    pub store_id: String,
    /// Records to write.
    pub records: Vec<Record>,
}

impl StateDirective {
    /// Directive writing a single record to `store_id`.
    #[must_use]
    pub fn single(store_id: impl Into<String>, record: Record) -> Self {
        Self {
            state: StateWrite {
                store_id: store_id.into(),
                records: vec![record],
            },
        }
    }
}

/// A named event handed to the sidecar for delivery.
///
/// Serializes as `{"eventName": ..., "data": ..., "to": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEvent {
    /// Event name.
    pub event_name: String,
    /// Event payload.
    pub data: Value,
    /// Logical subscriber targets.
    pub to: Vec<String>,
}

impl PublishEvent {
    /// Create an event.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NoTargets`] if `to` is empty; the sidecar
    /// refuses such events anyway.
    pub fn new(
        event_name: impl Into<String>,
        data: Value,
        to: Vec<String>,
    ) -> Result<Self, OrderError> {
        if to.is_empty() {
            return Err(OrderError::NoTargets);
        }

        Ok(Self {
            event_name: event_name.into(),
            data,
            to,
        })
    }

    /// Event named after `topic` and addressed to it alone.
    #[must_use]
    pub fn to_topic(topic: &str, data: Value) -> Self {
        Self {
            event_name: topic.to_string(),
            data,
            to: vec![topic.to_string()],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_id_from_string_and_number() {
        assert_eq!(OrderId::from_value(&json!("42")).unwrap().as_str(), "42");
        assert_eq!(OrderId::from_value(&json!(42)).unwrap().as_str(), "42");
        assert_eq!(OrderId::from_value(&json!(4.5)).unwrap().as_str(), "4.5");
    }

    #[test]
    fn test_integral_float_order_id_has_no_fraction() {
        let key = |raw: &str| {
            let data: Value = serde_json::from_str(&format!(r#"{{"orderId": {raw}}}"#)).unwrap();
            Order::from_data(data).unwrap().into_record().key
        };

        assert_eq!(key("1.0"), "1");
        assert_eq!(key("1e3"), "1000");
        assert_eq!(key("-0.0"), "0");
        assert_eq!(key("-12.0"), "-12");
        assert_eq!(key("2.5"), "2.5");
    }

    #[test]
    fn test_order_id_rejects_other_types() {
        assert_eq!(
            OrderId::from_value(&json!(true)),
            Err(OrderError::InvalidOrderId("a boolean"))
        );
        assert_eq!(
            OrderId::from_value(&Value::Null),
            Err(OrderError::InvalidOrderId("null"))
        );
    }

    #[test]
    fn test_order_requires_object_with_id() {
        assert_eq!(Order::from_data(json!([1, 2])), Err(OrderError::NotAnObject));
        assert_eq!(
            Order::from_data(json!({ "item": "widget" })),
            Err(OrderError::MissingOrderId)
        );
    }

    #[test]
    fn test_directive_wire_shape() {
        let order = Order::from_data(json!({ "orderId": 7, "item": "widget" })).unwrap();
        let directive = StateDirective::single("orders", order.into_record());

        assert_eq!(
            serde_json::to_value(&directive).unwrap(),
            json!({
                "state": {
                    "storeId": "orders",
                    "records": [
                        { "key": "7", "value": { "orderId": 7, "item": "widget" } }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_publish_event_wire_shape() {
        let event = PublishEvent::to_topic("neworder-queue", json!({ "orderId": "42" }));

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "eventName": "neworder-queue",
                "data": { "orderId": "42" },
                "to": ["neworder-queue"]
            })
        );
    }

    #[test]
    fn test_publish_event_needs_targets() {
        let result = PublishEvent::new("neworder", json!({}), vec![]);
        assert_eq!(result, Err(OrderError::NoTargets));
    }
}
