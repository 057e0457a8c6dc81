//! Shape check for model-generated transfer intents

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Length of a `0x`-prefixed 20-byte hex address
const ADDRESS_LEN: usize = 42;

/// Transfer amount as the model produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(Number),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Text(s) => f.write_str(s),
            // integral floats render without a fractional part ("10", not "10.0")
            Amount::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() && x.fract() == 0.0 && x.abs() < 1e21 => {
                    write!(f, "{:.0}", x)
                }
                _ => write!(f, "{}", n),
            },
        }
    }
}

/// A validated transfer intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferContent {
    pub recipient: String,
    pub amount: Amount,
}

impl TransferContent {
    /// Narrow a generated object, returning `Some` exactly when
    /// [`is_valid_transfer`] holds.
    pub fn from_value(content: &Value) -> Option<Self> {
        let object = content.as_object()?;
        let recipient = object.get("recipient")?.as_str()?;
        let amount = match object.get("amount")? {
            Value::String(s) => Amount::Text(s.clone()),
            Value::Number(n) => Amount::Number(n.clone()),
            _ => return None,
        };

        if !recipient.starts_with("0x") || recipient.encode_utf16().count() != ADDRESS_LEN {
            return None;
        }

        Some(Self {
            recipient: recipient.to_string(),
            amount,
        })
    }
}

/// True iff `content` is an object with a string `recipient` of the form
/// `0x` + 40 characters and a string or numeric `amount`.
///
/// Hex digits and checksums are not checked here.
pub fn is_valid_transfer(content: &Value) -> bool {
    TransferContent::from_value(content).is_some()
}
