use crate::model::Amount;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Company name printed on a slip when the server does not send one.
pub const DEFAULT_SLIP_NAME: &str = "M/S A H P TRAVELS";

/// The side of a transaction a slip is printed for.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    #[default]
    Lender,
    Borrower,
}

serde_plain::derive_display_from_serialize!(PartyRole);
serde_plain::derive_fromstr_from_deserialize!(PartyRole);

/// A slip cell. The server sends numbers for money columns and text for the rest, but is not
/// strict about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlipValue {
    Number(Amount),
    Text(String),
}

impl Display for SlipValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SlipValue::Number(a) => f.write_str(&a.grouped()),
            SlipValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlipHeader {
    #[serde(default)]
    pub name: Option<String>,
}

/// One party line of a slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipRow {
    #[serde(default)]
    pub cash: Option<SlipValue>,
    #[serde(default)]
    pub party_name: String,
    #[serde(default)]
    pub party_status: String,
    #[serde(default)]
    pub due: Option<SlipValue>,
    #[serde(default)]
    pub up_to: Option<SlipValue>,
    #[serde(default)]
    pub m: Option<SlipValue>,
    #[serde(default)]
    pub ap: Option<SlipValue>,
    #[serde(default)]
    pub amt: Option<SlipValue>,
}

/// A transaction projected for one party role, ready to print.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slip {
    #[serde(default)]
    pub header: SlipHeader,
    #[serde(default)]
    pub rows: Vec<SlipRow>,
    #[serde(default)]
    pub subtotal_cash: Option<SlipValue>,
    #[serde(default)]
    pub subtotal_amt: Option<SlipValue>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl Slip {
    /// The printed company name.
    pub fn name(&self) -> &str {
        self.header
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SLIP_NAME)
    }
}
