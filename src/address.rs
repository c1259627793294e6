use crate::{Error, Result};
use derive_more::Display;
use serde::Serialize;

const ADDRESS_HEX_LEN: usize = 40;

///
/// Address
///
/// A validated account identifier: `0x` followed by 40 lowercase hex digits.
/// Everything downstream of `parse` may assume this shape.
///

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
pub struct Address(String);

impl Address {
    /// Sanitize and validate user input. Non-alphanumeric characters are
    /// dropped first, so pasted values with stray whitespace or quotes still parse.
    pub fn parse(input: &str) -> Result<Self> {
        let sanitized: String = input.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let lower = sanitized.to_ascii_lowercase();

        let digits = lower
            .strip_prefix("0x")
            .ok_or_else(|| Error::InvalidAddress(input.to_string()))?;

        if digits.len() != ADDRESS_HEX_LEN || hex::decode(digits).is_err() {
            return Err(Error::InvalidAddress(input.to_string()));
        }

        Ok(Self(lower))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a record endpoint.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Short form used in log lines and file names.
    pub fn short(&self) -> &str {
        &self.0[..10]
    }
}
