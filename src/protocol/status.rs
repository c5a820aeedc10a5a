use std::fmt;

use super::DictError;

pub const DATABASES_FOLLOW: u16 = 110;
pub const STRATEGIES_FOLLOW: u16 = 111;
pub const DEFINITIONS_FOLLOW: u16 = 150;
pub const DEFINITION_FOLLOWS: u16 = 151;
pub const MATCHES_FOLLOW: u16 = 152;
pub const GREETING: u16 = 220;
pub const CLOSING: u16 = 221;
pub const OK: u16 = 250;
pub const INVALID_DATABASE: u16 = 550;
pub const INVALID_STRATEGY: u16 = 551;
pub const NO_MATCH: u16 = 552;
pub const NO_DATABASES: u16 = 554;
pub const NO_STRATEGIES: u16 = 555;

/// Leading status line of a server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub detail: String,
}

impl TryFrom<&str> for Status {
    type Error = DictError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let line = value.trim_end_matches(['\r', '\n']);
        let (code, detail) = line
            .split_once(' ')
            .ok_or_else(|| DictError::protocol(format!("malformed status line '{line}'")))?;

        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DictError::protocol(format!(
                "invalid status code in '{line}'"
            )));
        }

        let code = code
            .parse::<u16>()
            .map_err(|_| DictError::protocol(format!("invalid status code in '{line}'")))?;

        Ok(Status {
            code,
            detail: detail.to_string(),
        })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.detail)
    }
}
