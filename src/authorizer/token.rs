//! Authorization token parsing.
//!
//! Format: `<scheme> <key>=<value>`. The scheme ends at the first space;
//! the remainder must contain exactly one `=`.

use std::str::FromStr;

use crate::authorizer::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub scheme: String,
    pub key: String,
    pub value: String,
}

impl FromStr for AuthToken {
    type Err = AuthError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Err(AuthError::Unauthorized);
        }
        let (scheme, pair) = token.split_once(' ').ok_or(AuthError::Unauthorized)?;

        let mut parts = pair.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AuthError::Unauthorized);
        };

        Ok(Self {
            scheme: scheme.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
