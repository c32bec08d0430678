//! Per-type string-to-value conversion, selected by an argument's type parameter.
//!
//! Every type an [`crate::arg::Argument`] can hold implements [`ArgValue`], giving a
//! pair of conversions: `from_args` turns the popped raw tokens into `Self`, and
//! `to_args` turns `Self` back into tokens so transformed values can be written
//! back into [`crate::input::Input`] (§4.3 step 6) and so the completer can offer
//! suggestions derived from a default value.

use crate::error::CommandError;

/// A value type usable as an [`crate::arg::Argument`]'s payload.
pub trait ArgValue: Clone + std::fmt::Debug + PartialEq + 'static {
    /// Parse `tokens` (already popped from `Input`) into a value of this type.
    fn from_args(tokens: &[String]) -> Result<Self, CommandError>;

    /// Render this value back into the token form it was parsed from.
    fn to_args(&self) -> Vec<String>;
}

impl ArgValue for String {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        tokens
            .first()
            .cloned()
            .ok_or_else(|| CommandError::Internal("expected exactly one token".into()))
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl ArgValue for Vec<String> {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        Ok(tokens.to_vec())
    }

    fn to_args(&self) -> Vec<String> {
        self.clone()
    }
}

impl ArgValue for i64 {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        let token = tokens
            .first()
            .ok_or_else(|| CommandError::Internal("expected exactly one token".into()))?;
        token
            .parse()
            .map_err(|_| CommandError::Internal(format!("\"{token}\" is not an integer")))
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl ArgValue for Vec<i64> {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        tokens.iter().map(|t| i64::from_args(std::slice::from_ref(t))).collect()
    }

    fn to_args(&self) -> Vec<String> {
        self.iter().map(i64::to_string).collect()
    }
}

impl ArgValue for f64 {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        let token = tokens
            .first()
            .ok_or_else(|| CommandError::Internal("expected exactly one token".into()))?;
        token
            .parse()
            .map_err(|_| CommandError::Internal(format!("\"{token}\" is not a float")))
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl ArgValue for Vec<f64> {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        tokens.iter().map(|t| f64::from_args(std::slice::from_ref(t))).collect()
    }

    fn to_args(&self) -> Vec<String> {
        self.iter().map(f64::to_string).collect()
    }
}

impl ArgValue for bool {
    fn from_args(tokens: &[String]) -> Result<Self, CommandError> {
        let token = tokens
            .first()
            .ok_or_else(|| CommandError::Internal("expected exactly one token".into()))?;
        match token.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CommandError::Internal(format!(
                "\"{other}\" is not a boolean"
            ))),
        }
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}
