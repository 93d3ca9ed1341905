//! RUT identifier — the validated key used both against the flag backend
//! and as the character sequence typed into the time-clock keypad.
//!
//! Accepted shape (no dots, no dash): 7–8 digits followed by a check
//! character that is either a digit or `k`. Total length 8 or 9.

use serde::{Deserialize, Serialize};

use crate::error::{MarcajeError, Result};

/// A validated, lowercased RUT.
///
/// `Display` renders the masked form (`1234****`) so identifiers never leak
/// through logs or email subjects; [`Rut::as_str`] gives the full sequence
/// for keypad entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut(String);

impl Rut {
    /// Validate and normalize a candidate identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let rut = raw.trim().to_lowercase();

        if !(8..=9).contains(&rut.len()) {
            return Err(MarcajeError::InvalidRut(format!(
                "'{}' has length {}, expected 8 or 9",
                mask(&rut),
                rut.len()
            )));
        }

        let mut chars = rut.chars();
        let check = chars.next_back().unwrap_or('\0');
        if !check.is_ascii_digit() && check != 'k' {
            return Err(MarcajeError::InvalidRut(format!(
                "'{}' check character must be a digit or 'k'",
                mask(&rut)
            )));
        }

        if !chars.as_str().chars().all(|c| c.is_ascii_digit()) {
            return Err(MarcajeError::InvalidRut(format!(
                "'{}' body must be all digits",
                mask(&rut)
            )));
        }

        Ok(Self(rut))
    }

    /// Full character sequence, for keypad entry only.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First four characters plus `****` — safe for logs and subjects.
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

fn mask(s: &str) -> String {
    let head: String = s.chars().take(4).collect();
    format!("{head}****")
}

impl std::fmt::Display for Rut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl TryFrom<String> for Rut {
    type Error = MarcajeError;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.0
    }
}
