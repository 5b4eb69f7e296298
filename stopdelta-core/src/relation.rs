//! Transfer relations between stations and the interchange table derived
//! from them.

use std::fmt;

/// Minimum digits of an identifier token in the relation table.
pub const MIN_RELATION_ID_DIGITS: usize = 7;

/// Separator token of reciprocal lines.
pub const RECIPROCAL_SEPARATOR: &str = ":";

/// An ordered station pair read from the relation table.
///
/// Identifiers are kept as the tokens that appeared in the table so that
/// reciprocal lines reproduce them byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferPair {
    /// First identifier token.
    pub first: String,
    /// Second identifier token.
    pub second: String,
}

impl TransferPair {
    /// Parse the leading two tokens of a cleaned relation line.
    ///
    /// Both tokens must be ASCII digits with at least
    /// [`MIN_RELATION_ID_DIGITS`] characters.
    ///
    /// # Examples
    /// ```
    /// use stopdelta_core::TransferPair;
    ///
    /// let pair = TransferPair::from_line("1700005 8500010 002").expect("pair");
    /// assert_eq!(pair.reciprocal().to_string(), "8500010 : 1700005");
    /// assert!(TransferPair::from_line("8500010 : 1700005").is_none());
    /// ```
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let first = tokens.next().filter(|token| is_relation_id(token))?;
        let second = tokens.next().filter(|token| is_relation_id(token))?;
        Some(Self {
            first: first.to_owned(),
            second: second.to_owned(),
        })
    }

    /// Mirror-direction entry for this pair.
    #[must_use]
    pub fn reciprocal(&self) -> ReciprocalEntry {
        ReciprocalEntry {
            second: self.second.clone(),
            first: self.first.clone(),
        }
    }
}

/// Synthesised mirror of a [`TransferPair`], rendered `"<second> : <first>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReciprocalEntry {
    /// The pair's second identifier, leading the line.
    pub second: String,
    /// The pair's first identifier.
    pub first: String,
}

impl fmt::Display for ReciprocalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {RECIPROCAL_SEPARATOR} {}", self.second, self.first)
    }
}

/// Return whether `token` looks like a station identifier in the relation
/// table.
#[must_use]
pub fn is_relation_id(token: &str) -> bool {
    token.len() >= MIN_RELATION_ID_DIGITS && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// Two-character interchange code.
///
/// # Examples
/// ```
/// use stopdelta_core::InterchangeCode;
///
/// assert_eq!(InterchangeCode::from_token("002").as_str(), "02");
/// assert_eq!(InterchangeCode::from_token("5").as_str(), "05");
/// assert_eq!(InterchangeCode::default().as_str(), "00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterchangeCode(String);

impl InterchangeCode {
    /// Keep the last two characters of `token`, zero-padding shorter tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let chars: Vec<char> = token.chars().collect();
        let tail: String = chars.iter().skip(chars.len().saturating_sub(2)).collect();
        Self(format!("{tail:0>2}"))
    }

    /// Borrow the code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InterchangeCode {
    fn default() -> Self {
        Self("00".to_owned())
    }
}

impl fmt::Display for InterchangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of the interchange table, `"<id> <code> <code> <name>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterchangeRecord {
    /// Identifier as written in the name index.
    pub id: String,
    /// Interchange code, repeated twice on output.
    pub code: InterchangeCode,
    /// Station name without the name index suffix.
    pub name: String,
}

impl fmt::Display for InterchangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.id, self.code, self.code, self.name)
    }
}
