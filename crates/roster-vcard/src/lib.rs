//! Minimal vCard 3.0/4.0 codec for Roster.
//!
//! Cards are decoded into an ordered sequence of [`Property`] values and
//! encoded back to canonical text (CRLF line endings, lines folded at 75
//! octets). The codec does not interpret property values; it only keeps
//! the structure needed to filter properties by parameter and to check the
//! format's required-property rules.
//!
//! Decoding then re-encoding is stable: for every card `c` produced by
//! [`VCard::parse`], `VCard::parse(&c.serialize()) == Ok(c)`.

mod parse;
mod validate;
mod write;

use thiserror::Error;

pub use validate::ValidationIssue;

/// Errors that can occur while decoding a card.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VCardError {
    #[error("card data is not valid UTF-8")]
    InvalidUtf8,
    #[error("card data is empty")]
    Empty,
    #[error("expected BEGIN:VCARD, found {0:?}")]
    MissingBegin(String),
    #[error("missing END:VCARD")]
    MissingEnd,
    #[error("content after END:VCARD on line {0}")]
    TrailingContent(usize),
    #[error("nested components are not supported (line {0})")]
    NestedComponent(usize),
    #[error("malformed content line {line}: {reason}")]
    MalformedLine { line: usize, reason: &'static str },
}

/// A property parameter such as `TYPE=work` or `X-NC-SCOPE=v2-local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Upper-cased parameter name.
    pub name: String,
    /// Unquoted value. `None` for bare vCard 2.1 style parameters.
    pub value: Option<String>,
}

/// One content line of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Optional group prefix (`item1` in `item1.EMAIL`).
    pub group: Option<String>,
    /// Upper-cased property name.
    pub name: String,
    pub params: Vec<Param>,
    /// Raw, still-escaped value text.
    pub value: String,
}

impl Property {
    /// Creates a property with no group and no parameters.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    /// Adds a parameter, builder style.
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.to_ascii_uppercase(),
            value: Some(value.into()),
        });
        self
    }

    /// Returns the value of the first parameter named `name`.
    ///
    /// Parameter names compare case-insensitively.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.value.as_deref())
    }
}

/// A decoded card: the properties between `BEGIN:VCARD` and `END:VCARD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VCard {
    pub properties: Vec<Property>,
}

impl VCard {
    /// Creates a card from its properties.
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    /// Decodes serialized card data.
    pub fn parse(data: &[u8]) -> Result<Self, VCardError> {
        parse::parse(data)
    }

    /// Encodes the card as canonical vCard text.
    pub fn serialize(&self) -> Vec<u8> {
        write::write(self)
    }

    /// Returns a new card holding only the properties `keep` accepts,
    /// in their original order.
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Property) -> bool,
    {
        Self {
            properties: self
                .properties
                .iter()
                .filter(|p| keep(*p))
                .cloned()
                .collect(),
        }
    }

    /// Returns every property named `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first property named `name`.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Checks the format's structural rules. An empty result means valid.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate::validate(self)
    }
}
