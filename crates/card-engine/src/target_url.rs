//! Deterministic target URL construction from profile fields.
//!
//! The query string carries only non-empty fields, always in the canonical
//! [`Field::ALL`] order, so the same input produces byte-identical output.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

/// Profile page the QR code points at.
pub const DEFAULT_BASE_URL: &str =
    "https://abilash-nickal.github.io/QR-cod-generator/my_detail_moder_UI.html";

/// A known profile field. Declaration order is the canonical query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Message,
    ImageUrl,
    CopyData,
    TextKey,
    Link1,
    Link2,
    Link3,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Message,
        Field::ImageUrl,
        Field::CopyData,
        Field::TextKey,
        Field::Link1,
        Field::Link2,
        Field::Link3,
    ];

    /// Form field name.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Message => "message",
            Field::ImageUrl => "image_url",
            Field::CopyData => "copy_data",
            Field::TextKey => "text_key",
            Field::Link1 => "link1",
            Field::Link2 => "link2",
            Field::Link3 => "link3",
        }
    }

    /// Short query key read by the hosted profile page.
    pub fn compact_key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Message => "msg",
            Field::ImageUrl => "img",
            Field::CopyData => "copy",
            Field::TextKey => "key",
            Field::Link1 => "l1",
            Field::Link2 => "l2",
            Field::Link3 => "l3",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Which query parameter names to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// Query keys equal the form field names.
    #[default]
    Field,
    /// Short keys (`msg`, `img`, `l1`, ...).
    Compact,
}

impl KeyStyle {
    fn key_for(self, field: Field) -> &'static str {
        match self {
            KeyStyle::Field => field.key(),
            KeyStyle::Compact => field.compact_key(),
        }
    }
}

/// Ordered set of profile field values. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: BTreeMap<Field, String>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(form key, value)` pairs. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            if let Some(field) = Field::from_key(key.as_ref()) {
                set.set(field, value);
            }
        }
        set
    }

    /// Set a field. An empty value clears it.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    /// Value of a field, `""` when absent.
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

/// Final URL string encoded into the QR symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedTarget(String);

impl EncodedTarget {
    /// Wrap an already-built URL without re-encoding it.
    pub fn from_raw(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-decoded form for showing to a person.
    pub fn display(&self) -> String {
        let Some((base, query)) = self.0.split_once('?') else {
            return self.0.clone();
        };
        let pairs: Vec<String> = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{base}?{}", pairs.join("&"))
    }
}

impl fmt::Display for EncodedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds [`EncodedTarget`]s against a fixed base URL.
#[derive(Debug, Clone)]
pub struct TargetUrlBuilder {
    base: String,
    style: KeyStyle,
}

impl Default for TargetUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, KeyStyle::default())
    }
}

impl TargetUrlBuilder {
    pub fn new(base: impl Into<String>, style: KeyStyle) -> Self {
        Self {
            base: base.into(),
            style,
        }
    }

    pub fn encode(&self, fields: &FieldSet) -> EncodedTarget {
        if fields.is_empty() {
            return EncodedTarget(self.base.clone());
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (field, value) in fields.iter() {
            query.append_pair(self.style.key_for(field), value);
        }
        EncodedTarget(format!("{}?{}", self.base, query.finish()))
    }
}

/// Encode against [`DEFAULT_BASE_URL`] with field-name keys.
pub fn encode(fields: &FieldSet) -> EncodedTarget {
    TargetUrlBuilder::default().encode(fields)
}
