//! Transport-neutral replies.
//!
//! Handlers build a [`Reply`]: either a plain message or an [`Embed`] card with a title,
//! accent color, optional thumbnail, named fields and an optional link button. A chat
//! gateway maps these onto its own rich message type; the console transport prints
//! [`Reply::to_plain_text`].

use std::fmt::Write;

/// Longest field value a card may carry, in characters.
pub const MAX_FIELD_VALUE: usize = 1024;

/// Placeholder for an empty field value.
pub const EMPTY_VALUE: &str = "—";

pub mod colors {
    pub const GIFT: u32 = 0x1e31bd;
    pub const PROFILE: u32 = 0x0f700b;
    pub const BUILDING: u32 = 0xff0000;
    pub const EVENTS: u32 = 0x5c15ad;
    pub const FISH: u32 = 0x2aa198;
    pub const SEASON: u32 = 0x859900;
    pub const SEASON_BUNDLE: u32 = 0x5f9ea0;
    pub const CROP: u32 = 0xb58900;
    pub const UPGRADE: u32 = 0xcb4b16;
    pub const BUNDLE: u32 = 0x34a853;
    pub const INCOMPLETE: u32 = 0xd2691e;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub thumbnail: Option<String>,
    pub fields: Vec<Field>,
    pub link: Option<Link>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            thumbnail: None,
            fields: Vec::new(),
            link: None,
        }
    }

    pub fn thumbnail(mut self, url: Option<&str>) -> Self {
        self.thumbnail = url.filter(|u| !u.trim().is_empty()).map(str::to_string);
        self
    }

    /// Add a field; the value is truncated to [`MAX_FIELD_VALUE`] and an empty value
    /// becomes [`EMPTY_VALUE`].
    pub fn field(mut self, name: impl Into<String>, value: impl AsRef<str>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: field_value(value.as_ref()),
            inline,
        });
        self
    }

    pub fn link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.link = Some(Link {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    pub fn field_value_of(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Embed(Embed),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(t) => Some(t),
            Reply::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Embed> {
        match self {
            Reply::Embed(e) => Some(e),
            Reply::Text(_) => None,
        }
    }

    /// Render for a plain-text transport: title, thumbnail, fields, then the link.
    pub fn to_plain_text(&self) -> String {
        match self {
            Reply::Text(t) => t.clone(),
            Reply::Embed(e) => {
                let mut out = String::new();
                let _ = writeln!(out, "== {} ==", e.title);
                if let Some(thumb) = &e.thumbnail {
                    let _ = writeln!(out, "[image] {}", thumb);
                }
                for field in &e.fields {
                    if field.value.contains('\n') {
                        let _ = writeln!(out, "{}:\n{}", field.name, field.value);
                    } else {
                        let _ = writeln!(out, "{}: {}", field.name, field.value);
                    }
                }
                if let Some(link) = &e.link {
                    let _ = writeln!(out, "{}: {}", link.label, link.url);
                }
                out.trim_end().to_string()
            }
        }
    }
}

impl From<Embed> for Reply {
    fn from(e: Embed) -> Self {
        Reply::Embed(e)
    }
}

/// Truncate to [`MAX_FIELD_VALUE`] characters; empty input becomes [`EMPTY_VALUE`].
pub fn field_value(value: &str) -> String {
    if value.trim().is_empty() {
        return EMPTY_VALUE.to_string();
    }
    match value.char_indices().nth(MAX_FIELD_VALUE) {
        Some((cut, _)) => value[..cut].to_string(),
        None => value.to_string(),
    }
}

/// `- a\n- b` list; empty input yields an empty string.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|i| format!("- {}", i.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
