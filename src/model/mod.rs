//! # Label Composition Model
//!
//! Types for the three placeable entry kinds (text, icon, barcode), the
//! enumerated attribute sets they draw from, and the label/printer settings
//! records that travel alongside a composition.
//!
//! All types derive `Serialize + Deserialize` with the backend's camelCase
//! field names, so the same values are used in memory and on the wire.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entry`] | `TextEntry`, `IconEntry`, `BarcodeEntry` and field updates |
//! | [`settings`] | `LabelSettings`, `PrinterSettings` |

pub mod entry;
pub mod settings;

pub use entry::{BarcodeEntry, Entry, IconEntry, TextEntry};
pub use settings::{LabelSettings, PrinterSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::FieldError;

/// Identity of an entry within its collection.
///
/// The backend hands out numeric database ids; entries created during an
/// editing session get string keys. The JSON form is preserved either way.
///
/// Two ids are equal when they print the same, so `7` and `"7"` name the
/// same entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Numeric(u64),
    Key(String),
}

impl EntryId {
    /// Generate a fresh, collision-resistant key.
    pub fn generate() -> Self {
        EntryId::Key(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Numeric(n) => write!(f, "{}", n),
            EntryId::Key(k) => f.write_str(k),
        }
    }
}

impl PartialEq for EntryId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EntryId::Numeric(a), EntryId::Numeric(b)) => a == b,
            (EntryId::Key(a), EntryId::Key(b)) => a == b,
            (EntryId::Numeric(n), EntryId::Key(k)) | (EntryId::Key(k), EntryId::Numeric(n)) => {
                *k == n.to_string()
            }
        }
    }
}

impl Eq for EntryId {}

impl Hash for EntryId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            EntryId::Numeric(n) => n.to_string().hash(state),
            EntryId::Key(k) => k.hash(state),
        }
    }
}

impl From<u64> for EntryId {
    fn from(n: u64) -> Self {
        EntryId::Numeric(n)
    }
}

impl From<&str> for EntryId {
    /// Numeric strings become numeric ids, so ids typed on a command line
    /// match the ids the backend returned.
    fn from(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => EntryId::Numeric(n),
            Err(_) => EntryId::Key(s.to_string()),
        }
    }
}

/// The three placeable entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Text,
    Icon,
    Barcode,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] = [EntryKind::Text, EntryKind::Icon, EntryKind::Barcode];

    /// Human-readable label used in notices and logs.
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Text => "text",
            EntryKind::Icon => "icon",
            EntryKind::Barcode => "barcode",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Define a closed set of wire-named choices from a single list.
///
/// Each line maps a variant to the exact string the backend sends and
/// expects. Generates serde renames, `as_str`, `Display`, `FromStr` and
/// an `ALL` table for pickers.
macro_rules! define_choices {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Every choice, in picker order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The wire name of this choice.
            pub fn as_str(self) -> &'static str {
                match self { $($name::$variant => $wire,)+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(FieldError::InvalidChoice {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

define_choices! {
    /// Named font faces the backend can render.
    FontFamily, "fontFamily" {
        Arial => "Arial",
        ArialNarrow => "Arial Narrow",
        Verdana => "Verdana",
        TimesNewRoman => "Times New Roman",
        CourierNew => "Courier New",
        Tahoma => "Tahoma",
        Georgia => "Georgia",
        ComicSans => "Comic Sans MS",
        Impact => "Impact",
        LucidaConsole => "Lucida Console",
    }
}

define_choices! {
    /// Barcode symbologies.
    BarcodeFormat, "barcodeFormat" {
        Code128 => "CODE_128",
        Code39 => "CODE_39",
        QrCode => "QR_CODE",
    }
}

define_choices! {
    /// Placement of the human-readable text under a barcode.
    TextAlignment, "textAlignment" {
        None => "none",
        Center => "center",
        Left => "left",
        Right => "right",
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::Arial
    }
}

impl Default for BarcodeFormat {
    fn default() -> Self {
        BarcodeFormat::Code39
    }
}

impl Default for TextAlignment {
    fn default() -> Self {
        TextAlignment::None
    }
}
