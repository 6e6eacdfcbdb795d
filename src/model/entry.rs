//! Entry types and their field constraints.
//!
//! Every entry kind implements [`Entry`], which gives the store one seam
//! for construction defaults, identity and string-keyed field updates.
//! Constraints are enforced here, at the point of update; nothing else
//! re-validates a stored entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{BarcodeFormat, EntryId, EntryKind, FontFamily, TextAlignment};
use crate::error::FieldError;

/// Smallest and largest font size accepted for text and barcode captions.
pub const FONT_SIZE_RANGE: (i64, i64) = (1, 72);

/// Minimum width/height of icon and barcode boxes.
pub const MIN_BOX_SIZE: i64 = 10;

/// Behavior shared by all placeable entries.
///
/// Adding a new entry kind: define the struct, implement this trait and
/// give it a collection in [`crate::store::CompositionStore`].
pub trait Entry: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Which collection this entry lives in.
    const KIND: EntryKind;

    fn id(&self) -> &EntryId;

    /// Fully populated starter value with the given id.
    ///
    /// Distinct from `Default`: these carry placeholder content so a new
    /// entry is visible on the label straight away.
    fn with_defaults(id: EntryId) -> Self;

    /// Apply a raw field value by its wire name.
    ///
    /// Numeric fields coerce and clamp, never fail. Enumerated fields
    /// reject unknown values and leave the entry unchanged.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError>;

    /// Pull every constrained field back into range.
    ///
    /// Used on entries that arrive from outside (backend loads, layout
    /// files) so the store never holds out-of-range values.
    fn normalize(&mut self);
}

/// Leading integer of `value`, the way a form field reads a number:
/// optional sign followed by digits, anything after is ignored.
pub fn coerce_int(value: &str) -> Option<i64> {
    let s = value.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs instead of failing the parse.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn clamp_coord(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

fn clamp_font(n: i64) -> u8 {
    n.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1) as u8
}

fn clamp_box(n: i64) -> u32 {
    n.clamp(MIN_BOX_SIZE, u32::MAX as i64) as u32
}

fn clamp_sequence(n: i64) -> u32 {
    n.clamp(1, u32::MAX as i64) as u32
}

/// Coordinates fall back to 0, matching how the backend's form reads an
/// empty or non-numeric position.
fn coord(value: &str) -> u32 {
    clamp_coord(coerce_int(value).unwrap_or(0))
}

fn font_size(value: &str, fallback: i64) -> u8 {
    clamp_font(coerce_int(value).unwrap_or(fallback))
}

fn box_size(value: &str) -> u32 {
    clamp_box(coerce_int(value).unwrap_or(MIN_BOX_SIZE))
}

// ============================================================================
// WIRE NUMBERS
// ============================================================================

/// A number as the backend may store it: integer, float or numeric text.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Read a numeric field of any width or sign; range is applied by the caller.
fn wire_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<WireNumber>::deserialize(deserializer)? {
        Some(WireNumber::Int(n)) => Some(n),
        // `as` saturates and maps NaN to 0.
        Some(WireNumber::Float(f)) => Some(f as i64),
        Some(WireNumber::Text(s)) => coerce_int(&s),
        None => None,
    })
}

fn wire_coord<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(clamp_coord(wire_int(d)?.unwrap_or(0)))
}

fn wire_box<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(clamp_box(wire_int(d)?.unwrap_or(MIN_BOX_SIZE)))
}

fn wire_font_size<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    Ok(clamp_font(wire_int(d)?.unwrap_or(TextEntry::FONT_SIZE_FALLBACK)))
}

fn wire_caption_size<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    Ok(clamp_font(
        wire_int(d)?.unwrap_or(BarcodeEntry::TEXT_FONT_SIZE_FALLBACK),
    ))
}

fn wire_sequence<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(clamp_sequence(wire_int(d)?.unwrap_or(1)))
}

/// Accept `null` for string payloads; the backend stores empty columns as NULL.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// TEXT
// ============================================================================

/// A line of text placed on the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub id: EntryId,
    #[serde(default, deserialize_with = "string_or_null")]
    pub text: String,
    #[serde(deserialize_with = "wire_coord")]
    pub x: u32,
    #[serde(deserialize_with = "wire_coord")]
    pub y: u32,
    #[serde(deserialize_with = "wire_font_size")]
    pub font_size: u8,
    #[serde(default)]
    pub font_family: FontFamily,
}

impl TextEntry {
    /// Fallback when a font size cannot be read from the input.
    pub const FONT_SIZE_FALLBACK: i64 = 8;
}

impl Entry for TextEntry {
    const KIND: EntryKind = EntryKind::Text;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn with_defaults(id: EntryId) -> Self {
        Self {
            id,
            text: "Yeni Metin".to_string(),
            x: 10,
            y: 10,
            font_size: 12,
            font_family: FontFamily::Arial,
        }
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "text" => self.text = value.to_string(),
            "x" => self.x = coord(value),
            "y" => self.y = coord(value),
            "fontSize" => self.font_size = font_size(value, Self::FONT_SIZE_FALLBACK),
            "fontFamily" => self.font_family = value.parse()?,
            other => return Err(FieldError::unknown(Self::KIND, other)),
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.font_size = clamp_font(self.font_size.into());
    }
}

// ============================================================================
// ICON
// ============================================================================

/// An embedded image placed on the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconEntry {
    pub id: EntryId,
    #[serde(deserialize_with = "wire_coord")]
    pub x: u32,
    #[serde(deserialize_with = "wire_coord")]
    pub y: u32,
    #[serde(deserialize_with = "wire_box")]
    pub width: u32,
    #[serde(deserialize_with = "wire_box")]
    pub height: u32,
    /// Base64 image payload; empty until an image is ingested.
    #[serde(default, deserialize_with = "string_or_null")]
    pub base64_string: String,
}

impl IconEntry {
    pub fn has_image(&self) -> bool {
        !self.base64_string.is_empty()
    }
}

impl Entry for IconEntry {
    const KIND: EntryKind = EntryKind::Icon;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn with_defaults(id: EntryId) -> Self {
        Self {
            id,
            x: 50,
            y: 50,
            width: 50,
            height: 50,
            base64_string: String::new(),
        }
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "x" => self.x = coord(value),
            "y" => self.y = coord(value),
            "width" => self.width = box_size(value),
            "height" => self.height = box_size(value),
            "base64String" => self.base64_string = value.to_string(),
            other => return Err(FieldError::unknown(Self::KIND, other)),
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.width = clamp_box(self.width.into());
        self.height = clamp_box(self.height.into());
    }
}

// ============================================================================
// BARCODE
// ============================================================================

/// A barcode symbol with an optional human-readable caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeEntry {
    pub id: EntryId,
    #[serde(deserialize_with = "wire_coord")]
    pub x: u32,
    #[serde(deserialize_with = "wire_coord")]
    pub y: u32,
    #[serde(deserialize_with = "wire_box")]
    pub width: u32,
    #[serde(deserialize_with = "wire_box")]
    pub height: u32,
    #[serde(default, deserialize_with = "string_or_null")]
    pub barcode_data: String,
    /// Print/display order among barcode entries (1-based).
    #[serde(default = "default_sequence", deserialize_with = "wire_sequence")]
    pub barcode_sequence: u32,
    #[serde(default)]
    pub barcode_format: BarcodeFormat,
    #[serde(default)]
    pub text_alignment: TextAlignment,
    #[serde(default = "default_caption_size", deserialize_with = "wire_caption_size")]
    pub text_font_size: u8,
    #[serde(default)]
    pub text_font_family: FontFamily,
}

fn default_sequence() -> u32 {
    1
}

fn default_caption_size() -> u8 {
    BarcodeEntry::TEXT_FONT_SIZE_FALLBACK as u8
}

impl BarcodeEntry {
    pub const TEXT_FONT_SIZE_FALLBACK: i64 = 3;
}

impl Entry for BarcodeEntry {
    const KIND: EntryKind = EntryKind::Barcode;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn with_defaults(id: EntryId) -> Self {
        Self {
            id,
            x: 50,
            y: 50,
            width: 50,
            height: 50,
            barcode_data: "1598524566".to_string(),
            barcode_sequence: 1,
            barcode_format: BarcodeFormat::Code39,
            text_alignment: TextAlignment::Left,
            text_font_size: 3,
            text_font_family: FontFamily::Arial,
        }
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        match field {
            "x" => self.x = coord(value),
            "y" => self.y = coord(value),
            "width" => self.width = box_size(value),
            "height" => self.height = box_size(value),
            "barcodeData" => self.barcode_data = value.to_string(),
            "barcodeSequence" => {
                self.barcode_sequence = clamp_sequence(coerce_int(value).unwrap_or(1))
            }
            "barcodeFormat" => self.barcode_format = value.parse()?,
            "textAlignment" => self.text_alignment = value.parse()?,
            "textFontSize" => {
                self.text_font_size = font_size(value, Self::TEXT_FONT_SIZE_FALLBACK)
            }
            "textFontFamily" => self.text_font_family = value.parse()?,
            other => return Err(FieldError::unknown(Self::KIND, other)),
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.width = clamp_box(self.width.into());
        self.height = clamp_box(self.height.into());
        self.barcode_sequence = clamp_sequence(self.barcode_sequence.into());
        self.text_font_size = clamp_font(self.text_font_size.into());
    }
}
