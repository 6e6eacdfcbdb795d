//! Label and printer settings records.
//!
//! Both are persisted independently of the entry collections and are
//! never derived from entries.

use serde::{Deserialize, Serialize};

/// Physical label dimensions and rendering resolution.
///
/// Exactly one instance is active per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Backend row id; absent when the backend has no stored settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<super::EntryId>,
    /// Label width in millimeters.
    pub width: f64,
    /// Label height in millimeters.
    pub height: f64,
    /// Rendering resolution in dots per inch.
    pub dpi: u32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            id: None,
            width: 100.0,
            height: 100.0,
            dpi: 300,
        }
    }
}

impl LabelSettings {
    /// Dots per millimeter at this resolution.
    #[inline]
    pub fn dots_per_mm(&self) -> f64 {
        self.dpi as f64 / 25.4
    }

    /// Label size in dots, rounded to the nearest dot.
    pub fn size_dots(&self) -> (u32, u32) {
        let dpmm = self.dots_per_mm();
        (
            (self.width * dpmm).round() as u32,
            (self.height * dpmm).round() as u32,
        )
    }
}

/// Printer driver settings held by the backend.
///
/// The backend has two label stocks (a small "bluetooth" label and a
/// larger carton label) and prints both on every print request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterSettings {
    pub bluetooth_printer_name: String,
    pub carton_printer_name: String,
    pub bluetooth_label_width: f64,
    pub bluetooth_label_height: f64,
    pub carton_label_width: f64,
    pub carton_label_height: f64,
    pub dpi: u32,
    pub orientation: String,
    pub density: u32,
    pub speed: u32,
    pub gap_height: f64,
    pub gap_offset: f64,
    pub tear_off: bool,
    pub left_shift: f64,
    pub right_shift: f64,
    pub is_app_development_mode: bool,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            bluetooth_printer_name: "TSC TE310-btpincode".to_string(),
            carton_printer_name: "TSC TE310-packaging".to_string(),
            bluetooth_label_width: 100.0,
            bluetooth_label_height: 29.0,
            carton_label_width: 100.0,
            carton_label_height: 67.0,
            dpi: 300,
            orientation: "portrait".to_string(),
            density: 12,
            speed: 4,
            gap_height: 3.048,
            gap_offset: 0.0,
            tear_off: true,
            left_shift: 2.032,
            right_shift: 2.032,
            is_app_development_mode: false,
        }
    }
}
