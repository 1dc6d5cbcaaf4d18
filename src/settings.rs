use serde::Deserialize;

use crate::error::Error;
use crate::model::BLACK;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
}

impl PageSize {
    pub fn parse(val: &str) -> Result<PageSize, Error> {
        match val.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(Error::Geometry(format!("unknown page size {val:?}"))),
        }
    }

    /// (width, height) in millimeters, portrait.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 25.0,
            right: 25.0,
            bottom: 25.0,
            left: 25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl PageGeometry {
    pub fn new(size: PageSize, margins: &Margins) -> Result<PageGeometry, Error> {
        let (page_width, page_height) = size.dimensions();
        for (side, val) in [
            ("top", margins.top),
            ("right", margins.right),
            ("bottom", margins.bottom),
            ("left", margins.left),
        ] {
            if !val.is_finite() || val < 0.0 {
                return Err(Error::Geometry(format!("{side} margin {val} is not a valid length")));
            }
        }
        let geometry = PageGeometry {
            page_width,
            page_height,
            margin_top: margins.top,
            margin_right: margins.right,
            margin_bottom: margins.bottom,
            margin_left: margins.left,
        };
        if geometry.content_width() <= 0.0 {
            return Err(Error::Geometry(format!(
                "horizontal margins leave no content width on a {page_width}mm page"
            )));
        }
        if geometry.content_height() <= 0.0 {
            return Err(Error::Geometry(format!(
                "vertical margins leave no content height on a {page_height}mm page"
            )));
        }
        Ok(geometry)
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderConfig {
    pub enabled: bool,
    pub height: f32, // mm reserved below the header line
    pub content: String,
    pub show_logo: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        HeaderConfig {
            enabled: true,
            height: 15.0,
            content: "Proposal Penawaran".into(),
            show_logo: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterConfig {
    pub enabled: bool,
    pub height: f32,
    pub content: String,
    pub show_page_numbers: bool,
}

impl Default for FooterConfig {
    fn default() -> Self {
        FooterConfig {
            enabled: true,
            height: 10.0,
            content: "\u{a9} 2024 Your Company Name".into(),
            show_page_numbers: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub text: String,
    pub opacity: f32, // 0-100
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        WatermarkConfig {
            enabled: false,
            text: "CONFIDENTIAL".into(),
            opacity: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignSettings {
    pub theme: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub page_size: String,
    pub margins: Margins,
    pub header: HeaderConfig,
    pub footer: FooterConfig,
    pub watermark: WatermarkConfig,
}

impl Default for DesignSettings {
    fn default() -> Self {
        DesignSettings {
            theme: "professional".into(),
            primary_color: "#2563eb".into(),
            secondary_color: "#64748b".into(),
            font_family: "Inter".into(),
            font_size: 12.0,
            line_height: 1.5,
            page_size: "A4".into(),
            margins: Margins::default(),
            header: HeaderConfig::default(),
            footer: FooterConfig::default(),
            watermark: WatermarkConfig::default(),
        }
    }
}

impl DesignSettings {
    /// Page geometry for these settings. Also rejects a line height multiplier
    /// that would stall or reverse the vertical cursor.
    pub fn geometry(&self) -> Result<PageGeometry, Error> {
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(Error::Geometry(format!(
                "line height {} must be a positive number",
                self.line_height
            )));
        }
        PageGeometry::new(PageSize::parse(&self.page_size)?, &self.margins)
    }

    pub fn primary_rgb(&self) -> [u8; 3] {
        color_or_black(&self.primary_color)
    }

    pub fn secondary_rgb(&self) -> [u8; 3] {
        color_or_black(&self.secondary_color)
    }
}

fn color_or_black(val: &str) -> [u8; 3] {
    parse_hex_color(val).unwrap_or_else(|| {
        log::warn!("Unrecognised color {val:?}, using black");
        BLACK
    })
}

/// Accepts `#rrggbb`, `rrggbb` and the `#rgb` shorthand.
pub fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    let hex = val.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let d = digit.to_digit(16)? as u8;
                *slot = d * 16 + d;
            }
            Some(rgb)
        }
        _ => None,
    }
}
