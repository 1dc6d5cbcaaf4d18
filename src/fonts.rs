use crate::model::TextStyle;

pub const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub const ALL: [FontVariant; 4] = [
        FontVariant::Regular,
        FontVariant::Bold,
        FontVariant::Italic,
        FontVariant::BoldItalic,
    ];

    pub fn of(style: &TextStyle) -> Self {
        match (style.bold, style.italic) {
            (true, true) => FontVariant::BoldItalic,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (false, false) => FontVariant::Regular,
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static [u8] {
        match self {
            FontVariant::Regular => b"F1",
            FontVariant::Bold => b"F2",
            FontVariant::Italic => b"F3",
            FontVariant::BoldItalic => b"F4",
        }
    }

    pub fn base_font(self) -> &'static [u8] {
        match self {
            FontVariant::Regular => b"Helvetica",
            FontVariant::Bold => b"Helvetica-Bold",
            FontVariant::Italic => b"Helvetica-Oblique",
            FontVariant::BoldItalic => b"Helvetica-BoldOblique",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontVariant::Bold | FontVariant::BoldItalic)
    }
}

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of one WinAnsi byte in 1000 units/em.
fn glyph_width(variant: FontVariant, byte: u8) -> u16 {
    let bold = variant.is_bold();
    match byte {
        32..=126 => {
            let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
            table[(byte - 32) as usize]
        }
        0x95 => 350,                                // bullet
        0x91 | 0x92 => if bold { 278 } else { 222 }, // single quotes
        0x93 | 0x94 => if bold { 500 } else { 333 }, // double quotes
        0x85 | 0x89 | 0x97 => 1000,                 // ellipsis, per mille, em dash
        0x96 => 556,                                // en dash
        0xA0 => 278,                                // no-break space
        0xA9 | 0xAE => 737,                         // copyright, registered
        _ => 556,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the encoding become `?`.
pub fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c as u32 {
            0x0000..=0x007F => c as u8,
            0x00A0..=0x00FF => c as u8, // Latin-1 supplement maps directly
            0x20AC => 0x80,
            0x201A => 0x82,
            0x0192 => 0x83,
            0x201E => 0x84,
            0x2026 => 0x85,
            0x2020 => 0x86,
            0x2021 => 0x87,
            0x02C6 => 0x88,
            0x2030 => 0x89,
            0x0160 => 0x8A,
            0x2039 => 0x8B,
            0x0152 => 0x8C,
            0x017D => 0x8E,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2022 => 0x95, // bullet
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x02DC => 0x98,
            0x2122 => 0x99,
            0x0161 => 0x9A,
            0x203A => 0x9B,
            0x0153 => 0x9C,
            0x017E => 0x9E,
            0x0178 => 0x9F,
            _ => b'?',
        })
        .collect()
}

/// Advance width of `text` in millimeters.
pub fn text_width(text: &str, variant: FontVariant, font_size: f32) -> f32 {
    let units: u32 = to_winansi_bytes(text)
        .into_iter()
        .map(|b| glyph_width(variant, b) as u32)
        .sum();
    units as f32 / 1000.0 * font_size * PT_TO_MM
}

pub fn style_width(text: &str, style: &TextStyle) -> f32 {
    text_width(text, FontVariant::of(style), style.font_size)
}
