use crate::error::MeasureError;
use crate::fonts;
use crate::model::{Alignment, TextStyle};
use crate::settings::PageGeometry;

/// One drawing operation. Coordinates are millimeters from the top-left corner
/// of the page; text `y` is the baseline.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
        align: Alignment,
    },
    /// Text centered on `(x, y)` and rotated counter-clockwise by `angle` degrees.
    Rotated {
        x: f32,
        y: f32,
        angle: f32,
        text: String,
        style: TextStyle,
        opacity: f32,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [u8; 3],
    },
}

impl DrawCall {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCall::Text { text, .. } | DrawCall::Rotated { text, .. } => Some(text),
            DrawCall::Rule { .. } => None,
        }
    }
}

pub trait Surface {
    /// Advance width of `text` in millimeters.
    fn measure(&self, text: &str, style: &TextStyle) -> Result<f32, MeasureError>;
    fn draw(&mut self, call: DrawCall);
    fn new_page(&mut self);
    /// 1-based number of the page currently being drawn.
    fn page_number(&self) -> usize;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub calls: Vec<DrawCall>,
}

/// Records draw calls page by page; the PDF writer serializes it afterwards.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub geometry: PageGeometry,
    pages: Vec<Page>,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Canvas {
            geometry,
            pages: vec![Page::default()],
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.pages.iter().flat_map(|p| p.calls.iter())
    }

    /// All drawn strings in order, across pages.
    pub fn texts(&self) -> Vec<&str> {
        self.calls().filter_map(DrawCall::text).collect()
    }
}

impl Surface for Canvas {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<f32, MeasureError> {
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(MeasureError::InvalidFontSize(style.font_size));
        }
        Ok(fonts::style_width(text, style))
    }

    fn draw(&mut self, call: DrawCall) {
        if let Some(page) = self.pages.last_mut() {
            page.calls.push(call);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn page_number(&self) -> usize {
        self.pages.len()
    }
}
