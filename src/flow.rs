use std::convert::Infallible;

use crate::error::MeasureError;
use crate::fonts::{self, PT_TO_MM};
use crate::model::{Alignment, TextInstruction, TextStyle};
use crate::settings::{DesignSettings, FooterConfig, HeaderConfig, PageGeometry, WatermarkConfig};
use crate::surface::{DrawCall, Surface};

/// Line pitch per point of font size at a 1.0 multiplier: 12pt at 1.5 gives 6mm.
pub const LINE_PITCH_MM_PER_PT: f32 = 1.0 / 3.0;
pub const DEFAULT_LINE_SPACING: f32 = 1.5;

const WATERMARK_GRAY: [u8; 3] = [200, 200, 200];
const WATERMARK_SIZE: f32 = 48.0;
const WATERMARK_ANGLE: f32 = 45.0;
const HEADER_SIZE: f32 = 16.0;
const FOOTER_SIZE: f32 = 10.0;

/// Page geometry plus the overlays repeated on every page.
pub struct PageFrame<'a> {
    pub geometry: PageGeometry,
    header: Option<&'a HeaderConfig>,
    footer: Option<&'a FooterConfig>,
    watermark: Option<&'a WatermarkConfig>,
    primary: [u8; 3],
    secondary: [u8; 3],
}

impl<'a> PageFrame<'a> {
    pub fn new(geometry: PageGeometry, settings: &'a DesignSettings) -> Self {
        PageFrame {
            geometry,
            header: Some(&settings.header).filter(|h| h.enabled),
            footer: Some(&settings.footer).filter(|f| f.enabled),
            watermark: Some(&settings.watermark).filter(|w| w.enabled),
            primary: settings.primary_rgb(),
            secondary: settings.secondary_rgb(),
        }
    }

    /// A frame with margins only.
    pub fn bare(geometry: PageGeometry) -> Self {
        PageFrame {
            geometry,
            header: None,
            footer: None,
            watermark: None,
            primary: [0, 0, 0],
            secondary: [0, 0, 0],
        }
    }

    pub fn content_top(&self) -> f32 {
        self.geometry.margin_top + self.header.map_or(0.0, |h| h.height.max(0.0))
    }

    pub fn content_bottom(&self) -> f32 {
        let g = &self.geometry;
        g.page_height - g.margin_bottom - self.footer.map_or(0.0, |f| f.height.max(0.0))
    }

    /// Draws the overlays that sit beneath the body and returns the first body `y`.
    pub fn open_page<S: Surface + ?Sized>(&self, surface: &mut S) -> f32 {
        let g = &self.geometry;
        if let Some(header) = self.header
            && !header.content.trim().is_empty()
        {
            surface.draw(DrawCall::Text {
                x: g.page_width / 2.0,
                y: g.margin_top,
                text: header.content.clone(),
                style: TextStyle::plain(HEADER_SIZE).bold().colored(self.primary),
                align: Alignment::Center,
            });
        }
        if let Some(watermark) = self.watermark
            && !watermark.text.trim().is_empty()
        {
            surface.draw(DrawCall::Rotated {
                x: g.page_width / 2.0,
                y: g.page_height / 2.0,
                angle: WATERMARK_ANGLE,
                text: watermark.text.clone(),
                style: TextStyle::plain(WATERMARK_SIZE).colored(WATERMARK_GRAY),
                opacity: watermark.opacity.clamp(0.0, 100.0) / 100.0,
            });
        }
        self.content_top()
    }

    pub fn close_page<S: Surface + ?Sized>(&self, surface: &mut S) {
        let Some(footer) = self.footer else {
            return;
        };
        let g = &self.geometry;
        let style = TextStyle::plain(FOOTER_SIZE).colored(self.secondary);
        let mut y = g.page_height - g.margin_bottom;
        if footer.show_page_numbers {
            let number = surface.page_number();
            surface.draw(DrawCall::Text {
                x: g.page_width - g.margin_right,
                y,
                text: format!("Halaman {number}"),
                style,
                align: Alignment::Right,
            });
            y -= 6.0;
        }
        if !footer.content.trim().is_empty() {
            surface.draw(DrawCall::Text {
                x: g.page_width / 2.0,
                y,
                text: footer.content.clone(),
                style,
                align: Alignment::Center,
            });
        }
    }

    pub fn break_page<S: Surface + ?Sized>(&self, surface: &mut S) -> f32 {
        self.close_page(surface);
        surface.new_page();
        log::debug!("Started page {}", surface.page_number());
        self.open_page(surface)
    }

    /// Returns the `y` at which something `height` tall can be placed, starting
    /// a new page when it would cross the bottom limit. Content taller than a
    /// whole page is placed at the top and allowed to overflow.
    pub fn ensure_room<S: Surface + ?Sized>(&self, surface: &mut S, y: f32, height: f32) -> f32 {
        if y + height > self.content_bottom() && y > self.content_top() {
            self.break_page(surface)
        } else {
            y
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
    pub style: TextStyle,
    pub width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub segments: Vec<Segment>,
    pub width: f32,
}

impl Line {
    fn push_word(&mut self, word: &str, style: &TextStyle, space: Option<f32>, width: f32) {
        let added = space.unwrap_or(0.0) + width;
        match self.segments.last_mut() {
            Some(last) if last.style == *style => {
                if space.is_some() {
                    last.text.push(' ');
                }
                last.text.push_str(word);
                last.width += added;
            }
            _ => {
                let text = match space {
                    Some(_) => format!(" {word}"),
                    None => word.to_string(),
                };
                self.segments.push(Segment {
                    text,
                    style: *style,
                    width: added,
                });
            }
        }
        self.width += added;
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Greedy word wrap over styled pieces laid end to end. `\n` forces a break;
/// a single word wider than `max_width` gets a line of its own and overflows.
pub fn wrap<E>(
    pieces: &[(&str, TextStyle)],
    max_width: f32,
    mut measure: impl FnMut(&str, &TextStyle) -> Result<f32, E>,
) -> Result<Vec<Line>, E> {
    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut carry_space = false;

    for (text, style) in pieces {
        for (idx, hard_line) in text.split('\n').enumerate() {
            if idx > 0 {
                lines.push(std::mem::take(&mut line));
                carry_space = false;
            }
            let mut space_before = carry_space || hard_line.starts_with(char::is_whitespace);
            for word in hard_line.split_whitespace() {
                let word_width = measure(word, style)?;
                let space = if space_before && !line.is_empty() {
                    Some(measure(" ", style)?)
                } else {
                    None
                };
                if !line.is_empty() && line.width + space.unwrap_or(0.0) + word_width > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push_word(word, style, None, word_width);
                } else {
                    line.push_word(word, style, space, word_width);
                }
                space_before = true;
            }
            carry_space = hard_line.ends_with(char::is_whitespace)
                || (carry_space && hard_line.trim().is_empty());
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Wraps plain text with the built-in Helvetica metrics; never fails.
pub fn wrap_plain(text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    let Ok(lines) = wrap::<Infallible>(&[(text, *style)], max_width, |t, s| {
        Ok(fonts::style_width(t, s))
    });
    lines.iter().map(Line::text).collect()
}

/// Wrapped lines of one instruction plus the vertical space that follows them.
struct Flowed {
    lines: Vec<Line>,
    after: f32,
}

/// Lays instructions out top to bottom on a surface, breaking pages as needed.
pub struct PageFlowRenderer<'a> {
    frame: &'a PageFrame<'a>,
    base: TextStyle,
    line_spacing: f32,
}

impl<'a> PageFlowRenderer<'a> {
    /// A spacing that is not a positive number falls back to
    /// [`DEFAULT_LINE_SPACING`] so the cursor always moves down.
    pub fn new(frame: &'a PageFrame<'a>, base: TextStyle, line_spacing: f32) -> Self {
        let line_spacing = if line_spacing.is_finite() && line_spacing > 0.0 {
            line_spacing
        } else {
            log::warn!("Line spacing {line_spacing} is unusable, using {DEFAULT_LINE_SPACING}");
            DEFAULT_LINE_SPACING
        };
        PageFlowRenderer {
            frame,
            base,
            line_spacing,
        }
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_spacing * LINE_PITCH_MM_PER_PT
    }

    /// Renders `instructions` starting at `start_y` and returns the `y` below the
    /// last line. Consecutive runs share lines; every other instruction starts
    /// on a fresh line with its own style, replacing whatever came before.
    ///
    /// All text is measured before anything is drawn, so a measurement error
    /// leaves the surface untouched.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        instructions: &[TextInstruction],
        start_y: f32,
    ) -> Result<f32, MeasureError> {
        let flowed = self.layout(&*surface, instructions)?;
        Ok(self.paint(surface, flowed, start_y))
    }

    fn layout<S: Surface + ?Sized>(
        &self,
        surface: &S,
        instructions: &[TextInstruction],
    ) -> Result<Vec<Flowed>, MeasureError> {
        let width = self.frame.geometry.content_width();
        let measure = |text: &str, style: &TextStyle| surface.measure(text, style);
        let mut flowed = Vec::with_capacity(instructions.len());
        let mut idx = 0;
        while idx < instructions.len() {
            let item = match &instructions[idx] {
                TextInstruction::Run { .. } => {
                    let pieces: Vec<(&str, TextStyle)> = instructions[idx..]
                        .iter()
                        .map_while(|ins| match ins {
                            TextInstruction::Run { text, style } => Some((text.as_str(), *style)),
                            _ => None,
                        })
                        .collect();
                    idx += pieces.len();
                    flowed.push(Flowed {
                        lines: wrap(&pieces, width, measure)?,
                        after: 0.0,
                    });
                    continue;
                }
                TextInstruction::Block { text, .. } if text.is_empty() => Flowed {
                    lines: Vec::new(),
                    after: self.line_height(self.base.font_size),
                },
                TextInstruction::Block { text, style } => Flowed {
                    lines: wrap(&[(text.as_str(), *style)], width, measure)?,
                    after: self.line_height(style.font_size) * 0.5,
                },
                TextInstruction::LineBreak => Flowed {
                    lines: Vec::new(),
                    after: self.line_height(self.base.font_size),
                },
                TextInstruction::ListItem { text, style, marker } => {
                    let full = format!("{marker}{text}");
                    Flowed {
                        lines: wrap(&[(full.as_str(), *style)], width, measure)?,
                        after: 0.0,
                    }
                }
            };
            flowed.push(item);
            idx += 1;
        }
        Ok(flowed)
    }

    fn paint<S: Surface + ?Sized>(&self, surface: &mut S, flowed: Vec<Flowed>, start_y: f32) -> f32 {
        let left = self.frame.geometry.margin_left;
        let mut y = start_y;
        for Flowed { lines, after } in flowed {
            for line in lines {
                let height = line
                    .segments
                    .iter()
                    .map(|s| self.line_height(s.style.font_size))
                    .reduce(f32::max)
                    .unwrap_or_else(|| self.line_height(self.base.font_size));
                y = self.frame.ensure_room(surface, y, height);
                let mut x = left;
                for Segment { text, style, width } in line.segments {
                    if style.underline {
                        let drop = style.font_size * PT_TO_MM * 0.15;
                        surface.draw(DrawCall::Rule {
                            x1: x,
                            y1: y + drop,
                            x2: x + width,
                            y2: y + drop,
                            width: style.font_size * PT_TO_MM * 0.06,
                            color: style.color,
                        });
                    }
                    surface.draw(DrawCall::Text {
                        x,
                        y,
                        text,
                        style,
                        align: Alignment::Left,
                    });
                    x += width;
                }
                y += height;
            }
            y += after;
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_width(text: &str, _: &TextStyle) -> Result<f32, Infallible> {
        Ok(text.chars().count() as f32)
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn wraps_greedily_on_word_boundaries() {
        let style = TextStyle::plain(12.0);
        let Ok(lines) = wrap(&[("aaa bbb ccc dd", style)], 7.0, fixed_width);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc dd"]);
    }

    #[test]
    fn long_word_overflows_on_its_own_line() {
        let style = TextStyle::plain(12.0);
        let Ok(lines) = wrap(&[("a verylongword b", style)], 5.0, fixed_width);
        assert_eq!(texts(&lines), vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn pieces_keep_their_own_styles_on_a_shared_line() {
        let plain = TextStyle::plain(12.0);
        let bold = plain.bold();
        let Ok(lines) = wrap(&[("Hello ", plain), ("world", bold)], 100.0, fixed_width);
        assert_eq!(lines.len(), 1);
        let segs = &lines[0].segments;
        assert_eq!(segs[0].text, "Hello");
        assert_eq!(segs[1].text, " world");
        assert!(segs[1].style.bold);
        assert_eq!(lines[0].width, 11.0);
    }

    #[test]
    fn hard_breaks_split_lines() {
        let style = TextStyle::plain(12.0);
        let Ok(lines) = wrap(&[("one\n\ntwo", style)], 100.0, fixed_width);
        assert_eq!(texts(&lines), vec!["one", "", "two"]);
    }

    #[test]
    fn plain_wrap_respects_width() {
        let style = TextStyle::plain(12.0);
        let text = "Jl. Jenderal Sudirman Kav. 52-53, Senayan, Kebayoran Baru, Jakarta Selatan 12190";
        let lines = wrap_plain(text, &style, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(fonts::style_width(line, &style) <= 60.0 + 1e-3);
        }
    }
}
