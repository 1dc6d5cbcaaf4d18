use std::collections::BTreeMap;

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{self, FontVariant, PT_TO_MM};
use crate::model::{Alignment, TextStyle};
use crate::surface::{Canvas, DrawCall};

const PRODUCER: &str = concat!("proposal-pdf ", env!("CARGO_PKG_VERSION"));

pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

fn mm(v: f32) -> f32 {
    v / PT_TO_MM
}

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

/// Opacity in percent, the key for shared ExtGState objects.
fn opacity_key(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn check_finite(values: &[f32]) -> Result<(), Error> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::Encoding(format!("non-finite coordinate in {values:?}")))
    }
}

fn show_text(content: &mut Content, style: &TextStyle, x: f32, y: f32, text: &[u8]) {
    let (r, g, b) = rgb(style.color);
    content
        .set_fill_rgb(r, g, b)
        .begin_text()
        .set_font(Name(FontVariant::of(style).resource_name()), style.font_size)
        .next_line(x, y)
        .show(Str(text))
        .end_text();
}

fn write_call(content: &mut Content, call: &DrawCall, page_height: f32) -> Result<(), Error> {
    match call {
        DrawCall::Text {
            x,
            y,
            text,
            style,
            align,
        } => {
            check_finite(&[*x, *y, style.font_size])?;
            let width = fonts::style_width(text, style);
            let left = match align {
                Alignment::Left => *x,
                Alignment::Center => x - width / 2.0,
                Alignment::Right => x - width,
            };
            let bytes = fonts::to_winansi_bytes(text);
            show_text(content, style, mm(left), page_height - mm(*y), &bytes);
        }
        DrawCall::Rotated {
            x,
            y,
            angle,
            text,
            style,
            opacity,
        } => {
            check_finite(&[*x, *y, *angle, style.font_size])?;
            let width = mm(fonts::style_width(text, style));
            let (sin, cos) = angle.to_radians().sin_cos();
            let gs = format!("GS{}", opacity_key(*opacity));
            let bytes = fonts::to_winansi_bytes(text);
            content.save_state();
            content.set_parameters(Name(gs.as_bytes()));
            content.transform([cos, sin, -sin, cos, mm(*x), page_height - mm(*y)]);
            // Center the run on the origin, optically centered on the cap height.
            let rise = style.font_size * 0.35;
            show_text(content, style, -width / 2.0, -rise, &bytes);
            content.restore_state();
        }
        DrawCall::Rule {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            check_finite(&[*x1, *y1, *x2, *y2, *width])?;
            let (r, g, b) = rgb(*color);
            content
                .save_state()
                .set_stroke_rgb(r, g, b)
                .set_line_width(mm(*width))
                .move_to(mm(*x1), page_height - mm(*y1))
                .line_to(mm(*x2), page_height - mm(*y2))
                .stroke()
                .restore_state();
        }
    }
    Ok(())
}

pub fn render(canvas: &Canvas, info: &DocumentInfo) -> Result<Vec<u8>, Error> {
    let pages = canvas.pages();
    if pages.is_empty() {
        return Err(Error::Encoding("document has no pages".into()));
    }
    let page_count = i32::try_from(pages.len())
        .map_err(|_| Error::Encoding(format!("too many pages: {}", pages.len())))?;

    let mut pdf = Pdf::new();
    let mut next_id = 1;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let font_refs: Vec<(FontVariant, Ref)> =
        FontVariant::ALL.iter().map(|v| (*v, alloc())).collect();

    let mut opacities: BTreeMap<u8, Ref> = BTreeMap::new();
    for call in canvas.calls() {
        if let DrawCall::Rotated { opacity, .. } = call {
            opacities.entry(opacity_key(*opacity)).or_insert_with(&mut alloc);
        }
    }

    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_count);

    let g = &canvas.geometry;
    let page_width = mm(g.page_width);
    let page_height = mm(g.page_height);
    let gs_names: Vec<(String, Ref)> = opacities
        .iter()
        .map(|(key, r)| (format!("GS{key}"), *r))
        .collect();

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let mut content = Content::new();
        for call in &page.calls {
            write_call(&mut content, call, page_height)?;
        }
        pdf.stream(*content_id, &content.finish());

        let mut page_writer = pdf.page(*page_id);
        page_writer
            .media_box(Rect::new(0.0, 0.0, page_width, page_height))
            .parent(pages_id)
            .contents(*content_id);
        let mut resources = page_writer.resources();
        resources
            .fonts()
            .pairs(font_refs.iter().map(|(v, r)| (Name(v.resource_name()), *r)));
        if !gs_names.is_empty() {
            resources
                .ext_g_states()
                .pairs(gs_names.iter().map(|(name, r)| (Name(name.as_bytes()), *r)));
        }
    }

    for (variant, font_ref) in &font_refs {
        pdf.type1_font(*font_ref)
            .base_font(Name(variant.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }
    for (key, gs_ref) in &opacities {
        pdf.ext_graphics(*gs_ref)
            .non_stroking_alpha(*key as f32 / 100.0)
            .stroking_alpha(*key as f32 / 100.0);
    }

    pdf.document_info(info_id)
        .title(TextStr(&info.title))
        .author(TextStr(&info.author))
        .producer(TextStr(PRODUCER));

    log::debug!("Serialized {} page(s)", pages.len());
    Ok(pdf.finish())
}
