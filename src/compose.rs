use crate::error::Error;
use crate::flow::{PageFlowRenderer, PageFrame, wrap_plain};
use crate::grid::{GridRow, ProductGrid, row_height};
use crate::html;
use crate::model::{Alignment, ProposalContent, Product, RichTextSections, TextStyle};
use crate::pdf::{self, DocumentInfo};
use crate::settings::DesignSettings;
use crate::surface::{Canvas, DrawCall, Surface};

pub const COMPANY_PROFILE_TITLE: &str = "PROFIL PERUSAHAAN";
pub const SERVICE_BENEFITS_TITLE: &str = "KEUNTUNGAN LAYANAN KAMI";
pub const PRODUCTS_TITLE: &str = "RINCIAN LAYANAN";
pub const TERMS_TITLE: &str = "SYARAT DAN KETENTUAN";

const DEFAULT_FONT_SIZE: f32 = 12.0;
const SECTION_TITLE_SIZE: f32 = 14.0;
const TITLE_SIZE: f32 = 18.0;
const GRID_SIZE: f32 = 10.0;
const ADDRESS_WIDTH: f32 = 150.0;
const CELL_PADDING: f32 = 2.0;

/// Composes the proposal and serializes it to PDF bytes.
pub fn compose(
    content: &ProposalContent,
    sections: &RichTextSections,
    products: &[Product],
    settings: &DesignSettings,
) -> Result<Vec<u8>, Error> {
    let geometry = settings.geometry()?;
    let mut canvas = Canvas::new(geometry);
    compose_onto(&mut canvas, content, sections, products, settings)?;

    let title = content.kind.title();
    let company = content.recipient.company.trim();
    let info = DocumentInfo {
        title: if company.is_empty() {
            title.to_string()
        } else {
            format!("{title} - {company}")
        },
        author: content.creator.name.clone(),
    };
    pdf::render(&canvas, &info)
}

/// Draws the whole proposal onto `surface`, page by page.
///
/// Only page setup can fail. A rich-text section that cannot be laid out is
/// replaced by its raw text and the rest of the document carries on.
pub fn compose_onto<S: Surface + ?Sized>(
    surface: &mut S,
    content: &ProposalContent,
    sections: &RichTextSections,
    products: &[Product],
    settings: &DesignSettings,
) -> Result<(), Error> {
    let geometry = settings.geometry()?;
    let frame = PageFrame::new(geometry, settings);
    let y = frame.open_page(surface);
    let mut composer = Composer {
        surface,
        frame: &frame,
        settings,
        base: TextStyle::plain(settings.font_size),
        primary: settings.primary_rgb(),
        y,
    };

    composer.rich_section(COMPANY_PROFILE_TITLE, sections.company_profile.as_deref());
    composer.title_block(content);
    composer.recipient_block(content);
    composer.opening(content);
    composer.rich_section(SERVICE_BENEFITS_TITLE, sections.service_benefits.as_deref());
    composer.product_grid(products);
    composer.rich_section(TERMS_TITLE, sections.terms_conditions.as_deref());
    composer.closing(content);
    composer.finish();
    Ok(())
}

struct Composer<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    frame: &'a PageFrame<'a>,
    settings: &'a DesignSettings,
    base: TextStyle,
    primary: [u8; 3],
    y: f32,
}

impl<S: Surface + ?Sized> Composer<'_, S> {
    fn renderer(&self) -> PageFlowRenderer<'_> {
        PageFlowRenderer::new(self.frame, self.base, self.settings.line_height)
    }

    fn pitch(&self) -> f32 {
        self.renderer().line_height(self.body_style().font_size)
    }

    /// Base style, or the default size when the configured one is unusable.
    fn body_style(&self) -> TextStyle {
        if self.base.font_size.is_finite() && self.base.font_size > 0.0 {
            self.base
        } else {
            TextStyle::plain(DEFAULT_FONT_SIZE)
        }
    }

    fn room(&mut self, height: f32) {
        self.y = self.frame.ensure_room(self.surface, self.y, height);
    }

    fn put(&mut self, text: &str, style: TextStyle, x: f32, align: Alignment) {
        if text.is_empty() {
            return;
        }
        self.surface.draw(DrawCall::Text {
            x,
            y: self.y,
            text: text.to_string(),
            style,
            align,
        });
    }

    /// One left-aligned line followed by `advance` millimeters.
    fn line(&mut self, text: &str, style: TextStyle, advance: f32) {
        let pitch = self.pitch();
        self.room(pitch);
        self.put(text, style, self.frame.geometry.margin_left, Alignment::Left);
        self.y += advance;
    }

    fn wrapped(&mut self, text: &str, style: TextStyle, max_width: f32) {
        let pitch = self.pitch();
        for line in wrap_plain(text, &style, max_width) {
            self.line(&line, style, pitch);
        }
    }

    fn section_title(&mut self, title: &str) {
        let pitch = self.pitch();
        // Keep the title together with the first body line.
        self.room(10.0 + pitch);
        let style = TextStyle::plain(SECTION_TITLE_SIZE).bold().colored(self.primary);
        self.line(title, style, 10.0);
    }

    fn rich_section(&mut self, title: &str, source: Option<&str>) {
        let Some(source) = source.filter(|s| !s.trim().is_empty()) else {
            log::debug!("Skipping empty section {title}");
            return;
        };
        log::debug!("Rendering section {title}");
        self.section_title(title);

        let instructions = html::parse(source, self.base);
        let frame = self.frame;
        let renderer = PageFlowRenderer::new(frame, self.base, self.settings.line_height);
        match renderer.render(self.surface, &instructions, self.y) {
            Ok(y) => self.y = y,
            Err(e) => {
                log::warn!("Section {title} could not be laid out ({e}), rendering it as plain text");
                let width = self.frame.geometry.content_width();
                self.wrapped(source, self.body_style(), width);
            }
        }
        self.y += 15.0;
    }

    fn title_block(&mut self, content: &ProposalContent) {
        let title_style = TextStyle::plain(TITLE_SIZE).bold().colored(self.primary);
        self.line(content.kind.title(), title_style, 15.0);
        let date = format!("Tanggal: {}", content.letter_date);
        self.line(&date, self.body_style(), 10.0);
    }

    fn recipient_block(&mut self, content: &ProposalContent) {
        let body = self.body_style();
        let pitch = self.pitch();
        let recipient = &content.recipient;
        self.line("Kepada Yth,", body, pitch);
        self.line(&recipient.name, body.bold(), pitch);
        self.line(&recipient.company, body, pitch);
        let width = ADDRESS_WIDTH.min(self.frame.geometry.content_width());
        self.wrapped(&recipient.address, body, width);
        self.y += 10.0;
        self.line("Dengan hormat,", body, 10.0);
    }

    fn opening(&mut self, content: &ProposalContent) {
        let text = format!(
            "Kami dari {} bermaksud mengajukan {} untuk layanan yang Bapak/Ibu butuhkan.",
            content.creator.name,
            content.kind.offer_phrase()
        );
        let width = self.frame.geometry.content_width();
        self.wrapped(&text, self.body_style(), width);
        self.y += 15.0;
    }

    fn product_grid(&mut self, products: &[Product]) {
        if products.is_empty() {
            return;
        }
        log::debug!("Rendering product grid with {} rows", products.len());
        self.section_title(PRODUCTS_TITLE);

        let geometry = self.frame.geometry;
        let cols = ProductGrid::columns(geometry.margin_left, geometry.content_width());
        let right_edge = |(x, w): (f32, f32)| x + w - CELL_PADDING;
        let head = TextStyle::plain(GRID_SIZE).bold();
        let cell = TextStyle::plain(GRID_SIZE);
        let rule_color = self.settings.secondary_rgb();

        self.room(8.0 + row_height(1));
        for (idx, heading) in ProductGrid::HEADINGS.iter().enumerate() {
            if idx == 3 {
                self.put(heading, head, right_edge(cols[3]), Alignment::Right);
            } else {
                self.put(heading, head, cols[idx].0, Alignment::Left);
            }
        }
        self.rule(geometry.margin_left, geometry.page_width - geometry.margin_right, rule_color);
        self.y += 8.0;

        let grid = ProductGrid::new(products);
        for row in &grid.rows {
            match row {
                GridRow::Item {
                    number,
                    name,
                    description,
                    price,
                } => {
                    let desc_lines = wrap_plain(description, &cell, cols[2].1 - CELL_PADDING);
                    let height = row_height(desc_lines.len());
                    self.room(height);
                    self.put(&number.to_string(), cell, cols[0].0, Alignment::Left);
                    self.put(name, cell, cols[1].0, Alignment::Left);
                    let top = self.y;
                    for (i, line) in desc_lines.iter().enumerate() {
                        self.y = top + i as f32 * 4.0;
                        self.put(line, cell, cols[2].0, Alignment::Left);
                    }
                    self.y = top;
                    self.put(price, cell, right_edge(cols[3]), Alignment::Right);
                    self.y += height;
                }
                GridRow::Total { amount } => {
                    self.room(5.0 + row_height(1));
                    self.rule(geometry.margin_left, geometry.page_width - geometry.margin_right, rule_color);
                    self.y += 5.0;
                    self.put("TOTAL", head, right_edge(cols[2]), Alignment::Right);
                    self.put(amount, head, right_edge(cols[3]), Alignment::Right);
                    self.y += 15.0;
                }
            }
        }
    }

    /// Thin horizontal rule just below the current baseline.
    fn rule(&mut self, x1: f32, x2: f32, color: [u8; 3]) {
        let y = self.y + 2.0;
        self.surface.draw(DrawCall::Rule {
            x1,
            y1: y,
            x2,
            y2: y,
            width: 0.2,
            color,
        });
    }

    fn closing(&mut self, content: &ProposalContent) {
        let body = self.body_style();
        let pitch = self.pitch();
        self.line(
            "Demikian proposal ini kami sampaikan. Atas perhatian dan kerjasamanya,",
            body,
            pitch,
        );
        self.line("kami ucapkan terima kasih.", body, 20.0);

        // The signature block is never split across pages.
        self.room(20.0 + 2.0 * pitch);
        self.line("Hormat kami,", body, 20.0);
        self.line(&content.creator.name, body.bold(), pitch);
        self.line(&content.creator.position, body, pitch);
    }

    fn finish(self) {
        self.frame.close_page(self.surface);
    }
}
