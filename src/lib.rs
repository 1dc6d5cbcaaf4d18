pub mod compose;
pub mod error;
pub mod flow;
pub mod fonts;
pub mod grid;
pub mod html;
pub mod model;
pub mod pdf;
pub mod settings;
pub mod style;
pub mod surface;

pub use compose::{compose, compose_onto};
pub use error::{Error, ErrorResponse, MeasureError};
pub use model::{ProposalContent, ProposalKind, ProposalRequest, TextInstruction, TextStyle};
pub use settings::DesignSettings;
pub use surface::{Canvas, DrawCall, Surface};

pub const CONTENT_TYPE: &str = "application/pdf";

/// A finished document ready to be written or sent.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

pub fn suggested_filename(kind: ProposalKind, unix_millis: i64) -> String {
    format!("proposal-{}-{unix_millis}.pdf", kind.slug())
}

pub fn generate(request: &ProposalRequest) -> Result<RenderedDocument, Error> {
    let content = request.content();
    log::info!(
        "Generating {} proposal with {} product(s)",
        content.kind.slug(),
        request.products.len()
    );
    let bytes = compose(
        &content,
        &request.rich_text_sections,
        &request.products,
        &request.design,
    )?;
    let filename = suggested_filename(content.kind, chrono::Utc::now().timestamp_millis());
    Ok(RenderedDocument {
        bytes,
        filename,
        content_type: CONTENT_TYPE,
    })
}
