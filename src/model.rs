use serde::Deserialize;

use crate::settings::DesignSettings;

pub const BLACK: [u8; 3] = [0, 0, 0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: f32, // points
    pub color: [u8; 3],
}

impl TextStyle {
    pub fn plain(font_size: f32) -> Self {
        TextStyle {
            bold: false,
            italic: false,
            underline: false,
            font_size,
            color: BLACK,
        }
    }

    pub fn bold(self) -> Self {
        TextStyle { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        TextStyle { italic: true, ..self }
    }

    pub fn underline(self) -> Self {
        TextStyle { underline: true, ..self }
    }

    pub fn sized(self, font_size: f32) -> Self {
        TextStyle { font_size, ..self }
    }

    pub fn colored(self, color: [u8; 3]) -> Self {
        TextStyle { color, ..self }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextInstruction {
    Run { text: String, style: TextStyle },
    Block { text: String, style: TextStyle },
    LineBreak,
    ListItem { text: String, style: TextStyle, marker: String },
}

impl TextInstruction {
    pub fn style(&self) -> Option<&TextStyle> {
        match self {
            TextInstruction::Run { style, .. }
            | TextInstruction::Block { style, .. }
            | TextInstruction::ListItem { style, .. } => Some(style),
            TextInstruction::LineBreak => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    Quotation,
    Partnership,
}

impl ProposalKind {
    pub fn title(self) -> &'static str {
        match self {
            ProposalKind::Quotation => "PROPOSAL PENAWARAN HARGA",
            ProposalKind::Partnership => "PROPOSAL KERJASAMA",
        }
    }

    /// Noun phrase used in the opening sentence.
    pub fn offer_phrase(self) -> &'static str {
        match self {
            ProposalKind::Quotation => "penawaran harga",
            ProposalKind::Partnership => "proposal kerjasama",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ProposalKind::Quotation => "quotation",
            ProposalKind::Partnership => "partnership",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub name: String,
    pub company: String,
    pub address: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Creator {
    pub name: String,
    pub position: String,
}

#[derive(Clone, Debug)]
pub struct ProposalContent {
    pub kind: ProposalKind,
    pub recipient: Recipient,
    pub letter_date: String,
    pub creator: Creator,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RichTextSections {
    pub company_profile: Option<String>,
    pub service_benefits: Option<String>,
    pub terms_conditions: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub cogs: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub proposal_kind: ProposalKind,
    #[serde(default)]
    pub recipient: Recipient,
    #[serde(default)]
    pub letter_date: String,
    #[serde(default)]
    pub creator: Creator,
    #[serde(default)]
    pub rich_text_sections: RichTextSections,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub design: DesignSettings,
}

impl ProposalRequest {
    pub fn content(&self) -> ProposalContent {
        ProposalContent {
            kind: self.proposal_kind,
            recipient: self.recipient.clone(),
            letter_date: self.letter_date.clone(),
            creator: self.creator.clone(),
        }
    }
}
