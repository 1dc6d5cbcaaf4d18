use proposal_pdf::compose::{
    COMPANY_PROFILE_TITLE, PRODUCTS_TITLE, SERVICE_BENEFITS_TITLE, TERMS_TITLE,
};
use proposal_pdf::grid::{GridRow, ProductGrid};
use proposal_pdf::model::{Creator, Product, Recipient, RichTextSections};
use proposal_pdf::{
    Canvas, DesignSettings, DrawCall, Error, MeasureError, ProposalContent, ProposalKind,
    ProposalRequest, Surface, TextStyle, compose, compose_onto, generate, suggested_filename,
};

fn content(kind: ProposalKind) -> ProposalContent {
    ProposalContent {
        kind,
        recipient: Recipient {
            name: "Budi Santoso".into(),
            company: "PT Maju Jaya".into(),
            address: "Jl. Sudirman No. 1, Jakarta".into(),
        },
        letter_date: "1 Januari 2025".into(),
        creator: Creator {
            name: "Sari Wulandari".into(),
            position: "Account Manager".into(),
        },
    }
}

fn product(name: &str, price: f64, cogs: Option<f64>) -> Product {
    Product {
        name: name.into(),
        description: format!("Paket {name}"),
        price,
        cogs,
        category: None,
    }
}

fn draw(
    content: &ProposalContent,
    sections: &RichTextSections,
    products: &[Product],
    settings: &DesignSettings,
) -> Canvas {
    let mut canvas = Canvas::new(settings.geometry().unwrap());
    compose_onto(&mut canvas, content, sections, products, settings).unwrap();
    canvas
}

fn page_of(canvas: &Canvas, needle: &str) -> Option<usize> {
    canvas
        .pages()
        .iter()
        .position(|p| p.calls.iter().any(|c| c.text() == Some(needle)))
}

/// Fails to measure any text containing a marker word.
struct Flaky {
    inner: Canvas,
}

impl Surface for Flaky {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<f32, MeasureError> {
        if text.contains("EXPLODE") {
            return Err(MeasureError::Unsupported(text.to_string()));
        }
        self.inner.measure(text, style)
    }

    fn draw(&mut self, call: DrawCall) {
        self.inner.draw(call);
    }

    fn new_page(&mut self) {
        self.inner.new_page();
    }

    fn page_number(&self) -> usize {
        self.inner.page_number()
    }
}

#[test]
fn minimal_proposal_has_the_fixed_blocks_only() {
    let canvas = draw(
        &content(ProposalKind::Quotation),
        &RichTextSections::default(),
        &[],
        &DesignSettings::default(),
    );
    let texts = canvas.texts();
    for expected in [
        "PROPOSAL PENAWARAN HARGA",
        "Tanggal: 1 Januari 2025",
        "Kepada Yth,",
        "Budi Santoso",
        "PT Maju Jaya",
        "Dengan hormat,",
        "Hormat kami,",
        "Sari Wulandari",
        "Account Manager",
    ] {
        assert!(texts.contains(&expected), "missing {expected:?} in {texts:?}");
    }
    for absent in [
        COMPANY_PROFILE_TITLE,
        SERVICE_BENEFITS_TITLE,
        PRODUCTS_TITLE,
        TERMS_TITLE,
    ] {
        assert!(!texts.contains(&absent), "unexpected {absent:?}");
    }
    assert_eq!(canvas.pages().len(), 1);
}

#[test]
fn sections_appear_in_fixed_order() {
    let sections = RichTextSections {
        company_profile: Some("<p>Profil kami</p>".into()),
        service_benefits: Some("<ul><li>Cepat</li></ul>".into()),
        terms_conditions: Some("<ol><li>Pembayaran di muka</li></ol>".into()),
    };
    let canvas = draw(
        &content(ProposalKind::Partnership),
        &sections,
        &[product("Website", 1_500_000.0, None)],
        &DesignSettings::default(),
    );
    let texts = canvas.texts();
    let at = |needle: &str| {
        texts
            .iter()
            .position(|t| *t == needle)
            .unwrap_or_else(|| panic!("missing {needle:?}"))
    };
    let order = [
        at(COMPANY_PROFILE_TITLE),
        at("Profil kami"),
        at("PROPOSAL KERJASAMA"),
        at("Kepada Yth,"),
        at(SERVICE_BENEFITS_TITLE),
        at("\u{2022} Cepat"),
        at(PRODUCTS_TITLE),
        at(TERMS_TITLE),
        at("1. Pembayaran di muka"),
        at("Hormat kami,"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
}

#[test]
fn whitespace_only_sections_are_skipped() {
    let sections = RichTextSections {
        company_profile: Some("   ".into()),
        service_benefits: Some(String::new()),
        terms_conditions: None,
    };
    let canvas = draw(
        &content(ProposalKind::Quotation),
        &sections,
        &[],
        &DesignSettings::default(),
    );
    let texts = canvas.texts();
    assert!(!texts.contains(&COMPANY_PROFILE_TITLE));
    assert!(!texts.contains(&SERVICE_BENEFITS_TITLE));
}

#[test]
fn grid_shows_prices_and_never_cost() {
    let products = [product("Konsultasi", 5_000_000.0, Some(3_250_000.0))];
    let grid = ProductGrid::new(&products);
    assert_eq!(grid.rows.len(), 2);
    assert_eq!(
        grid.rows[1],
        GridRow::Total {
            amount: "Rp5.000.000".into()
        }
    );

    let canvas = draw(
        &content(ProposalKind::Quotation),
        &RichTextSections::default(),
        &products,
        &DesignSettings::default(),
    );
    let texts = canvas.texts();
    for heading in ProductGrid::HEADINGS {
        assert!(texts.contains(&heading));
    }
    assert_eq!(texts.iter().filter(|t| **t == "Rp5.000.000").count(), 2);
    assert!(texts.contains(&"TOTAL"));
    assert!(!texts.iter().any(|t| t.contains("3.250.000")));
}

#[test]
fn grid_total_sums_every_row() {
    let products = [
        product("A", 1_000_000.0, None),
        product("B", 2_500_000.0, Some(1.0)),
        product("C", 499.5, None),
    ];
    let grid = ProductGrid::new(&products);
    assert_eq!(grid.rows.len(), 4);
    assert_eq!(
        grid.rows.last(),
        Some(&GridRow::Total {
            amount: "Rp3.500.500".into()
        })
    );
}

#[test]
fn failing_section_falls_back_to_raw_text() {
    let sections = RichTextSections {
        company_profile: Some("<p>Profil kami</p>".into()),
        service_benefits: Some("<p>Keuntungan EXPLODE besar</p>".into()),
        terms_conditions: Some("<p>Syarat berlaku</p>".into()),
    };
    let settings = DesignSettings::default();
    let mut surface = Flaky {
        inner: Canvas::new(settings.geometry().unwrap()),
    };
    compose_onto(
        &mut surface,
        &content(ProposalKind::Quotation),
        &sections,
        &[],
        &settings,
    )
    .unwrap();

    let texts = surface.inner.texts();
    assert!(texts.contains(&SERVICE_BENEFITS_TITLE));
    assert!(texts.contains(&"<p>Keuntungan EXPLODE besar</p>"));
    assert!(!texts.contains(&"Keuntungan EXPLODE besar"));
    assert!(texts.contains(&"Profil kami"));
    assert!(texts.contains(&"Syarat berlaku"));
    assert!(texts.contains(&"Hormat kami,"));
}

#[test]
fn failing_company_profile_keeps_its_place() {
    let profile = "<p>Kami berdiri sejak 2010 EXPLODE</p>";
    let sections = RichTextSections {
        company_profile: Some(profile.into()),
        service_benefits: Some("<ul><li>Cepat</li></ul>".into()),
        terms_conditions: Some("<p>Syarat berlaku</p>".into()),
    };
    let settings = DesignSettings::default();
    let mut surface = Flaky {
        inner: Canvas::new(settings.geometry().unwrap()),
    };
    compose_onto(
        &mut surface,
        &content(ProposalKind::Quotation),
        &sections,
        &[],
        &settings,
    )
    .unwrap();

    let texts = surface.inner.texts();
    let at = |needle: &str| {
        texts
            .iter()
            .position(|t| *t == needle)
            .unwrap_or_else(|| panic!("missing {needle:?}"))
    };
    assert!(at(COMPANY_PROFILE_TITLE) < at(profile));
    assert!(at(profile) < at("PROPOSAL PENAWARAN HARGA"));
    assert!(at("\u{2022} Cepat") > at(SERVICE_BENEFITS_TITLE));
    assert!(at("Syarat berlaku") > at(TERMS_TITLE));

    // The profile is followed by the usual section spacing before the title.
    let y_of = |needle: &str| {
        surface.inner.calls().find_map(|c| match c {
            DrawCall::Text { y, text, .. } if text == needle => Some(*y),
            _ => None,
        })
    };
    let (Some(raw), Some(title)) = (y_of(profile), y_of("PROPOSAL PENAWARAN HARGA")) else {
        panic!("profile or title not drawn");
    };
    assert!((title - raw - 21.0).abs() < 1e-3, "{raw} -> {title}");
}

#[test]
fn unusable_font_size_still_produces_a_document() {
    let settings = DesignSettings {
        font_size: 0.0,
        ..DesignSettings::default()
    };
    let sections = RichTextSections {
        company_profile: Some("<p>Profil <b>kami</b></p>".into()),
        ..RichTextSections::default()
    };
    let canvas = draw(&content(ProposalKind::Quotation), &sections, &[], &settings);
    assert!(canvas.texts().contains(&"<p>Profil <b>kami</b></p>"));
    let bytes = compose(&content(ProposalKind::Quotation), &sections, &[], &settings).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn long_terms_paginate_and_keep_the_signature_together() {
    let terms: String = (1..=80)
        .map(|i| format!("<li>Ketentuan nomor {i} berlaku sesuai kesepakatan kedua belah pihak.</li>"))
        .collect();
    let sections = RichTextSections {
        terms_conditions: Some(format!("<ol>{terms}</ol>")),
        ..RichTextSections::default()
    };
    let canvas = draw(
        &content(ProposalKind::Quotation),
        &sections,
        &[],
        &DesignSettings::default(),
    );
    assert!(canvas.pages().len() > 1);
    let signature = page_of(&canvas, "Hormat kami,");
    assert!(signature.is_some());
    assert_eq!(page_of(&canvas, "Sari Wulandari"), signature);
    assert_eq!(page_of(&canvas, "Account Manager"), signature);
    let last = format!("Halaman {}", canvas.pages().len());
    assert_eq!(page_of(&canvas, &last), Some(canvas.pages().len() - 1));
}

#[test]
fn closing_lines_are_fixed() {
    let canvas = draw(
        &content(ProposalKind::Quotation),
        &RichTextSections::default(),
        &[],
        &DesignSettings::default(),
    );
    let y_of = |needle: &str| {
        canvas.calls().find_map(|c| match c {
            DrawCall::Text { y, text, .. } if text == needle => Some(*y),
            _ => None,
        })
    };
    let first = y_of("Demikian proposal ini kami sampaikan. Atas perhatian dan kerjasamanya,");
    let second = y_of("kami ucapkan terima kasih.");
    let signature = y_of("Hormat kami,");
    let (Some(first), Some(second), Some(signature)) = (first, second, signature) else {
        panic!("closing lines missing");
    };
    assert!((second - first - 6.0).abs() < 1e-3);
    assert!((signature - second - 20.0).abs() < 1e-3);
}

#[test]
fn unknown_page_size_is_a_geometry_error() {
    let settings = DesignSettings {
        page_size: "A3".into(),
        ..DesignSettings::default()
    };
    let result = compose(
        &content(ProposalKind::Quotation),
        &RichTextSections::default(),
        &[],
        &settings,
    );
    assert!(matches!(result, Err(Error::Geometry(_))));
}

#[test]
fn negative_line_height_is_a_geometry_error() {
    let settings: DesignSettings = serde_json::from_str(r#"{"lineHeight": -1.5}"#).unwrap();
    let sections = RichTextSections {
        company_profile: Some("<p>a</p><p>b</p>".into()),
        ..RichTextSections::default()
    };
    let result = compose(&content(ProposalKind::Quotation), &sections, &[], &settings);
    assert!(matches!(result, Err(Error::Geometry(_))));
}

#[test]
fn pdf_output_is_well_formed() {
    let mut settings = DesignSettings::default();
    settings.watermark.enabled = true;
    let bytes = compose(
        &content(ProposalKind::Quotation),
        &RichTextSections::default(),
        &[product("Website", 1_500_000.0, None)],
        &settings,
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Helvetica-Bold"));
    assert!(text.contains("/WinAnsiEncoding"));
    assert!(text.contains("/ExtGState"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn request_json_drives_generation() {
    let json = r##"{
        "proposalKind": "partnership",
        "recipient": { "name": "Budi", "company": "PT Maju", "address": "Jl. Sudirman 1" },
        "letterDate": "1 Januari 2025",
        "creator": { "name": "Sari", "position": "Manager" },
        "richTextSections": { "companyProfile": "<p>Kami <b>berpengalaman</b></p>" },
        "products": [
            { "name": "Web", "description": "Situs", "price": 1500000, "cogs": 900000 }
        ],
        "design": { "pageSize": "letter", "primaryColor": "#000", "margins": { "top": 20 } }
    }"##;
    let request: ProposalRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.proposal_kind, ProposalKind::Partnership);
    assert_eq!(request.products[0].cogs, Some(900000.0));
    assert_eq!(request.design.margins.top, 20.0);
    assert_eq!(request.design.margins.left, 25.0);
    assert_eq!(request.design.font_size, 12.0);

    let document = generate(&request).unwrap();
    assert!(document.bytes.starts_with(b"%PDF-"));
    assert_eq!(document.content_type, "application/pdf");
    assert!(document.filename.starts_with("proposal-partnership-"));
    assert!(document.filename.ends_with(".pdf"));
}

#[test]
fn malformed_request_maps_to_an_error_response() {
    let err: Error = serde_json::from_str::<ProposalRequest>(r#"{"products": []}"#)
        .unwrap_err()
        .into();
    let response = err.to_response();
    assert_eq!(response.error, "Invalid proposal request");
    assert!(!response.details.is_empty());
}

#[test]
fn filenames_carry_kind_and_timestamp() {
    assert_eq!(
        suggested_filename(ProposalKind::Quotation, 1_700_000_000_000),
        "proposal-quotation-1700000000000.pdf"
    );
}
