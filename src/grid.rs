use crate::model::Product;

/// Formats an amount as Indonesian Rupiah: `Rp1.500.000`. Fractions are
/// rounded half away from zero.
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}Rp{grouped}")
}

#[derive(Clone, Debug, PartialEq)]
pub enum GridRow {
    Item {
        number: usize,
        name: String,
        description: String,
        price: String,
    },
    Total {
        amount: String,
    },
}

/// The client-facing pricing table. Only `price` is projected; cost figures
/// never make it into a row.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductGrid {
    pub rows: Vec<GridRow>,
}

impl ProductGrid {
    pub const HEADINGS: [&'static str; 4] = ["No", "Layanan", "Deskripsi", "Harga"];
    /// Relative column widths, scaled to the content width.
    pub const COLUMN_WEIGHTS: [f32; 4] = [15.0, 60.0, 80.0, 35.0];

    pub fn new(products: &[Product]) -> Self {
        let mut rows: Vec<GridRow> = products
            .iter()
            .enumerate()
            .map(|(idx, product)| GridRow::Item {
                number: idx + 1,
                name: product.name.clone(),
                description: product.description.clone(),
                price: format_rupiah(product.price),
            })
            .collect();
        let total: f64 = products.iter().map(|p| p.price).sum();
        rows.push(GridRow::Total {
            amount: format_rupiah(total),
        });
        ProductGrid { rows }
    }

    /// Left edge and width of each column, in millimeters.
    pub fn columns(left: f32, content_width: f32) -> [(f32, f32); 4] {
        let sum: f32 = Self::COLUMN_WEIGHTS.iter().sum();
        let mut x = left;
        Self::COLUMN_WEIGHTS.map(|weight| {
            let width = content_width * weight / sum;
            let col = (x, width);
            x += width;
            col
        })
    }
}

/// Row height for a description wrapped onto `lines` lines.
pub fn row_height(lines: usize) -> f32 {
    (lines as f32 * 4.0 + 4.0).max(8.0)
}
