//! Cart table rendering for the console.

use std::io;

use rusty_money::iso;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use grove::{
    cart::{Cart, CartSource},
    items::{ItemDetails, LineItem},
    pricing::format_amount,
};

/// Writes `cart` as a table followed by a subtotal line.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &Cart,
    currency: &'static iso::Currency,
) -> io::Result<()> {
    let source = match cart.source() {
        CartSource::Local => "guest",
        CartSource::Server => "account",
    };

    if cart.is_empty() {
        return writeln!(out, "Your {source} cart is empty.");
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Kind", "Item", "Details", "Qty", "Unit Price", "Total"]);

    for item in cart.items() {
        builder.push_record([
            item.id.to_string(),
            item.kind().to_string(),
            item.display.name.clone(),
            details(item),
            item.quantity.to_string(),
            format_amount(item.unit_price, currency),
            format_amount(item.line_total(), currency),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..7), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "{} item(s) in your {source} cart, subtotal {}",
        cart.item_count(),
        format_amount(cart.subtotal(), currency)
    )
}

fn details(item: &LineItem) -> String {
    match &item.details {
        ItemDetails::Product(line) => [
            line.sku.as_deref(),
            line.selections.color.as_deref(),
            line.selections.size.as_deref(),
            line.selections.planter.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / "),
        ItemDetails::Sponsorship(line) | ItemDetails::Adoption(line) => {
            let mut parts = vec![format!("{} months", line.duration_months)];

            if let Some(site) = line.site_id {
                parts.push(format!("site {site}"));
            }

            if let Some(name) = line
                .dedication
                .as_ref()
                .and_then(|dedication| dedication.name.as_deref())
            {
                parts.push(format!("for {name}"));
            }

            parts.join(", ")
        }
    }
}
