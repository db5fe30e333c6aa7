//! Plain-text rendering of picker projections.

use std::io::{self, Write};

use variant_picker::Picker;
use variant_picker_core::{FetchStatus, VariantKey};

/// Checkbox mark for a product row.
const fn product_mark(checked: bool, partial: bool) -> &'static str {
    if partial {
        "[-]"
    } else if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

const fn variant_mark(selected: bool) -> &'static str {
    if selected { "[x]" } else { "[ ]" }
}

/// Write the product list with checkbox marks, or the fetch status when there
/// is nothing to list.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn list(out: &mut impl Write, picker: &Picker) -> io::Result<()> {
    let views = picker.product_views();

    if views.is_empty() {
        match picker.fetch_status() {
            FetchStatus::Loading => writeln!(out, "loading...")?,
            FetchStatus::Failed => writeln!(
                out,
                "fetch failed: {}",
                picker.last_error().unwrap_or("unknown error")
            )?,
            FetchStatus::Idle | FetchStatus::Ready => writeln!(out, "no products")?,
        }
    }

    for (position, view) in views.iter().enumerate() {
        writeln!(
            out,
            "{} {position} {}",
            product_mark(view.checked, view.partial),
            view.product.name
        )?;
        for variant in &view.variants {
            writeln!(
                out,
                "    {} {} {}  {}  ({} available)",
                variant_mark(variant.selected),
                variant.index,
                variant.variant.label(),
                variant.variant.price,
                variant.variant.available
            )?;
        }
    }

    writeln!(
        out,
        "search: {:?}  selected: {}",
        picker.query(),
        picker.selection_count()
    )
}

/// Write the picker's result as a JSON array of keys.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn result(out: &mut impl Write, keys: &[VariantKey]) -> io::Result<()> {
    serde_json::to_writer(&mut *out, keys)?;
    writeln!(out)
}
