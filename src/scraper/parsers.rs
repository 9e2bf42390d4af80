use crate::models::ListingRow;
use crate::scraper::cleaner::{join_text_nodes, strip_whitespace};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// 1-2 letter prefix, optional hyphen, 2-5 letters/digits, on word boundaries.
static REGISTRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{1,2}-?[A-Z0-9]{2,5})\b").unwrap());

/// Columns on a category listing: date | aircraft | reg/operator | location.
const MIN_CELLS: usize = 4;

// ── Listing page ──────────────────────────────────────────────────────────────

/// Extract every incident row from a category listing page, in document order.
///
/// Rows with fewer than four cells (headers, spacers) are skipped. A page with
/// no table at all yields an empty vec.
pub fn parse_listing_page(html: &str) -> Vec<ListingRow> {
    let doc = Html::parse_document(html);

    doc.select(&ROW_SEL)
        .filter_map(|tr| {
            let cells: Vec<String> = tr.select(&TD_SEL).map(cell_text).collect();
            if cells.len() < MIN_CELLS {
                return None;
            }

            let mut cells = cells.into_iter();
            let date_text = cells.next()?;
            let aircraft_text = cells.next()?;
            let reg_op_text = cells.next()?;
            let location_text = cells.next()?;

            Some(ListingRow {
                registration: extract_registration(&reg_op_text),
                date_text,
                aircraft_text,
                reg_op_text,
                location_text,
            })
        })
        .collect()
}

fn cell_text(td: ElementRef<'_>) -> String {
    join_text_nodes(td.text())
}

/// Best-effort registration from the combined registration/operator cell.
///
/// The whitespace-stripped text is searched first, which rejoins marks split
/// across spaces ("EC - ABC"). When that finds nothing, typically because the
/// mark runs straight into the operator name once spaces are gone, the
/// whitespace-collapsed text is searched instead. Operator names containing a
/// matching token can still produce a wrong mark.
pub fn extract_registration(reg_op_text: &str) -> Option<String> {
    let compact = strip_whitespace(reg_op_text);
    first_registration(&compact).or_else(|| first_registration(reg_op_text))
}

fn first_registration(text: &str) -> Option<String> {
    REGISTRATION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
