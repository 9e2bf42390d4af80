use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::registration::normalize_registration;
use crate::scraper::cleaner::parse_date;

// ── Listing row ───────────────────────────────────────────────────────────────

/// One incident summary from a category listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRow {
    pub date_text: String,
    pub aircraft_text: String,
    pub reg_op_text: String,       // registration + operator, as shown
    pub registration: Option<String>,
    pub location_text: String,
}

impl ListingRow {
    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.date_text)
    }

    pub fn normalized_registration(&self) -> Option<String> {
        normalize_registration(self.registration.as_deref())
    }
}

// ── Export row ────────────────────────────────────────────────────────────────

/// Flat record written by `crawl`: listing fields plus derived columns.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    pub date: Option<NaiveDate>,
    pub date_text: String,
    pub aircraft_text: String,
    pub reg_op_text: String,
    pub registration: Option<String>,
    pub normalized_registration: Option<String>,
    pub location_text: String,
}

impl From<&ListingRow> for ExportRow {
    fn from(row: &ListingRow) -> Self {
        Self {
            date: row.date(),
            date_text: row.date_text.clone(),
            aircraft_text: row.aircraft_text.clone(),
            reg_op_text: row.reg_op_text.clone(),
            registration: row.registration.clone(),
            normalized_registration: row.normalized_registration(),
            location_text: row.location_text.clone(),
        }
    }
}
