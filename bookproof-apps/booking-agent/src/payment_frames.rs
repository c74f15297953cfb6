//!  Bookproof Booking Agent
//!
//!  Copyright (C) 2026  The Bookproof Authors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Payment Iframe Resolver
//!
//! Side-effect free classification of page iframes and planning of the card
//! field fills. Payment providers isolate card inputs in cross-origin
//! iframes; the only handle the automation server gives us is a
//! name-qualified frame selector, so frames without a name attribute are
//! skipped.

use crate::config::CardProfile;
use serde::{Deserialize, Serialize};

/// Source-URL keywords marking an iframe as a payment-provider candidate.
/// Case-insensitive substring test, naive on purpose: PSP URLs vary too
/// much for anything stricter to survive contact with real checkout pages.
pub const PSP_KEYWORDS: [&str; 5] = ["card", "payment", "adyen", "braintree", "stripe"];

/// Attribute-based selectors for the three card fields inside a PSP iframe.
pub const CARD_NUMBER_SELECTOR: &str =
    "input[name*='cardnumber'], input[autocomplete*='cc-number']";
pub const EXPIRY_SELECTOR: &str = "input[name*='exp'], input[autocomplete*='cc-exp']";
pub const CVV_SELECTOR: &str =
    "input[name*='cvc'], input[autocomplete*='cc-csc'], input[name*='cvv']";

/// Snapshot of one iframe at inspection time. Stale after any click or
/// navigation; always re-snapshot before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IframeDescriptor {
    #[serde(rename = "i", default)]
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub src: String,
}

impl IframeDescriptor {
    /// Name-qualified selector for iframe-scoped fills, or `None` for
    /// anonymous frames (no selector can reach them).
    pub fn frame_selector(&self) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        Some(format!("iframe[name='{}']", self.name))
    }
}

/// Parse the snapshot JSON produced by
/// [`crate::page_scripts::JS_SNAPSHOT_IFRAMES`]. Malformed payloads degrade
/// to an empty list; payment then simply has no iframe candidates.
pub fn parse_snapshot(raw: &str) -> Vec<IframeDescriptor> {
    match serde_json::from_str::<Vec<IframeDescriptor>>(raw) {
        Ok(frames) => frames,
        Err(e) => {
            tracing::warn!("Unparseable iframe snapshot ({e}); assuming no frames");
            Vec::new()
        }
    }
}

/// Keep only frames whose source URL looks like a payment provider.
pub fn payment_candidates(frames: Vec<IframeDescriptor>) -> Vec<IframeDescriptor> {
    frames
        .into_iter()
        .filter(|f| {
            let src = f.src.to_lowercase();
            PSP_KEYWORDS.iter().any(|k| src.contains(k))
        })
        .collect()
}

/// Expiry in the `MM/YY` format PSP inputs expect: configured month plus the
/// last two characters of the configured year. Counted in characters, not
/// bytes, so a year typed in non-ASCII digits cannot split a code point.
pub fn format_expiry(exp_month: &str, exp_year: &str) -> String {
    let skip = exp_year.chars().count().saturating_sub(2);
    let yy: String = exp_year.chars().skip(skip).collect();
    format!("{exp_month}/{yy}")
}

/// One iframe-scoped fill: frame selector, field selector, value.
#[derive(Debug, Clone)]
pub struct FrameFill {
    pub frame_selector: String,
    pub css_selector: &'static str,
    pub value: String,
}

/// The three card-field fills for one candidate frame, or an empty plan for
/// an anonymous frame.
pub fn frame_fill_plan(frame: &IframeDescriptor, card: &CardProfile) -> Vec<FrameFill> {
    let Some(frame_selector) = frame.frame_selector() else {
        tracing::debug!(
            "Skipping anonymous payment iframe #{} ({})",
            frame.index,
            frame.src
        );
        return Vec::new();
    };
    [
        (CARD_NUMBER_SELECTOR, card.number.clone()),
        (
            EXPIRY_SELECTOR,
            format_expiry(&card.exp_month, &card.exp_year),
        ),
        (CVV_SELECTOR, card.cvv.clone()),
    ]
    .into_iter()
    .map(|(css_selector, value)| FrameFill {
        frame_selector: frame_selector.clone(),
        css_selector,
        value,
    })
    .collect()
}
