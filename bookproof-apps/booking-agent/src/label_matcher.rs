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

//! # Label Matcher
//!
//! Field intents: multilingual label patterns paired with the value to fill.
//! The patterns are JavaScript regular expressions compiled case-insensitive
//! inside the page (see [`crate::page_scripts::JS_FILL_BY_LABEL`]); this
//! module is the explicit strategy table that decides which pattern carries
//! which profile value, first match wins.

use crate::config::{CardProfile, GuestProfile};
use serde_json::{Value, json};

// English and Thai label variants, matched case-insensitively in-page.
pub const EMAIL_LABEL: &str = "email|อีเมล";
// Negative lookahead keeps the guest first name off the card-holder label
// ("ชื่อผู้ถือบัตร") when both appear on the payment page. Lookahead is JS
// regex syntax; these patterns never run through the Rust regex engine.
pub const FIRST_NAME_LABEL: &str = "first name|ชื่อ(?!ผู้ถือ)|given";
pub const LAST_NAME_LABEL: &str = "last name|นามสกุล|family";
pub const PHONE_LABEL: &str = "phone|โทร";
pub const ADDRESS_LABEL: &str = "address|ที่อยู่";
pub const CITY_LABEL: &str = "city|เมือง";
pub const CARD_NUMBER_LABEL: &str = "card number|หมายเลขบัตร";
pub const CARD_HOLDER_LABEL: &str = "name on card|ชื่อผู้ถือ";

/// One planned fill: a label pattern and the value that goes into the
/// matching input. Constructed per run, no identity beyond its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIntent {
    pub pattern: &'static str,
    pub value: String,
}

impl FieldIntent {
    /// Build an intent, or `None` for an empty value. An unset profile field
    /// must never reach the page: filling "" would clobber pre-filled
    /// defaults, so the skip happens before any remote call exists.
    pub fn new(pattern: &'static str, value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self {
            pattern,
            value: value.to_string(),
        })
    }

    /// Argument object for the in-page fill function.
    pub fn fill_arg(&self) -> Value {
        json!({ "labelRegex": self.pattern, "value": self.value })
    }
}

/// The email intent, filled on the contact step before the first advance.
pub fn email_intent(guest: &GuestProfile) -> Option<FieldIntent> {
    FieldIntent::new(EMAIL_LABEL, &guest.email)
}

/// Guest-detail intents for the guest-info step, in fill order.
pub fn guest_info_intents(guest: &GuestProfile) -> Vec<FieldIntent> {
    [
        (FIRST_NAME_LABEL, guest.first.as_str()),
        (LAST_NAME_LABEL, guest.last.as_str()),
        (PHONE_LABEL, guest.phone.as_str()),
        (ADDRESS_LABEL, guest.address.as_str()),
        (CITY_LABEL, guest.city.as_str()),
    ]
    .into_iter()
    .filter_map(|(pattern, value)| FieldIntent::new(pattern, value))
    .collect()
}

/// Card intents tried against top-level page labels before any iframe work;
/// some providers render card fields directly in the page.
pub fn card_label_intents(card: &CardProfile) -> Vec<FieldIntent> {
    [
        (CARD_NUMBER_LABEL, card.number.as_str()),
        (CARD_HOLDER_LABEL, card.holder.as_str()),
    ]
    .into_iter()
    .filter_map(|(pattern, value)| FieldIntent::new(pattern, value))
    .collect()
}
