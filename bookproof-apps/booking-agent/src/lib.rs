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

// Library for bookproof-booking-agent
// Heuristic hotel-booking checkout automation over a Playwright MCP server

mod automation;
mod checkout_flow;
mod click_heuristic;
mod config;
mod label_matcher;
pub mod page_scripts;
mod payment_frames;

// Re-export the automation seam
pub use automation::{ActionOutcome, AutomationChannel};
#[cfg(feature = "mcp")]
pub use automation::McpPlaywrightChannel;

// Re-export the checkout flow
pub use checkout_flow::{CheckoutFlow, CheckoutReport, CheckoutState};

// Re-export the click heuristic outcome
pub use click_heuristic::ClickOutcome;

// Re-export configuration
pub use config::{
    BookingConfig, CardProfile, DEFAULT_PROOF_FILENAME, GuestProfile, RunnerConfig,
};

// Re-export the label matcher strategy tables
pub use label_matcher::{
    FieldIntent, card_label_intents, email_intent, guest_info_intents,
};

// Re-export the payment iframe resolver
pub use payment_frames::{
    FrameFill, IframeDescriptor, format_expiry, frame_fill_plan, parse_snapshot,
    payment_candidates,
};
