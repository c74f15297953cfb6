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

//! # Run Configuration
//!
//! Environment-sourced configuration for one booking run: the target URL,
//! the guest and card profiles, and the automation-server launch command.
//! Everything is read once at startup and stays immutable for the run.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;
pub const DEFAULT_PROOF_FILENAME: &str = "booking-confirmation.pdf";

const DEFAULT_RUNNER_CMD: &str = "npx";
const DEFAULT_RUNNER_ARGS: &str = "-y @executeautomation/playwright-mcp-server";

/// Guest contact details. An empty field means "leave the form field alone",
/// never an error.
#[derive(Debug, Clone, Default)]
pub struct GuestProfile {
    pub email: String,
    pub phone: String,
    pub first: String,
    pub last: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// Payment card details. The payment step runs only when `payment_ready()`.
#[derive(Clone, Default)]
pub struct CardProfile {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: String,
    pub holder: String,
}

impl CardProfile {
    /// All four structurally required fields are set. The holder name is
    /// optional; some providers do not ask for it.
    pub fn payment_ready(&self) -> bool {
        !self.number.is_empty()
            && !self.exp_month.is_empty()
            && !self.exp_year.is_empty()
            && !self.cvv.is_empty()
    }

    pub fn masked_number(&self) -> String {
        if self.number.len() <= 4 {
            return self.number.clone();
        }
        format!("****{}", &self.number[self.number.len() - 4..])
    }
}

// Card data must never end up in logs, so Debug shows only the masked form.
impl std::fmt::Debug for CardProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardProfile")
            .field("number", &self.masked_number())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvv", &"***")
            .field("holder", &self.holder)
            .finish()
    }
}

/// Launch command for the Playwright MCP server child process.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub booking_url: String,
    pub guest: GuestProfile,
    pub card: CardProfile,
    pub runner: RunnerConfig,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headed: bool,
    pub output_dir: PathBuf,
    pub proof_filename: String,
}

impl BookingConfig {
    /// Read the configuration from the process environment.
    ///
    /// A missing or blank `BOOKING_URL` is the single startup-fatal
    /// configuration error; every guest/card field is individually optional.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_url(None)
    }

    /// Same as [`from_env`](Self::from_env), with the booking URL taken from
    /// the override (CLI flag) when given.
    pub fn from_env_with_url(url_override: Option<String>) -> Result<Self> {
        Self::from_lookup(|key| {
            if key == "BOOKING_URL" {
                if let Some(url) = &url_override {
                    return Some(url.clone());
                }
            }
            std::env::var(key).ok()
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let booking_url = lookup("BOOKING_URL")
            .map(|u| u.trim().to_string())
            .unwrap_or_default();
        if booking_url.is_empty() {
            bail!("BOOKING_URL is not set - nothing to book");
        }

        let get = |key: &str| lookup(key).unwrap_or_default();
        let get_or = |key: &str, default: &str| {
            lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
        };

        let guest = GuestProfile {
            email: get("GUEST_EMAIL"),
            phone: get("GUEST_PHONE"),
            first: get("GUEST_FIRST_NAME"),
            last: get("GUEST_LAST_NAME"),
            address: get("GUEST_ADDRESS"),
            city: get("GUEST_CITY"),
            country: get_or("GUEST_COUNTRY", "TH"),
        };

        let card = CardProfile {
            number: get("CARD_NUMBER"),
            exp_month: get("CARD_EXP_MONTH"),
            exp_year: get("CARD_EXP_YEAR"),
            cvv: get("CARD_CVV"),
            holder: get("CARD_HOLDER"),
        };

        let cmd_tokens: Vec<String> = get_or("PLAYWRIGHT_MCP_CMD", DEFAULT_RUNNER_CMD)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let arg_tokens: Vec<String> = get_or("PLAYWRIGHT_MCP_ARGS", DEFAULT_RUNNER_ARGS)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let (command, leading) = cmd_tokens
            .split_first()
            .map(|(c, rest)| (c.clone(), rest.to_vec()))
            .context("PLAYWRIGHT_MCP_CMD is blank")?;
        let mut args = leading;
        args.extend(arg_tokens);

        Ok(Self {
            booking_url,
            guest,
            card,
            runner: RunnerConfig { command, args },
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            headed: true,
            output_dir: std::env::current_dir().context("Cannot resolve working directory")?,
            proof_filename: DEFAULT_PROOF_FILENAME.to_string(),
        })
    }
}
