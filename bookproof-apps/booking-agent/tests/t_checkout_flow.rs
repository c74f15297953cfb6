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

//! Checkout flow integration tests against a recording mock channel.

use anyhow::Result;
use bookproof_booking_agent::page_scripts::{JS_CLICK_PRIMARY_ACTION, JS_SNAPSHOT_IFRAMES};
use bookproof_booking_agent::{
    ActionOutcome, AutomationChannel, BookingConfig, CardProfile, CheckoutFlow, CheckoutState,
    GuestProfile, RunnerConfig,
};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Navigate { url: String },
    Click,
    Fill { pattern: String, value: String },
    Snapshot,
    FrameFill { frame: String, selector: String, value: String },
    ExportPdf { filename: String },
}

/// Records every remote call and answers from canned responses.
#[derive(Default)]
struct MockChannel {
    calls: RefCell<Vec<Call>>,
    click_text: RefCell<String>,
    snapshot_json: RefCell<String>,
    navigate_failures: Cell<u32>,
    click_failures: Cell<u32>,
    fill_failures: Cell<u32>,
}

impl MockChannel {
    fn new() -> Self {
        let mock = Self::default();
        *mock.click_text.borrow_mut() = "clicked".to_string();
        *mock.snapshot_json.borrow_mut() = "[]".to_string();
        mock
    }

    fn text_outcome(text: &str) -> ActionOutcome {
        ActionOutcome::new(json!({
            "content": [{"type": "text", "text": text}],
            "isError": false,
        }))
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl AutomationChannel for MockChannel {
    async fn navigate(
        &self,
        url: &str,
        _width: u32,
        _height: u32,
        _headed: bool,
    ) -> Result<ActionOutcome> {
        self.calls.borrow_mut().push(Call::Navigate { url: url.into() });
        if self.navigate_failures.get() > 0 {
            self.navigate_failures.set(self.navigate_failures.get() - 1);
            anyhow::bail!("browser not ready yet");
        }
        Ok(Self::text_outcome("Navigated"))
    }

    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<ActionOutcome> {
        if script == JS_CLICK_PRIMARY_ACTION {
            self.calls.borrow_mut().push(Call::Click);
            if self.click_failures.get() > 0 {
                self.click_failures.set(self.click_failures.get() - 1);
                anyhow::bail!("evaluate blew up mid-click");
            }
            return Ok(Self::text_outcome(&self.click_text.borrow()));
        }
        if script == JS_SNAPSHOT_IFRAMES {
            self.calls.borrow_mut().push(Call::Snapshot);
            return Ok(Self::text_outcome(&self.snapshot_json.borrow()));
        }
        let arg = arg.expect("fill scripts always carry an argument");
        self.calls.borrow_mut().push(Call::Fill {
            pattern: arg["labelRegex"].as_str().unwrap_or_default().into(),
            value: arg["value"].as_str().unwrap_or_default().into(),
        });
        if self.fill_failures.get() > 0 {
            self.fill_failures.set(self.fill_failures.get() - 1);
            anyhow::bail!("evaluate blew up mid-fill");
        }
        Ok(Self::text_outcome("true"))
    }

    async fn fill_in_frame(
        &self,
        iframe_selector: &str,
        css_selector: &str,
        value: &str,
    ) -> Result<ActionOutcome> {
        self.calls.borrow_mut().push(Call::FrameFill {
            frame: iframe_selector.into(),
            selector: css_selector.into(),
            value: value.into(),
        });
        Ok(Self::text_outcome("Filled"))
    }

    async fn export_pdf(&self, _output_dir: &Path, filename: &str) -> Result<ActionOutcome> {
        self.calls.borrow_mut().push(Call::ExportPdf {
            filename: filename.into(),
        });
        Ok(Self::text_outcome("Saved"))
    }
}

fn config_with(guest: GuestProfile, card: CardProfile) -> BookingConfig {
    BookingConfig {
        booking_url: "https://hotel.example/book".into(),
        guest,
        card,
        runner: RunnerConfig {
            command: "unused".into(),
            args: Vec::new(),
        },
        viewport_width: 1280,
        viewport_height: 900,
        headed: false,
        output_dir: PathBuf::from("/tmp"),
        proof_filename: "booking-confirmation.pdf".into(),
    }
}

fn spec_guest() -> GuestProfile {
    GuestProfile {
        email: "a@b.com".into(),
        first: "A".into(),
        last: "B".into(),
        phone: String::new(),
        address: String::new(),
        city: String::new(),
        country: "TH".into(),
    }
}

fn full_card() -> CardProfile {
    CardProfile {
        number: "4242424242424242".into(),
        exp_month: "09".into(),
        exp_year: "2027".into(),
        cvv: "123".into(),
        holder: "A B".into(),
    }
}

#[tokio::test]
async fn run_without_card_skips_payment_entirely() {
    let mock = MockChannel::new();
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let report = flow.run().await.expect("flow completes");

    assert!(!report.payment_attempted);
    assert_eq!(
        report.visited,
        vec![
            CheckoutState::Start,
            CheckoutState::Navigated,
            CheckoutState::ReservePromptClicked,
            CheckoutState::EmailFilled,
            CheckoutState::AdvancedPastContact,
            CheckoutState::GuestInfoFilled,
            CheckoutState::AdvancedPastGuestInfo,
            CheckoutState::ProofExported,
            CheckoutState::Done,
        ],
        "payment state never entered"
    );

    assert_eq!(mock.count(|c| matches!(c, Call::Navigate { .. })), 1);
    assert_eq!(mock.count(|c| matches!(c, Call::Click)), 3);
    assert_eq!(mock.count(|c| matches!(c, Call::Snapshot)), 0);
    assert_eq!(mock.count(|c| matches!(c, Call::FrameFill { .. })), 0);
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 1);

    // Only the three non-empty guest fields produce fills; phone, address,
    // and city never reach the channel.
    let fills: Vec<Call> = mock
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Fill { .. }))
        .collect();
    assert_eq!(fills.len(), 3);
    assert!(matches!(&fills[0], Call::Fill { value, .. } if value == "a@b.com"));
    assert!(matches!(&fills[1], Call::Fill { value, .. } if value == "A"));
    assert!(matches!(&fills[2], Call::Fill { value, .. } if value == "B"));
}

#[tokio::test]
async fn empty_guest_profile_sends_no_fill_calls() {
    let mock = MockChannel::new();
    let guest = GuestProfile {
        country: "TH".into(), // country is never a fill intent anyway
        ..Default::default()
    };
    let flow = CheckoutFlow::new(&mock, config_with(guest, CardProfile::default()));

    flow.run().await.expect("flow completes");

    assert_eq!(mock.count(|c| matches!(c, Call::Fill { .. })), 0);
}

#[tokio::test]
async fn not_found_click_outcome_still_advances() {
    let mock = MockChannel::new();
    *mock.click_text.borrow_mut() = "not-found".to_string();
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let report = flow.run().await.expect("not-found is not an error");

    assert_eq!(*report.visited.last().unwrap(), CheckoutState::Done);
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 1);
}

#[tokio::test]
async fn payment_branch_fills_named_psp_iframe_three_times() {
    let mock = MockChannel::new();
    *mock.snapshot_json.borrow_mut() = json!([
        {"i": 0, "name": "", "src": "https://maps.example/embed"},
        {"i": 1, "name": "psp-frame", "src": "https://js.STRIPE.com/v3/elements"},
    ])
    .to_string();
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), full_card()));

    let report = flow.run().await.expect("flow completes");

    assert!(report.payment_attempted);
    assert!(report.visited.contains(&CheckoutState::PaymentAttempted));

    assert_eq!(mock.count(|c| matches!(c, Call::Snapshot)), 1);
    // Payment adds a fourth advance click after the card fills.
    assert_eq!(mock.count(|c| matches!(c, Call::Click)), 4);

    let frame_fills: Vec<Call> = mock
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::FrameFill { .. }))
        .collect();
    assert_eq!(frame_fills.len(), 3, "number, expiry, cvv");
    for call in &frame_fills {
        assert!(
            matches!(call, Call::FrameFill { frame, .. } if frame == "iframe[name='psp-frame']")
        );
    }
    assert!(
        matches!(&frame_fills[1], Call::FrameFill { value, .. } if value == "09/27"),
        "expiry is MM/YY from the last two year digits"
    );

    // Top-level label fills for card number and holder were also tried.
    assert!(mock.calls().iter().any(
        |c| matches!(c, Call::Fill { value, .. } if value == "4242424242424242")
    ));
}

#[tokio::test]
async fn unnamed_payment_iframe_is_silently_skipped() {
    let mock = MockChannel::new();
    *mock.snapshot_json.borrow_mut() = json!([
        {"i": 0, "name": "", "src": "https://checkout.adyen.com/session"},
    ])
    .to_string();
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), full_card()));

    let report = flow.run().await.expect("flow completes");

    assert!(report.payment_attempted);
    assert_eq!(mock.count(|c| matches!(c, Call::FrameFill { .. })), 0);
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_recovers_within_the_attempt_cap() {
    let mock = MockChannel::new();
    mock.navigate_failures.set(4);
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let report = flow.run().await.expect("5th attempt succeeds");

    assert_eq!(mock.count(|c| matches!(c, Call::Navigate { .. })), 5);
    assert_eq!(*report.visited.last().unwrap(), CheckoutState::Done);
}

#[tokio::test(start_paused = true)]
async fn fill_exhaustion_degrades_and_proof_still_exports() {
    let mock = MockChannel::new();
    mock.fill_failures.set(u32::MAX);
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let report = flow.run().await.expect("fills are optional steps");

    assert_eq!(*report.visited.last().unwrap(), CheckoutState::Done);
    // Each of the three configured guest fields burns the full attempt cap.
    assert_eq!(mock.count(|c| matches!(c, Call::Fill { .. })), 15);
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 1);
}

#[tokio::test(start_paused = true)]
async fn advance_click_exhaustion_is_fatal() {
    let mock = MockChannel::new();
    mock.click_failures.set(u32::MAX);
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let err = flow.run().await.expect_err("advance clicks are required");

    assert_eq!(mock.count(|c| matches!(c, Call::Click)), 5);
    assert!(format!("{err:#}").contains("Primary-action click"));
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 0);
}

#[tokio::test(start_paused = true)]
async fn navigation_exhaustion_is_fatal() {
    let mock = MockChannel::new();
    mock.navigate_failures.set(u32::MAX);
    let flow = CheckoutFlow::new(&mock, config_with(spec_guest(), CardProfile::default()));

    let err = flow.run().await.expect_err("required step exhausted");

    assert_eq!(mock.count(|c| matches!(c, Call::Navigate { .. })), 5);
    assert!(format!("{err:#}").contains("Navigation"));
    // Nothing past navigation ran.
    assert_eq!(mock.count(|c| matches!(c, Call::Click)), 0);
    assert_eq!(mock.count(|c| matches!(c, Call::ExportPdf { .. })), 0);
}
