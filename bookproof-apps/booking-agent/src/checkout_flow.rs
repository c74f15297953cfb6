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

//! # Checkout Flow
//!
//! The step sequencer: a strictly linear state machine driving the booking
//! checkout from navigation to the PDF proof. Each step re-derives what it
//! needs from the page, so any step is safe to retry; the only state carried
//! across steps is the immutable configuration.

use crate::automation::{ActionOutcome, AutomationChannel};
use crate::click_heuristic::ClickOutcome;
use crate::config::BookingConfig;
use crate::label_matcher::{self, FieldIntent};
use crate::page_scripts;
use crate::payment_frames;
use anyhow::{Context, Result};
use bookproof_action_queues::ActionQueue;
use std::path::PathBuf;

/// States of the checkout pipeline, in order. `PaymentAttempted` is entered
/// only when all four required card fields are configured; every other
/// transition is unconditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Start,
    Navigated,
    ReservePromptClicked,
    EmailFilled,
    AdvancedPastContact,
    GuestInfoFilled,
    AdvancedPastGuestInfo,
    PaymentAttempted,
    ProofExported,
    Done,
}

/// What a completed run did, for callers and tests.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
    pub visited: Vec<CheckoutState>,
    pub payment_attempted: bool,
    pub proof_path: PathBuf,
}

/// Drives one booking run over an [`AutomationChannel`].
///
/// Failure split per step kind:
/// - navigation, advance clicks, and proof export are structurally required:
///   retry exhaustion aborts the run;
/// - field fills and frame snapshots degrade to warnings: a page variant
///   without some field must not lose the booking.
pub struct CheckoutFlow<C> {
    channel: C,
    config: BookingConfig,
    queue: ActionQueue,
}

impl<C: AutomationChannel> CheckoutFlow<C> {
    pub fn new(channel: C, config: BookingConfig) -> Self {
        Self::with_queue(channel, config, ActionQueue::default())
    }

    pub fn with_queue(channel: C, config: BookingConfig, queue: ActionQueue) -> Self {
        Self {
            channel,
            config,
            queue,
        }
    }

    /// Run the whole pipeline. Returns the visited states; errors only on a
    /// Fatal-Step (required call with retries exhausted).
    pub async fn run(&self) -> Result<CheckoutReport> {
        let mut visited = vec![CheckoutState::Start];
        let mut advance = |state: CheckoutState, visited: &mut Vec<CheckoutState>| {
            tracing::info!("Checkout step: {state:?}");
            visited.push(state);
        };

        self.navigate().await?;
        advance(CheckoutState::Navigated, &mut visited);

        self.click_primary("reserve prompt").await?;
        advance(CheckoutState::ReservePromptClicked, &mut visited);

        if let Some(intent) = label_matcher::email_intent(&self.config.guest) {
            self.fill_optional(&intent).await;
        }
        advance(CheckoutState::EmailFilled, &mut visited);

        self.click_primary("contact step advance").await?;
        advance(CheckoutState::AdvancedPastContact, &mut visited);

        for intent in label_matcher::guest_info_intents(&self.config.guest) {
            self.fill_optional(&intent).await;
        }
        advance(CheckoutState::GuestInfoFilled, &mut visited);

        self.click_primary("guest-info step advance").await?;
        advance(CheckoutState::AdvancedPastGuestInfo, &mut visited);

        let payment_attempted = self.config.card.payment_ready();
        if payment_attempted {
            self.attempt_payment().await?;
            advance(CheckoutState::PaymentAttempted, &mut visited);
        } else {
            tracing::info!("Card fields incomplete; skipping payment step");
        }

        let proof_path = self.export_proof().await?;
        advance(CheckoutState::ProofExported, &mut visited);
        advance(CheckoutState::Done, &mut visited);

        Ok(CheckoutReport {
            visited,
            payment_attempted,
            proof_path,
        })
    }

    async fn navigate(&self) -> Result<ActionOutcome> {
        let channel = &self.channel;
        let url = &self.config.booking_url;
        let (w, h, headed) = (
            self.config.viewport_width,
            self.config.viewport_height,
            self.config.headed,
        );
        self.queue
            .with_retry(|| async move { channel.navigate(url, w, h, headed).await })
            .await
            .with_context(|| format!("Navigation to {url} failed"))
    }

    /// Fire the primary-action click heuristic. The click call itself is
    /// required; a `not-found` outcome is not. Some page variants have no
    /// advance button at this point, and the flow proceeds.
    async fn click_primary(&self, step: &str) -> Result<ClickOutcome> {
        let channel = &self.channel;
        let outcome = self
            .queue
            .with_retry(|| async move {
                channel
                    .evaluate(page_scripts::JS_CLICK_PRIMARY_ACTION, None)
                    .await
            })
            .await
            .with_context(|| format!("Primary-action click failed at: {step}"))?;

        let click = ClickOutcome::from_raw(outcome.first_text());
        if click.is_click() {
            tracing::info!("{step}: {click}");
        } else {
            tracing::info!("{step}: no matching button, proceeding");
        }
        Ok(click)
    }

    /// Fill one labeled field. Retry exhaustion here only costs the field,
    /// never the run.
    async fn fill_optional(&self, intent: &FieldIntent) {
        let channel = &self.channel;
        let script = page_scripts::fill_by_label_script();
        let script = script.as_str();
        let result = self
            .queue
            .with_retry(|| {
                let arg = intent.fill_arg();
                async move { channel.evaluate(script, Some(arg)).await }
            })
            .await;

        match result {
            Ok(outcome) => {
                let matched = outcome
                    .first_text()
                    .map(|t| t.contains("true"))
                    .unwrap_or(false);
                tracing::debug!(
                    "Fill /{}/: {}",
                    intent.pattern,
                    if matched { "matched" } else { "no matching field" }
                );
            }
            Err(e) => {
                tracing::warn!("Abandoning fill /{}/ after retries: {e}", intent.pattern);
            }
        }
    }

    /// The conditional payment branch: top-level card labels first (some
    /// providers skip the iframe), then every classified PSP iframe, then
    /// the final advance click.
    async fn attempt_payment(&self) -> Result<()> {
        for intent in label_matcher::card_label_intents(&self.config.card) {
            self.fill_optional(&intent).await;
        }

        for frame in self.snapshot_payment_frames().await {
            tracing::info!("Payment iframe candidate: {} ({})", frame.name, frame.src);
            for fill in payment_frames::frame_fill_plan(&frame, &self.config.card) {
                self.frame_fill_optional(&fill).await;
            }
        }

        self.click_primary("payment step advance").await?;
        Ok(())
    }

    /// Fresh iframe snapshot, classified down to PSP candidates. A failed or
    /// malformed snapshot means no candidates, not a dead run.
    async fn snapshot_payment_frames(&self) -> Vec<payment_frames::IframeDescriptor> {
        let channel = &self.channel;
        let result = self
            .queue
            .with_retry(|| async move {
                channel
                    .evaluate(page_scripts::JS_SNAPSHOT_IFRAMES, None)
                    .await
            })
            .await;

        let frames = match result {
            Ok(outcome) => match outcome.first_text() {
                Some(text) => payment_frames::parse_snapshot(text),
                None => {
                    tracing::warn!("Iframe snapshot returned no text payload");
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!("Iframe snapshot failed after retries: {e}");
                Vec::new()
            }
        };
        payment_frames::payment_candidates(frames)
    }

    async fn frame_fill_optional(&self, fill: &payment_frames::FrameFill) {
        let channel = &self.channel;
        let result = self
            .queue
            .with_retry(|| async move {
                channel
                    .fill_in_frame(&fill.frame_selector, fill.css_selector, &fill.value)
                    .await
            })
            .await;
        if let Err(e) = result {
            tracing::warn!(
                "Abandoning frame fill {} in {} after retries: {e}",
                fill.css_selector,
                fill.frame_selector
            );
        }
    }

    async fn export_proof(&self) -> Result<PathBuf> {
        let channel = &self.channel;
        let dir = &self.config.output_dir;
        let filename = &self.config.proof_filename;
        self.queue
            .with_retry(|| async move { channel.export_pdf(dir, filename).await })
            .await
            .context("Proof export failed")?;

        let path = dir.join(filename);
        tracing::info!("Proof exported to {}", path.display());
        Ok(path)
    }
}
