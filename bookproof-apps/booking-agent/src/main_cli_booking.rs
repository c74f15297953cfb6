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
//!
//! # Examples
//!
//! ## Run a booking (config from environment / .env)
//!
//! ```bash
//! BOOKING_URL="https://hotel.example/rooms/42" GUEST_EMAIL="a@b.com" bookproof-book
//! ```
//!
//! ## Show the fill plan without touching a browser
//!
//! ```bash
//! bookproof-book --dry-run
//! ```
//!
//! ## Headless run with a custom proof location
//!
//! ```bash
//! bookproof-book --headless --output-dir /tmp/proofs --filename stay.pdf
//! ```
//!
//! # Output
//!
//! The run either completes, with the PDF proof in the output directory
//! and `done` printed, or aborts with the underlying fatal step error.

use anyhow::Result;
use clap::Parser;
use bookproof_booking_agent::{
    BookingConfig, CheckoutFlow, McpPlaywrightChannel, card_label_intents, email_intent,
    guest_info_intents,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookproof-book")]
#[command(version = "0.1.0")]
#[command(about = "Fill and submit a hotel-booking form, saving a PDF proof")]
struct Args {
    #[arg(short = 'u', long, help = "Override BOOKING_URL from the environment")]
    url: Option<String>,
    #[arg(short = 'o', long, help = "Directory for the PDF proof (default: cwd)")]
    output_dir: Option<PathBuf>,
    #[arg(short = 'f', long, help = "Proof filename")]
    filename: Option<String>,
    #[arg(long, help = "Run the browser headless")]
    headless: bool,
    #[arg(long, help = "Print the fill plan without any remote calls")]
    dry_run: bool,
}

fn print_plan(config: &BookingConfig) {
    println!("\n📋 Booking plan");
    println!("===============");
    println!("URL: {}", config.booking_url);
    if let Some(intent) = email_intent(&config.guest) {
        println!("Contact: /{}/ = {}", intent.pattern, intent.value);
    }
    for intent in guest_info_intents(&config.guest) {
        println!("Guest:   /{}/ = {}", intent.pattern, intent.value);
    }
    if config.card.payment_ready() {
        for intent in card_label_intents(&config.card) {
            // never echo raw card data
            let shown = if intent.value == config.card.number {
                config.card.masked_number()
            } else {
                intent.value.clone()
            };
            println!("Card:    /{}/ = {}", intent.pattern, shown);
        }
        println!("Payment step: enabled");
    } else {
        println!("Payment step: skipped (card fields incomplete)");
    }
    println!(
        "Proof: {}",
        config.output_dir.join(&config.proof_filename).display()
    );
    println!("===============");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();

    // .env is optional; real environment variables win either way.
    let _ = dotenvy::dotenv();

    let mut config = BookingConfig::from_env_with_url(args.url)?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(filename) = args.filename {
        config.proof_filename = filename;
    }
    if args.headless {
        config.headed = false;
    }

    print_plan(&config);

    if args.dry_run {
        return Ok(());
    }

    let channel = McpPlaywrightChannel::spawn(&config.runner).await?;
    let result = {
        let flow = CheckoutFlow::new(&channel, config);
        flow.run().await
    };
    // Always release the browser session, fatal step or not.
    channel.shutdown().await;

    match result {
        Ok(report) => {
            tracing::info!(
                "Checkout finished: {} states, payment {}",
                report.visited.len(),
                if report.payment_attempted {
                    "attempted"
                } else {
                    "skipped"
                }
            );
            println!("Proof: {}", report.proof_path.display());
            println!("done");
            Ok(())
        }
        Err(e) => {
            eprintln!("Booking run failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
