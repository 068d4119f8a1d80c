//! # Lottery Client Library
//!
//! Thin request generator for the lottery server. Each play opens one
//! connection, sends an initial request with a fresh id and a random guess,
//! and reads the verdict. If the server grants a bonus round, the client
//! sends a second request on the same connection with the same id, a zero
//! fee and a new random guess, then reads the final verdict.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use shared::{Protocol, ResponseKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("127.0.0.1:9876").with_protocol(Protocol::Plain);
//!     let resp = client.play(150).await?;
//!
//!     if resp.kind == ResponseKind::Win {
//!         println!("You won {}!", resp.jackpot);
//!     }
//!     Ok(())
//! }
//! ```

pub mod network;
