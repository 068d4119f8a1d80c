//! # Lottery Server Library
//!
//! Server side of a two-party lottery game. Clients pay a fee and guess a
//! two-byte pair; the server checks the guess against its supply of hidden
//! winning pairs and keeps an accumulating jackpot.
//!
//! ## Game Rules
//!
//! - A miss adds the fee to the jackpot.
//! - A match while a jackpot is pending pays out the jackpot plus the fee
//!   and resets the jackpot to zero.
//! - A match with nothing accumulated seeds the jackpot with the fee and
//!   grants a free bonus guess on the same connection. The bonus round is
//!   the only way to cash out a jackpot seeded that way.
//!
//! ## Module Organization
//!
//! ### Supply Module (`supply`)
//! Winning pair strategies behind the `PairSupply` trait:
//! - `RingSupply`: round-robin byte buffer refreshed on every read
//! - `ListSupply`: rotating queue of the pairs generated at start-up
//!
//! ### Game Module (`game`)
//! The jackpot state machine. One instance is shared by every connection
//! and is only touched under a single lock, one play at a time.
//!
//! ### Network Module (`network`)
//! Accept loop, fixed worker pool and the per-connection exchange:
//! - Bounded hand-off between the accept loop and the workers, so accepts
//!   stall while every worker is busy
//! - One absolute deadline per connection covering both rounds
//! - Graceful shutdown that lets in-flight connections finish
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::game::Game;
//! use server::network::{Server, ServerConfig};
//! use server::supply::{SupplyKind, DEFAULT_SUPPLY_LEN};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let supply = SupplyKind::Ring.build(DEFAULT_SUPPLY_LEN)?;
//!     let server = Server::bind(ServerConfig::default(), Game::new(supply)).await?;
//!
//!     server
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```
//!
//! Errors on one connection (malformed request, I/O failure, deadline,
//! random source failure) close that connection only; they never reach the
//! accept loop or the other workers.

pub mod game;
pub mod network;
pub mod supply;
