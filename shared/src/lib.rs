use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod binary;
pub mod error;
pub mod plain;
pub mod protocol;

pub use error::CodecError;
pub use protocol::Protocol;

pub const DEFAULT_PORT: u16 = 9876;
pub const PAIR_LEN: usize = 2;

/// A player's guess or a hidden winning combination: two raw bytes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair(pub [u8; PAIR_LEN]);

impl Pair {
    pub fn new(a: u8, b: u8) -> Self {
        Self([a, b])
    }

    /// Draws a pair from `rng`, failing only if the source does.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, rand::Error> {
        let mut bytes = [0u8; PAIR_LEN];
        rng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PAIR_LEN] {
        &self.0
    }
}

impl From<[u8; PAIR_LEN]> for Pair {
    fn from(bytes: [u8; PAIR_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0[0], self.0[1])
    }
}

/// One round of play sent by a client.
///
/// The `id` is generated once per connection and repeated unchanged in the
/// bonus round.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub id: Uuid,
    pub fee: u64,
    pub guess: Pair,
}

impl Request {
    pub fn new(id: Uuid, fee: u64, guess: Pair) -> Self {
        Self { id, fee, guess }
    }

    /// Builds the free follow-up round granted by a `Bonus` response.
    pub fn bonus_round(&self, guess: Pair) -> Self {
        Self {
            id: self.id,
            fee: 0,
            guess,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uuid: {} fee: {} guess: {}", self.id, self.fee, self.guess)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    NoWin,
    Win,
    Bonus,
}

impl ResponseKind {
    /// Token used by the plain text protocol.
    pub fn token(&self) -> &'static str {
        match self {
            ResponseKind::NoWin => "nowin",
            ResponseKind::Win => "win",
            ResponseKind::Bonus => "bonus",
        }
    }

    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"nowin" => Some(ResponseKind::NoWin),
            b"win" => Some(ResponseKind::Win),
            b"bonus" => Some(ResponseKind::Bonus),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Outcome of one round. `jackpot` carries the payout and is only
/// meaningful (and only transmitted) for `Win`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub kind: ResponseKind,
    pub jackpot: u64,
}

impl Response {
    pub fn no_win() -> Self {
        Self {
            kind: ResponseKind::NoWin,
            jackpot: 0,
        }
    }

    pub fn win(jackpot: u64) -> Self {
        Self {
            kind: ResponseKind::Win,
            jackpot,
        }
    }

    pub fn bonus() -> Self {
        Self {
            kind: ResponseKind::Bonus,
            jackpot: 0,
        }
    }

    pub fn is_bonus(&self) -> bool {
        self.kind == ResponseKind::Bonus
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ResponseKind::Win => write!(f, "{}: {}", self.kind, self.jackpot),
            _ => write!(f, "{}", self.kind),
        }
    }
}
