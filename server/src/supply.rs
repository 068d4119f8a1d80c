//! Winning pair supplies consulted by the game engine.
//!
//! Two strategies share the [`PairSupply`] contract:
//! - [`RingSupply`] walks a fixed byte buffer round-robin and overwrites
//!   each slot with fresh random bytes right after reading it.
//! - [`ListSupply`] rotates a queue of the pairs generated at start-up,
//!   re-queueing each popped pair at the back.
//!
//! Neither is internally synchronized; the engine's lock provides the
//! single-caller guarantee.

use rand::rngs::OsRng;
use rand::RngCore;
use shared::{Pair, PAIR_LEN};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Pairs held by a supply unless configured otherwise.
pub const DEFAULT_SUPPLY_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    #[error("random source failed while filling supply: {0}")]
    Source(#[source] rand::Error),

    /// The popped pair is handed back with the failure.
    #[error("random source failed while replenishing after {pair}: {source}")]
    Replenish {
        pair: Pair,
        #[source]
        source: rand::Error,
    },

    #[error("pair supply is empty")]
    Empty,
}

impl SupplyError {
    /// The pair read before the failure, if any.
    pub fn pair(&self) -> Option<Pair> {
        match self {
            SupplyError::Replenish { pair, .. } => Some(*pair),
            _ => None,
        }
    }
}

pub trait PairSupply: Send {
    fn pop(&mut self) -> Result<Pair, SupplyError>;
}

/// Contiguous buffer of `2 * len` random bytes read with a wrapping cursor.
pub struct RingSupply<R = OsRng> {
    data: Vec<u8>,
    cursor: usize,
    rng: R,
}

impl RingSupply<OsRng> {
    pub fn new(len: usize) -> Result<Self, SupplyError> {
        Self::with_rng(len, OsRng)
    }
}

impl<R: RngCore> RingSupply<R> {
    pub fn with_rng(len: usize, mut rng: R) -> Result<Self, SupplyError> {
        if len == 0 {
            return Err(SupplyError::Empty);
        }

        let mut data = vec![0u8; len * PAIR_LEN];
        rng.try_fill_bytes(&mut data).map_err(SupplyError::Source)?;

        Ok(Self {
            data,
            cursor: 0,
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len() / PAIR_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<R: RngCore + Send> PairSupply for RingSupply<R> {
    fn pop(&mut self) -> Result<Pair, SupplyError> {
        if self.cursor + PAIR_LEN > self.data.len() {
            self.cursor = 0;
        }

        let slot = &mut self.data[self.cursor..self.cursor + PAIR_LEN];
        let pair = Pair([slot[0], slot[1]]);

        // Cursor stays put when the slot could not be refreshed.
        self.rng
            .try_fill_bytes(slot)
            .map_err(|source| SupplyError::Replenish { pair, source })?;
        self.cursor += PAIR_LEN;

        Ok(pair)
    }
}

/// Queue of pairs rotated front-to-back on every pop.
pub struct ListSupply<R = OsRng> {
    pairs: VecDeque<Pair>,
    rng: R,
}

impl ListSupply<OsRng> {
    pub fn new(len: usize) -> Result<Self, SupplyError> {
        Self::with_rng(len, OsRng)
    }
}

impl<R: RngCore> ListSupply<R> {
    pub fn with_rng(len: usize, mut rng: R) -> Result<Self, SupplyError> {
        if len == 0 {
            return Err(SupplyError::Empty);
        }

        let pairs = (0..len)
            .map(|_| Pair::random(&mut rng))
            .collect::<Result<VecDeque<_>, _>>()
            .map_err(SupplyError::Source)?;

        Ok(Self { pairs, rng })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<R: RngCore + Send> PairSupply for ListSupply<R> {
    fn pop(&mut self) -> Result<Pair, SupplyError> {
        let pair = *self.pairs.front().ok_or(SupplyError::Empty)?;

        // The fresh pair is drawn but never queued: the popped pair itself
        // goes to the back. On failure the queue is left unrotated.
        let _fresh = Pair::random(&mut self.rng)
            .map_err(|source| SupplyError::Replenish { pair, source })?;

        self.pairs.rotate_left(1);
        Ok(pair)
    }
}

/// Selects the supply strategy at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupplyKind {
    Ring,
    #[default]
    List,
}

impl SupplyKind {
    pub fn build(self, len: usize) -> Result<Box<dyn PairSupply>, SupplyError> {
        let supply: Box<dyn PairSupply> = match self {
            SupplyKind::Ring => Box::new(RingSupply::new(len)?),
            SupplyKind::List => Box::new(ListSupply::new(len)?),
        };
        Ok(supply)
    }
}

impl FromStr for SupplyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ring" => Ok(SupplyKind::Ring),
            "list" | "stack" => Ok(SupplyKind::List),
            other => Err(format!(
                "invalid container \"{}\" (expected ring or list)",
                other
            )),
        }
    }
}

impl fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplyKind::Ring => f.write_str("ring"),
            SupplyKind::List => f.write_str("list"),
        }
    }
}
