//! Consistent hashing ring for deterministic key placement.
//!
//! This crate maps arbitrary keys onto a changing set of named nodes. Each
//! node sits at exactly one position on a `u32` ring, derived by hashing its
//! identifier. A key is owned by the first node at or after the key's own
//! position, wrapping back to the lowest node past the end of the ring, so
//! adding or removing a node only moves the keys adjacent to it.
//!
//! - [`Ring`] — thread-safe ring with add / remove / resolve.
//! - [`RingView`] — immutable copy of a ring for analysis and diffing.
//! - [`KeyHasher`] — the hash adaptor, with [`Crc32Hasher`] as the default
//!   and [`Blake3Hasher`] as an alternative.

mod error;
mod hasher;
mod index;
mod ring;


pub use error::RingError;
pub use hasher::{Blake3Hasher, Crc32Hasher, KeyHasher};
pub use ring::{Migration, NodeInfo, Ring, RingView};
