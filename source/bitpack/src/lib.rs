//! Packed-bit SIMD memory layer.
//!
//! `Bitword` is a fixed-width register of bits, `BitVector` a growable
//! sequence of them, and `BitTable` a rectangular matrix supporting
//! cache-oblivious transpose. Everything above this crate — the gate
//! table, the circuit representation, the frame simulator and the
//! error analyzer — is built on these three types.

mod table;
mod vector;
mod word;

pub use table::BitTable;
pub use vector::{BitVector, BitVectorView, BitVectorViewMut};
pub use word::{Bitword, LANES, WORD_BITS};
