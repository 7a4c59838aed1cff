//! Per-gate Pauli-frame conjugation rules.
//!
//! `gate_data::registry` deliberately carries no callback slots (see its
//! module doc comment) to avoid a cyclic crate dependency, so this
//! module builds its own `[GateId::COUNT]`-sized dispatch arrays keyed
//! by [`GateId`], built once behind a [`OnceLock`] the same way
//! `gate_data::registry` builds its name table.
//!
//! Single-qubit gates are modeled as a permutation of the `(x, z)` bit
//! pair; two-qubit gates as a permutation of `(xa, za, xb, zb)`. Both
//! operate on whole rows (one bit per shot) at once rather than bit by
//! bit, which is what lets [`crate::simulator::FrameSimulator`] apply a
//! gate to an entire batch with one xor per row.

use std::sync::OnceLock;

use bitpack::BitVector;
use gate_data::GateId;

pub type SingleQubitFrameFn = fn(BitVector, BitVector) -> (BitVector, BitVector);
pub type TwoQubitFrameFn = fn(BitVector, BitVector, BitVector, BitVector) -> (BitVector, BitVector, BitVector, BitVector);

fn perm_identity(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    (x, z)
}

fn perm_swap_xz(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    (z, x)
}

fn perm_swap_xy(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    let mut new_z = x.clone();
    new_z.xor_assign(&z);
    (x, new_z)
}

fn perm_swap_yz(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    let mut new_x = x.clone();
    new_x.xor_assign(&z);
    (new_x, z)
}

fn conj_noop(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    (x, z)
}

fn conj_h(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    perm_swap_xz(x, z)
}

fn conj_hxy(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    perm_swap_xy(x, z)
}

fn conj_hyz(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    perm_swap_yz(x, z)
}

/// `(x, z) -> (x^z, x)`.
fn conj_cxyz(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    let mut new_x = x.clone();
    new_x.xor_assign(&z);
    (new_x, x)
}

/// `(x, z) -> (z, x^z)`.
fn conj_czyx(x: BitVector, z: BitVector) -> (BitVector, BitVector) {
    let mut new_z = x.clone();
    new_z.xor_assign(&z);
    (z, new_z)
}

fn single_qubit_table() -> &'static [Option<SingleQubitFrameFn>; GateId::COUNT] {
    static TABLE: OnceLock<[Option<SingleQubitFrameFn>; GateId::COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t: [Option<SingleQubitFrameFn>; GateId::COUNT] = [None; GateId::COUNT];
        t[GateId::I.index()] = Some(conj_noop);
        t[GateId::X.index()] = Some(conj_noop);
        t[GateId::Y.index()] = Some(conj_noop);
        t[GateId::Z.index()] = Some(conj_noop);
        t[GateId::H.index()] = Some(conj_h);
        t[GateId::HXY.index()] = Some(conj_hxy);
        t[GateId::HYZ.index()] = Some(conj_hyz);
        t[GateId::CXYZ.index()] = Some(conj_cxyz);
        t[GateId::CZYX.index()] = Some(conj_czyx);
        t
    })
}

/// Looks up and applies the single-qubit conjugation rule for `id`,
/// returning `None` if `id` does not name a single-qubit unitary.
#[must_use]
pub fn apply_single_qubit(id: GateId, x: BitVector, z: BitVector) -> Option<(BitVector, BitVector)> {
    single_qubit_table()[id.index()].map(|f| f(x, z))
}

/// `(xb^=xa; za^=zb)`, the standard CX/CNOT conjugation, evaluated from
/// each operand's original value.
fn cx_core(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    let mut xb = xb;
    xb.xor_assign(&xa);
    let mut za = za;
    za.xor_assign(&zb);
    (xa, za, xb, zb)
}

/// The generic "controlled-P with Q-type control" sandwich: permute
/// each qubit's basis so the control reads as Z and the target as X,
/// apply the standard CX rule, then undo the permutation (every `perm`
/// used here is its own inverse).
fn sandwich(
    xa: BitVector,
    za: BitVector,
    xb: BitVector,
    zb: BitVector,
    q_perm: SingleQubitFrameFn,
    p_perm: SingleQubitFrameFn,
) -> (BitVector, BitVector, BitVector, BitVector) {
    let (xa, za) = q_perm(xa, za);
    let (xb, zb) = p_perm(xb, zb);
    let (xa, za, xb, zb) = cx_core(xa, za, xb, zb);
    let (xa, za) = q_perm(xa, za);
    let (xb, zb) = p_perm(xb, zb);
    (xa, za, xb, zb)
}

fn conj_cx(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_identity, perm_identity)
}

fn conj_cy(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_identity, perm_swap_xy)
}

fn conj_cz(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_identity, perm_swap_xz)
}

fn conj_xcx(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_identity)
}

fn conj_xcy(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_swap_xy)
}

fn conj_xcz(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_swap_xz)
}

fn conj_ycx(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_yz, perm_identity)
}

fn conj_ycy(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_yz, perm_swap_xy)
}

fn conj_ycz(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    sandwich(xa, za, xb, zb, perm_swap_yz, perm_swap_xz)
}

fn conj_swap(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    (xb, zb, xa, za)
}

/// ISWAP and ISWAP_DAG share the same bit-level conjugation rule: the
/// global phase they differ by has no effect on a Pauli frame.
fn conj_iswap(xa: BitVector, za: BitVector, xb: BitVector, zb: BitVector) -> (BitVector, BitVector, BitVector, BitVector) {
    let mut new_za = xa.clone();
    new_za.xor_assign(&xb);
    new_za.xor_assign(&zb);
    let mut new_zb = xa.clone();
    new_zb.xor_assign(&za);
    new_zb.xor_assign(&xb);
    (xb, new_za, xa, new_zb)
}

fn two_qubit_table() -> &'static [Option<TwoQubitFrameFn>; GateId::COUNT] {
    static TABLE: OnceLock<[Option<TwoQubitFrameFn>; GateId::COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t: [Option<TwoQubitFrameFn>; GateId::COUNT] = [None; GateId::COUNT];
        t[GateId::Swap.index()] = Some(conj_swap);
        t[GateId::ISwap.index()] = Some(conj_iswap);
        t[GateId::ISwapDag.index()] = Some(conj_iswap);
        t[GateId::CX.index()] = Some(conj_cx);
        t[GateId::CY.index()] = Some(conj_cy);
        t[GateId::CZ.index()] = Some(conj_cz);
        t[GateId::XCX.index()] = Some(conj_xcx);
        t[GateId::XCY.index()] = Some(conj_xcy);
        t[GateId::XCZ.index()] = Some(conj_xcz);
        t[GateId::YCX.index()] = Some(conj_ycx);
        t[GateId::YCY.index()] = Some(conj_ycy);
        t[GateId::YCZ.index()] = Some(conj_ycz);
        t
    })
}

/// Looks up and applies the two-qubit conjugation rule for `id`,
/// returning `None` if `id` does not name a two-qubit unitary.
#[must_use]
pub fn apply_two_qubit(
    id: GateId,
    xa: BitVector,
    za: BitVector,
    xb: BitVector,
    zb: BitVector,
) -> Option<(BitVector, BitVector, BitVector, BitVector)> {
    two_qubit_table()[id.index()].map(|f| f(xa, za, xb, zb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(bits: &[bool]) -> BitVector {
        let mut v = BitVector::zeros(bits.len());
        for (i, &b) in bits.iter().enumerate() {
            v.set(i, b);
        }
        v
    }

    #[test]
    fn h_swaps_x_and_z() {
        let (x, z) = apply_single_qubit(GateId::H, bv(&[true, false]), bv(&[false, true])).unwrap();
        assert_eq!(x, bv(&[false, true]));
        assert_eq!(z, bv(&[true, false]));
    }

    #[test]
    fn cx_propagates_x_forward_and_z_backward() {
        let (xa, za, xb, zb) = apply_two_qubit(GateId::CX, bv(&[true]), bv(&[false]), bv(&[false]), bv(&[true])).unwrap();
        assert_eq!(xa, bv(&[true]));
        assert_eq!(xb, bv(&[true]), "an X error on the control propagates to the target");
        assert_eq!(za, bv(&[true]), "a Z error on the target propagates back to the control");
        assert_eq!(zb, bv(&[true]));
    }

    #[test]
    fn swap_exchanges_both_rows() {
        let (xa, za, xb, zb) = apply_two_qubit(GateId::Swap, bv(&[true]), bv(&[false]), bv(&[false]), bv(&[true])).unwrap();
        assert_eq!((xa, za, xb, zb), (bv(&[false]), bv(&[true]), bv(&[true]), bv(&[false])));
    }

    #[test]
    fn iswap_is_involution_on_the_identity_frame() {
        let zero = bv(&[false, false]);
        let (xa, za, xb, zb) =
            apply_two_qubit(GateId::ISwap, zero.clone(), zero.clone(), zero.clone(), zero.clone()).unwrap();
        assert_eq!((xa, za, xb, zb), (zero.clone(), zero.clone(), zero.clone(), zero));
    }

    #[test]
    fn unitary_tables_cover_every_unitary_gate() {
        for id in [
            GateId::I,
            GateId::X,
            GateId::Y,
            GateId::Z,
            GateId::H,
            GateId::HXY,
            GateId::HYZ,
            GateId::CXYZ,
            GateId::CZYX,
        ] {
            assert!(apply_single_qubit(id, bv(&[false]), bv(&[false])).is_some());
        }
        for id in [
            GateId::Swap,
            GateId::ISwap,
            GateId::ISwapDag,
            GateId::CX,
            GateId::CY,
            GateId::CZ,
            GateId::XCX,
            GateId::XCY,
            GateId::XCZ,
            GateId::YCX,
            GateId::YCY,
            GateId::YCZ,
        ] {
            assert!(apply_two_qubit(id, bv(&[false]), bv(&[false]), bv(&[false]), bv(&[false])).is_some());
        }
    }
}
