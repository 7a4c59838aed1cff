//! Reverse Clifford-conjugation rules for the backward sensitivity walk.
//!
//! A measurement's detector is sensitive to a set of Pauli errors on the
//! measured qubits at the moment it is taken. Walking the circuit
//! backwards past a unitary pushes that sensitivity back to the moment
//! just before the gate: an error injected right before the gate has
//! the same downstream effect as its forward-conjugated image injected
//! right after, so the detectors it reaches are exactly those already
//! known to depend on that after-gate image. Sensitivity is therefore
//! the *adjoint* (matrix transpose, over GF(2)) of `frame_sim::dispatch`'s
//! forward conjugation, not the same map reapplied: e.g. `CX a b`
//! propagates frame bits forward as `xb ^= xa; za ^= zb`, but pushes
//! sensitivity backward as `xa ^= xb; zb ^= za` — the control's X
//! sensitivity absorbs the target's, mirroring how the target's Z
//! sensitivity absorbs the control's. This module's table structure
//! matches `frame_sim::dispatch`'s shape (same gates, same
//! single/two-qubit split) but its per-gate formulas are each that
//! gate's adjoint, operating on [`DemTargetSet`] pairs instead of
//! `BitVector` pairs.

use std::sync::OnceLock;

use gate_data::GateId;

use crate::target_set::DemTargetSet;

pub type SingleQubitSensitivityFn = fn(DemTargetSet, DemTargetSet) -> (DemTargetSet, DemTargetSet);
pub type TwoQubitSensitivityFn =
    fn(DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet);

fn perm_identity(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    (x, z)
}

fn perm_swap_xz(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    (z, x)
}

fn perm_swap_xy(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    let mut new_z = x.clone();
    new_z.xor_assign(&z);
    (x, new_z)
}

fn perm_swap_yz(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    let mut new_x = x.clone();
    new_x.xor_assign(&z);
    (new_x, z)
}

fn conj_noop(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    (x, z)
}

fn conj_h(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    perm_swap_xz(x, z)
}

// HXY's forward conjugation (X<->Y, Z fixed) is `perm_swap_xy`, but that
// matrix is not symmetric over GF(2); pushing sensitivity backward through
// it takes its transpose, which is `perm_swap_yz` (HYZ's forward rule).
fn conj_hxy(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    perm_swap_yz(x, z)
}

fn conj_hyz(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    perm_swap_xy(x, z)
}

fn conj_cxyz(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    let mut new_x = x.clone();
    new_x.xor_assign(&z);
    (new_x, x)
}

fn conj_czyx(x: DemTargetSet, z: DemTargetSet) -> (DemTargetSet, DemTargetSet) {
    let mut new_z = x.clone();
    new_z.xor_assign(&z);
    (z, new_z)
}

fn single_qubit_table() -> &'static [Option<SingleQubitSensitivityFn>; GateId::COUNT] {
    static TABLE: OnceLock<[Option<SingleQubitSensitivityFn>; GateId::COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t: [Option<SingleQubitSensitivityFn>; GateId::COUNT] = [None; GateId::COUNT];
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

/// Looks up and applies the single-qubit reverse-conjugation rule for
/// `id`, returning `None` if `id` does not name a single-qubit unitary.
#[must_use]
pub fn apply_single_qubit(id: GateId, x: DemTargetSet, z: DemTargetSet) -> Option<(DemTargetSet, DemTargetSet)> {
    single_qubit_table()[id.index()].map(|f| f(x, z))
}

/// Adjoint of `frame_sim::dispatch::cx_core`'s `xb ^= xa; za ^= zb`: the
/// control's X sensitivity absorbs the target's, and the target's Z
/// sensitivity absorbs the control's — the mirror image of which slot
/// accumulates which XOR.
fn cx_core_reverse(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    let mut xa = xa;
    xa.xor_assign(&xb);
    let mut zb = zb;
    zb.xor_assign(&za);
    (xa, za, xb, zb)
}

/// Adjoint of the generic "controlled-P with Q-type control" sandwich:
/// the basis permutations are applied using their own adjoints (self-
/// adjoint for every permutation used here except `perm_swap_xy` and
/// `perm_swap_yz`, which are each other's), sandwiching
/// [`cx_core_reverse`] instead of `cx_core`.
fn sandwich(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
    q_perm: SingleQubitSensitivityFn,
    p_perm: SingleQubitSensitivityFn,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    let (xa, za) = q_perm(xa, za);
    let (xb, zb) = p_perm(xb, zb);
    let (xa, za, xb, zb) = cx_core_reverse(xa, za, xb, zb);
    let (xa, za) = q_perm(xa, za);
    let (xb, zb) = p_perm(xb, zb);
    (xa, za, xb, zb)
}

fn conj_cx(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_identity, perm_identity)
}

fn conj_cy(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_identity, perm_swap_yz)
}

fn conj_cz(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_identity, perm_swap_xz)
}

fn conj_xcx(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_identity)
}

fn conj_xcy(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_swap_yz)
}

fn conj_xcz(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xz, perm_swap_xz)
}

fn conj_ycx(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xy, perm_identity)
}

fn conj_ycy(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xy, perm_swap_yz)
}

fn conj_ycz(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    sandwich(xa, za, xb, zb, perm_swap_xy, perm_swap_xz)
}

fn conj_swap(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    (xb, zb, xa, za)
}

/// Adjoint of `frame_sim::dispatch::conj_iswap`, worked out directly
/// from its matrix transpose rather than through `sandwich` (ISWAP isn't
/// built from the CX core).
fn conj_iswap(
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> (DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet) {
    let mut new_xa = za.clone();
    new_xa.xor_assign(&xb);
    new_xa.xor_assign(&zb);
    let mut new_xb = xa.clone();
    new_xb.xor_assign(&za);
    new_xb.xor_assign(&zb);
    (new_xa, zb, new_xb, za)
}

fn two_qubit_table() -> &'static [Option<TwoQubitSensitivityFn>; GateId::COUNT] {
    static TABLE: OnceLock<[Option<TwoQubitSensitivityFn>; GateId::COUNT]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t: [Option<TwoQubitSensitivityFn>; GateId::COUNT] = [None; GateId::COUNT];
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

/// Looks up and applies the two-qubit reverse-conjugation rule for
/// `id`, returning `None` if `id` does not name a two-qubit unitary.
#[must_use]
pub fn apply_two_qubit(
    id: GateId,
    xa: DemTargetSet,
    za: DemTargetSet,
    xb: DemTargetSet,
    zb: DemTargetSet,
) -> Option<(DemTargetSet, DemTargetSet, DemTargetSet, DemTargetSet)> {
    two_qubit_table()[id.index()].map(|f| f(xa, za, xb, zb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DemTarget;

    fn set(ids: &[u64]) -> DemTargetSet {
        ids.iter().map(|&id| DemTarget::detector(id)).collect()
    }

    #[test]
    fn h_swaps_x_and_z_sensitivity() {
        let (x, z) = apply_single_qubit(GateId::H, set(&[0]), set(&[1])).unwrap();
        assert_eq!(x, set(&[1]));
        assert_eq!(z, set(&[0]));
    }

    #[test]
    fn hxy_reverse_rule_is_hyz_forward_rule() {
        // HXY's forward conjugation (perm_swap_xy) isn't self-adjoint;
        // pushing sensitivity back through it takes the transpose, which
        // is HYZ's forward rule, and vice versa.
        let (x, z) = apply_single_qubit(GateId::HXY, set(&[0]), set(&[1])).unwrap();
        assert_eq!(x, set(&[0, 1]), "x sensitivity absorbs z");
        assert_eq!(z, set(&[1]), "z sensitivity is unaffected by x");
    }

    #[test]
    fn cx_control_x_sensitivity_absorbs_the_targets() {
        // X_sens(target)={0}, Z_sens(control)={1}; control's X sensitivity
        // should pick up the target's (an X error on the control before
        // the gate also lands on the target), and the target's Z
        // sensitivity should pick up the control's, the adjoint of
        // `frame_sim::dispatch`'s forward `xb ^= xa; za ^= zb`.
        let (xa, za, xb, zb) = apply_two_qubit(GateId::CX, set(&[]), set(&[1]), set(&[0]), set(&[])).unwrap();
        assert_eq!(xa, set(&[0]), "control's X sensitivity absorbs the target's");
        assert_eq!(za, set(&[1]), "control's Z sensitivity is unaffected by the target");
        assert_eq!(xb, set(&[0]), "target's X sensitivity is unaffected by the control");
        assert_eq!(zb, set(&[1]), "target's Z sensitivity absorbs the control's");
    }

    #[test]
    fn swap_exchanges_both_qubits_sensitivity() {
        let (xa, za, xb, zb) = apply_two_qubit(GateId::Swap, set(&[0]), set(&[]), set(&[]), set(&[1])).unwrap();
        assert_eq!((xa, za, xb, zb), (set(&[]), set(&[1]), set(&[0]), set(&[])));
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
            assert!(apply_single_qubit(id, set(&[]), set(&[])).is_some());
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
            assert!(apply_two_qubit(id, set(&[]), set(&[]), set(&[]), set(&[])).is_some());
        }
    }
}
