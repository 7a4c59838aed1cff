//! Batched sampling of the Pauli noise channels.
//!
//! Single-component channels (`X_ERROR`/`Y_ERROR`/`Z_ERROR`) XOR an
//! independent Bernoulli draw per shot straight into the relevant frame
//! row. Multi-component channels (`DEPOLARIZE1/2`, `PAULI_CHANNEL_1/2`)
//! pick one of several mutually exclusive outcomes per shot via
//! [`crate::rng::FrameRng::categorical_batch`], a cumulative-threshold
//! fault selection generalized from one draw at a time to a whole
//! batch at once.

use bitpack::BitVector;

use crate::rng::FrameRng;

/// The four single-qubit Pauli outcomes, used as indices into a
/// 4-outcome categorical draw: `(x, z)` bit pair each contributes.
const SINGLE_QUBIT_PAULIS: [(bool, bool); 4] = [
    (false, false), // I
    (true, false),  // X
    (true, true),   // Y
    (false, true),  // Z
];

/// The 15 nontrivial two-qubit Pauli outcomes in the standard
/// `IX,IY,IZ,XI,XX,XY,XZ,YI,YX,YY,YZ,ZI,ZX,ZY,ZZ` order that
/// `PAULI_CHANNEL_2`'s 15 disjoint-probability arguments are given in.
/// Each entry is `(xa, za, xb, zb)`.
const TWO_QUBIT_PAULIS: [(bool, bool, bool, bool); 15] = [
    (false, false, true, false),  // IX
    (false, false, true, true),   // IY
    (false, false, false, true),  // IZ
    (true, false, false, false),  // XI
    (true, false, true, false),   // XX
    (true, false, true, true),    // XY
    (true, false, false, true),   // XZ
    (true, true, false, false),   // YI
    (true, true, true, false),    // YX
    (true, true, true, true),     // YY
    (true, true, false, true),    // YZ
    (false, true, false, false),  // ZI
    (false, true, true, false),   // ZX
    (false, true, true, true),    // ZY
    (false, true, false, true),   // ZZ
];

/// Single-qubit Pauli error sampled independently per shot, XORed onto
/// `x`/`z`. Used for `X_ERROR p` (`x ^= bernoulli(p)`), `Y_ERROR p`
/// (both rows), `Z_ERROR p` (`z` row only).
pub fn apply_pauli_error(x: &mut BitVector, z: &mut BitVector, p: f64, affects_x: bool, affects_z: bool, rng: &mut FrameRng) {
    if p <= 0.0 {
        return;
    }
    let draw = rng.bernoulli_vector(x.len(), p);
    if affects_x {
        x.xor_assign(&draw);
    }
    if affects_z {
        z.xor_assign(&draw);
    }
}

/// Converts a batch of categorical outcome indices into `(x, z)` masks
/// by looking each outcome up in `patterns`; index `patterns.len()`
/// (the implicit "no error" bucket `categorical_batch` returns past the
/// end of the cumulative table) contributes nothing.
fn masks_from_outcomes(outcomes: &[usize], patterns: &[(bool, bool)]) -> (BitVector, BitVector) {
    let mut x = BitVector::zeros(outcomes.len());
    let mut z = BitVector::zeros(outcomes.len());
    for (shot, &outcome) in outcomes.iter().enumerate() {
        if let Some(&(px, pz)) = patterns.get(outcome) {
            x.set(shot, px);
            z.set(shot, pz);
        }
    }
    (x, z)
}

/// `DEPOLARIZE1 p`: each shot independently suffers X, Y or Z with
/// probability `p/3` each (disjoint, so the cumulative table is
/// `[p/3, 2p/3, p]`).
pub fn apply_depolarize1(x: &mut BitVector, z: &mut BitVector, p: f64, rng: &mut FrameRng) {
    if p <= 0.0 {
        return;
    }
    let third = p / 3.0;
    let cumulative = [third, 2.0 * third, p];
    let outcomes = rng.categorical_batch(x.len(), &cumulative);
    let (dx, dz) = masks_from_outcomes(&outcomes, &SINGLE_QUBIT_PAULIS[1..]);
    x.xor_assign(&dx);
    z.xor_assign(&dz);
}

/// `PAULI_CHANNEL_1(p_x, p_y, p_z)`: the three disjoint probabilities
/// are used directly rather than split from one total `p`.
pub fn apply_pauli_channel1(x: &mut BitVector, z: &mut BitVector, p_x: f64, p_y: f64, p_z: f64, rng: &mut FrameRng) {
    let cumulative = [p_x, p_x + p_y, p_x + p_y + p_z];
    let outcomes = rng.categorical_batch(x.len(), &cumulative);
    let (dx, dz) = masks_from_outcomes(&outcomes, &SINGLE_QUBIT_PAULIS[1..]);
    x.xor_assign(&dx);
    z.xor_assign(&dz);
}

/// `DEPOLARIZE2 p`: the 15 nontrivial two-qubit Paulis share `p`
/// equally (`p/15` each).
#[allow(clippy::too_many_arguments)]
pub fn apply_depolarize2(
    xa: &mut BitVector,
    za: &mut BitVector,
    xb: &mut BitVector,
    zb: &mut BitVector,
    p: f64,
    rng: &mut FrameRng,
) {
    if p <= 0.0 {
        return;
    }
    let share = p / 15.0;
    let mut cumulative = [0.0; 15];
    let mut running = 0.0;
    for slot in &mut cumulative {
        running += share;
        *slot = running;
    }
    apply_two_qubit_categorical(xa, za, xb, zb, &cumulative, rng);
}

/// `PAULI_CHANNEL_2(p_1..p_15)`: 15 explicit disjoint probabilities in
/// `IX,IY,IZ,XI,...,ZZ` order.
pub fn apply_pauli_channel2(xa: &mut BitVector, za: &mut BitVector, xb: &mut BitVector, zb: &mut BitVector, probs: &[f64], rng: &mut FrameRng) {
    debug_assert_eq!(probs.len(), 15);
    let mut cumulative = [0.0; 15];
    let mut running = 0.0;
    for (slot, &p) in cumulative.iter_mut().zip(probs) {
        running += p;
        *slot = running;
    }
    apply_two_qubit_categorical(xa, za, xb, zb, &cumulative, rng);
}

fn apply_two_qubit_categorical(xa: &mut BitVector, za: &mut BitVector, xb: &mut BitVector, zb: &mut BitVector, cumulative: &[f64; 15], rng: &mut FrameRng) {
    let outcomes = rng.categorical_batch(xa.len(), cumulative);
    let mut dxa = BitVector::zeros(xa.len());
    let mut dza = BitVector::zeros(xa.len());
    let mut dxb = BitVector::zeros(xa.len());
    let mut dzb = BitVector::zeros(xa.len());
    for (shot, &outcome) in outcomes.iter().enumerate() {
        if let Some(&(pxa, pza, pxb, pzb)) = TWO_QUBIT_PAULIS.get(outcome) {
            dxa.set(shot, pxa);
            dza.set(shot, pza);
            dxb.set(shot, pxb);
            dzb.set(shot, pzb);
        }
    }
    xa.xor_assign(&dxa);
    za.xor_assign(&dza);
    xb.xor_assign(&dxb);
    zb.xor_assign(&dzb);
}

/// `HERALDED_ERASE p`: with probability `p` per shot, the heralding bit
/// fires and the qubit suffers a uniformly random Pauli error (one of
/// `I, X, Y, Z` with equal probability conditioned on the herald). The
/// heralding bit itself is returned separately so the caller can append
/// it as a measurement-like result, one per target qubit.
pub fn apply_heralded_erase(x: &mut BitVector, z: &mut BitVector, p: f64, rng: &mut FrameRng) -> BitVector {
    let herald = rng.bernoulli_vector(x.len(), p);
    if herald.not_zero() {
        let quarter = [0.25, 0.5, 0.75, 1.0];
        let outcomes = rng.categorical_batch(x.len(), &quarter);
        let (mut dx, mut dz) = masks_from_outcomes(&outcomes, &SINGLE_QUBIT_PAULIS);
        dx.and_assign(&herald);
        dz.and_assign(&herald);
        x.xor_assign(&dx);
        z.xor_assign(&dz);
    }
    herald
}

/// `HERALDED_PAULI_CHANNEL_1(p_herald_and_i, p_herald_and_x, p_herald_and_y, p_herald_and_z)`:
/// four disjoint probabilities, all conditioned on the herald firing;
/// `1 - sum` is "no herald, no error". This is the natural
/// single-qubit generalization of `HERALDED_ERASE` to an explicit,
/// possibly non-uniform post-herald Pauli distribution; the argument
/// layout is recorded in DESIGN.md.
pub fn apply_heralded_pauli_channel1(x: &mut BitVector, z: &mut BitVector, probs: &[f64; 4], rng: &mut FrameRng) -> BitVector {
    let mut cumulative = [0.0; 4];
    let mut running = 0.0;
    for (slot, &p) in cumulative.iter_mut().zip(probs.iter()) {
        running += p;
        *slot = running;
    }
    let total = cumulative[3];
    let outcomes = rng.categorical_batch(x.len(), &cumulative);
    let mut herald = BitVector::zeros(x.len());
    let mut dx = BitVector::zeros(x.len());
    let mut dz = BitVector::zeros(x.len());
    for (shot, &outcome) in outcomes.iter().enumerate() {
        if outcome < 4 {
            herald.set(shot, true);
            let (px, pz) = SINGLE_QUBIT_PAULIS[outcome];
            dx.set(shot, px);
            dz.set(shot, pz);
        }
    }
    let _ = total;
    x.xor_assign(&dx);
    z.xor_assign(&dz);
    herald
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_probability_pauli_error_is_noop() {
        let mut x = BitVector::zeros(64);
        let mut z = BitVector::zeros(64);
        let mut rng = FrameRng::seed_from_u64(1);
        apply_pauli_error(&mut x, &mut z, 0.0, true, false, &mut rng);
        assert!(!x.not_zero());
        assert!(!z.not_zero());
    }

    #[test]
    fn certain_x_error_flips_every_shot() {
        let mut x = BitVector::zeros(64);
        let mut z = BitVector::zeros(64);
        let mut rng = FrameRng::seed_from_u64(1);
        apply_pauli_error(&mut x, &mut z, 1.0, true, false, &mut rng);
        assert_eq!(x.popcount(), 64);
        assert_eq!(z.popcount(), 0);
    }

    #[test]
    fn depolarize1_with_full_probability_always_picks_a_nontrivial_pauli() {
        let mut x = BitVector::zeros(256);
        let mut z = BitVector::zeros(256);
        let mut rng = FrameRng::seed_from_u64(3);
        apply_depolarize1(&mut x, &mut z, 1.0, &mut rng);
        for i in 0..256 {
            assert!(x.get(i) || z.get(i), "shot {i} should have suffered X, Y or Z");
        }
    }

    #[test]
    fn heralded_erase_herald_bit_implies_some_error_chance() {
        let mut x = BitVector::zeros(512);
        let mut z = BitVector::zeros(512);
        let mut rng = FrameRng::seed_from_u64(5);
        let herald = apply_heralded_erase(&mut x, &mut z, 1.0, &mut rng);
        assert_eq!(herald.popcount(), 512);
    }

    #[test]
    fn depolarize2_full_probability_always_errs() {
        let mut xa = BitVector::zeros(256);
        let mut za = BitVector::zeros(256);
        let mut xb = BitVector::zeros(256);
        let mut zb = BitVector::zeros(256);
        let mut rng = FrameRng::seed_from_u64(9);
        apply_depolarize2(&mut xa, &mut za, &mut xb, &mut zb, 1.0, &mut rng);
        for i in 0..256 {
            assert!(
                xa.get(i) || za.get(i) || xb.get(i) || zb.get(i),
                "shot {i} should have suffered a nontrivial two-qubit Pauli"
            );
        }
    }
}
