//! Deterministic BPSW primality oracle.
//!
//! Trial division by the primes up to 997, a strong Miller–Rabin test to base 2 and
//! a strong Lucas test with Selfridge's Method A parameters. Every node must reach the
//! same verdict for the same input, so the test is spelled out here rather than
//! delegated to a big-integer library's probabilistic routine.

use crate::bignum::{is_perfect_square, jacobi};
use crate::params::LUCAS_D_SEARCH_LIMIT;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Primes up to 997, used for trial division.
pub const SMALL_PRIMES: [u32; 168] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43,
    47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97, 101, 103, 107,
    109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181,
    191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263,
    269, 271, 277, 281, 283, 293, 307, 311, 313, 317, 331, 337, 347, 349,
    353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421, 431, 433,
    439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521,
    523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613,
    617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701,
    709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809,
    811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887,
    907, 911, 919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

/// Outcome of trial division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrialDivision {
    Prime,
    Composite,
    Undecided,
}

pub(crate) fn trial_division(n: &BigUint) -> TrialDivision {
    if let Some(small) = n.to_u32() {
        if small < 2 {
            return TrialDivision::Composite;
        }
        for &p in SMALL_PRIMES.iter() {
            if small == p {
                return TrialDivision::Prime;
            }
            if small % p == 0 {
                return TrialDivision::Composite;
            }
        }
        return TrialDivision::Undecided;
    }
    if SMALL_PRIMES.iter().any(|&p| (n % p).is_zero()) {
        TrialDivision::Composite
    } else {
        TrialDivision::Undecided
    }
}

/// BPSW primality test.
///
/// `false` means `n` is certainly composite (or below 2); `true` means `n` passed
/// trial division, Miller–Rabin base 2 and the strong Lucas–Selfridge test.
pub fn is_probable_prime(n: &BigUint) -> bool {
    match trial_division(n) {
        TrialDivision::Prime => true,
        TrialDivision::Composite => false,
        TrialDivision::Undecided => miller_rabin_base2(n) && strong_lucas_selfridge(n),
    }
}

/// Single-round filter: trial division plus Miller–Rabin base 2.
///
/// Cheap enough to run over a whole constellation before the full oracle.
pub fn passes_quick_check(n: &BigUint) -> bool {
    match trial_division(n) {
        TrialDivision::Prime => true,
        TrialDivision::Composite => false,
        TrialDivision::Undecided => miller_rabin_base2(n),
    }
}

/// Smallest prime strictly greater than `n`.
pub fn next_prime(n: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    if *n < two {
        return two;
    }
    let mut candidate = n + 1u32;
    if candidate.is_even() {
        candidate += 1u32;
    }
    loop {
        match trial_division(&candidate) {
            TrialDivision::Prime => return candidate,
            TrialDivision::Composite => {}
            TrialDivision::Undecided => {
                if miller_rabin_base2(&candidate) && strong_lucas_selfridge(&candidate) {
                    return candidate;
                }
            }
        }
        candidate += 2u32;
    }
}

/// Strong probable-prime test to base 2. `n` must be odd and greater than 2.
pub(crate) fn miller_rabin_base2(n: &BigUint) -> bool {
    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let mut x = BigUint::from(2u32).modpow(&d, n);
    if x.is_one() || x == n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = (&x * &x) % n;
        if x == n_minus_one {
            return true;
        }
    }
    false
}

/// First `D` in 5, -7, 9, -11, ... with `(D | n) = -1`.
///
/// `None` when `n` is proven composite along the way or the search bound is hit.
fn selfridge_d(n: &BigUint) -> Option<i64> {
    let mut d: i64 = 5;
    loop {
        if d.unsigned_abs() > LUCAS_D_SEARCH_LIMIT {
            return None;
        }
        match jacobi(d, n) {
            -1 => return Some(d),
            0 if BigUint::from(d.unsigned_abs()) != *n => return None,
            _ => {}
        }
        d = if d > 0 { -(d + 2) } else { -d + 2 };
    }
}

/// `value mod n` for a signed `value`, as a non-negative residue.
fn signed_mod(value: i64, n: &BigUint) -> BigUint {
    let magnitude = BigUint::from(value.unsigned_abs()) % n;
    if value >= 0 || magnitude.is_zero() {
        magnitude
    } else {
        n - magnitude
    }
}

/// `(a - b) mod n` for residues already reduced below `n`.
fn sub_mod(a: BigUint, b: &BigUint, n: &BigUint) -> BigUint {
    if a >= *b {
        a - b
    } else {
        a + n - b
    }
}

/// `x / 2 mod n` for odd `n`.
fn half_mod(x: BigUint, n: &BigUint) -> BigUint {
    let x = x % n;
    if x.is_odd() {
        (x + n) >> 1
    } else {
        x >> 1
    }
}

/// Strong Lucas probable-prime test with Selfridge Method A parameters (P = 1).
pub(crate) fn strong_lucas_selfridge(n: &BigUint) -> bool {
    if is_perfect_square(n) {
        return false;
    }
    let d_param = match selfridge_d(n) {
        Some(d) => d,
        None => return false,
    };
    let q_param = (1 - d_param) / 4;
    let d_mod = signed_mod(d_param, n);
    let q_mod = signed_mod(q_param, n);

    // n + 1 = d * 2^s with d odd
    let n_plus_one = n + 1u32;
    let s = n_plus_one.trailing_zeros().unwrap_or(0);
    let d = &n_plus_one >> s;

    let mut u = BigUint::one();
    let mut v = BigUint::one();
    let mut qk = q_mod.clone();

    for i in (0..d.bits().saturating_sub(1)).rev() {
        u = (&u * &v) % n;
        v = sub_mod((&v * &v) % n, &((&qk << 1u32) % n), n);
        qk = (&qk * &qk) % n;
        if d.bit(i) {
            let next_u = half_mod(&u + &v, n);
            let next_v = half_mod(&d_mod * &u + &v, n);
            u = next_u;
            v = next_v;
            qk = (&qk * &q_mod) % n;
        }
    }

    if u.is_zero() || v.is_zero() {
        return true;
    }
    for _ in 1..s {
        v = sub_mod((&v * &v) % n, &((&qk << 1u32) % n), n);
        qk = (&qk * &qk) % n;
        if v.is_zero() {
            return true;
        }
    }
    false
}
