//! Shared table of small primes and primorials.

use num_bigint::BigUint;
use num_traits::One;
use once_cell::sync::Lazy;

/// Upper bound (exclusive) of the sieved prime table.
pub const PRIME_TABLE_LIMIT: u32 = 1_000_000;

static PRIME_TABLE: Lazy<Vec<u32>> = Lazy::new(|| sieve(PRIME_TABLE_LIMIT));

/// All primes below [`PRIME_TABLE_LIMIT`] in ascending order.
///
/// Sieved on first use and shared by every thread afterwards.
pub fn prime_table() -> &'static [u32] {
    &PRIME_TABLE
}

fn sieve(limit: u32) -> Vec<u32> {
    let limit = limit as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::with_capacity(80_000);
    for i in 2..limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        let mut j = i * i;
        while j < limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

/// Product of the first `count` primes. `None` if the table is too short.
pub fn primorial(count: usize) -> Option<BigUint> {
    let table = prime_table();
    if count > table.len() {
        return None;
    }
    Some(
        table[..count]
            .iter()
            .fold(BigUint::one(), |acc, &p| acc * p),
    )
}
