//! Helpers shared by the unit tests.

use crate::core::Commit;

/// Small deterministic generator, enough to vary test inputs by seed
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Value in `0..bound`, or 0 for an empty bound
    pub(crate) fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

pub(crate) fn commit(id: &str, parents: &[&str]) -> Commit {
    Commit::new(id, parents.iter().map(|p| p.to_string()).collect())
}

/// Log of `n` commits named `c0..`. Commit i may have parents among later
/// commits, and with `outside` also commits outside the window or (rarely)
/// earlier commits.
pub(crate) fn generated_log(seed: u64, n: usize, outside: bool) -> Vec<Commit> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|i| {
            let count = match rng.below(10) {
                0 => 0,
                1 | 2 => 2,
                3 => 3,
                _ => 1,
            };
            let mut parents: Vec<String> = Vec::new();
            for _ in 0..count {
                let candidate = match rng.below(8) {
                    0 if outside => format!("x{}", rng.below(4)),
                    1 if outside && i > 0 => format!("c{}", rng.below(i)),
                    _ if i + 1 < n => format!("c{}", i + 1 + rng.below((n - i - 1).min(6))),
                    _ => continue,
                };
                if !parents.contains(&candidate) {
                    parents.push(candidate);
                }
            }
            Commit::new(format!("c{}", i), parents)
        })
        .collect()
}
