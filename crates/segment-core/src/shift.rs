//! Without-replacement pseudo-random integer generator over `1..=n`, cycling
//! indefinitely, plus a single-producer emitter so concurrent callers share
//! one generator without a lock per draw.

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Draws integers uniformly over `1..=n` such that every `n` consecutive
/// outputs are a permutation of `1..=n` — no value repeats within a cycle.
pub struct ShiftGenerator {
    seq: Vec<u32>,
    length: usize,
}

impl ShiftGenerator {
    /// Creates a generator over `1..=n`. Panics if `n == 0`.
    #[must_use]
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "ShiftGenerator requires n > 0");
        Self {
            seq: (1..=n).collect(),
            length: n as usize,
        }
    }

    /// Draws the next value, re-permuting and restarting the cycle once
    /// every value in `1..=n` has been produced.
    pub fn next(&mut self) -> u32 {
        let mut rng = rand::rng();
        let i = rng.random_range(0..self.length);
        let val = self.seq[i];
        self.seq.swap(i, self.length - 1);
        self.length -= 1;
        if self.length == 0 {
            self.length = self.seq.len();
        }
        val
    }
}

/// Consumer handle for a cancellable single-producer stream of draws from a
/// [`ShiftGenerator`]. After the producer is cancelled, `next()` returns `0`
/// (the sentinel) on every subsequent call.
pub struct ShiftEmitter {
    rx: mpsc::Receiver<u32>,
}

impl ShiftEmitter {
    /// Spawns the producer task and returns the consumer-facing emitter.
    ///
    /// The producer feeds a bounded channel with `generator.next()` until
    /// `token` is cancelled, at which point it drops the sender and exits.
    pub fn spawn(mut generator: ShiftGenerator, token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            loop {
                let val = generator.next();
                tokio::select! {
                    () = token.cancelled() => break,
                    send_result = tx.send(val) => {
                        if send_result.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self { rx }
    }

    /// Awaits the next draw. Returns `0` once the producer has stopped.
    pub async fn next(&mut self) -> u32 {
        self.rx.recv().await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_n_consecutive_outputs_is_a_permutation() {
        let mut gen = ShiftGenerator::new(10);
        for _ in 0..5 {
            let mut seen = HashSet::new();
            for _ in 0..10 {
                assert!(seen.insert(gen.next()), "value repeated within one cycle");
            }
            assert_eq!(seen, (1..=10).collect());
        }
    }

    #[test]
    fn single_value_generator_always_returns_it() {
        let mut gen = ShiftGenerator::new(1);
        for _ in 0..5 {
            assert_eq!(gen.next(), 1);
        }
    }

    #[tokio::test]
    async fn emitter_returns_sentinel_after_cancellation() {
        let token = CancellationToken::new();
        let mut emitter = ShiftEmitter::spawn(ShiftGenerator::new(100), token.clone());
        let first = emitter.next().await;
        assert!((1..=100).contains(&first));
        token.cancel();
        // Drain whatever was already in flight, then expect the sentinel.
        loop {
            let v = emitter.next().await;
            if v == 0 {
                break;
            }
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Every `n` consecutive draws from a generator of size `n` are a
            /// permutation of `1..=n`, regardless of `n`.
            #[test]
            fn n_consecutive_draws_form_a_permutation(n in 1u32..64) {
                let mut gen = ShiftGenerator::new(n);
                for _ in 0..4 {
                    let mut seen: HashSet<u32> = HashSet::new();
                    for _ in 0..n {
                        prop_assert!(seen.insert(gen.next()));
                    }
                    prop_assert_eq!(seen, (1..=n).collect());
                }
            }
        }
    }
}
