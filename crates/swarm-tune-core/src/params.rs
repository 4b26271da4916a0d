use crate::constants::COEFFICIENT_COUNT;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The 15-coefficient genetic string governing the force-field kernels.
///
/// Layout (index: meaning):
/// - 0..3: top-level weights for target, obstacle and inter-drone interactions
/// - 3, 4: target kernel attract/repel magnitudes
/// - 5, 6: obstacle kernel attract/repel magnitudes
/// - 7, 8: inter-drone kernel attract/repel magnitudes
/// - 9, 10: target kernel attract/repel decay rates
/// - 11, 12: obstacle kernel attract/repel decay rates
/// - 13, 14: inter-drone kernel attract/repel decay rates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector(pub [f64; COEFFICIENT_COUNT]);

/// Signed distance kernel `attract * exp(-attract_decay * d) - repel * exp(-repel_decay * d)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionKernel {
    pub attract_weight: f64,
    pub repel_weight: f64,
    pub attract_decay: f64,
    pub repel_decay: f64,
}

impl InteractionKernel {
    /// Signed magnitude at `distance`; positive pulls the drone toward the other entity.
    #[inline]
    pub fn magnitude(&self, distance: f64) -> f64 {
        self.attract_weight * (-self.attract_decay * distance).exp()
            - self.repel_weight * (-self.repel_decay * distance).exp()
    }
}

impl ParameterVector {
    pub const LEN: usize = COEFFICIENT_COUNT;

    const TARGET_WEIGHT: usize = 0;
    const OBSTACLE_WEIGHT: usize = 1;
    const SWARM_WEIGHT: usize = 2;
    const MAGNITUDES: usize = 3;
    const DECAYS: usize = 9;

    pub fn new(coefficients: [f64; COEFFICIENT_COUNT]) -> Self {
        Self(coefficients)
    }

    pub fn coefficients(&self) -> &[f64; COEFFICIENT_COUNT] {
        &self.0
    }

    pub fn target_weight(&self) -> f64 {
        self.0[Self::TARGET_WEIGHT]
    }

    pub fn obstacle_weight(&self) -> f64 {
        self.0[Self::OBSTACLE_WEIGHT]
    }

    pub fn swarm_weight(&self) -> f64 {
        self.0[Self::SWARM_WEIGHT]
    }

    fn kernel(&self, slot: usize) -> InteractionKernel {
        let m = Self::MAGNITUDES + 2 * slot;
        let d = Self::DECAYS + 2 * slot;
        InteractionKernel {
            attract_weight: self.0[m],
            repel_weight: self.0[m + 1],
            attract_decay: self.0[d],
            repel_decay: self.0[d + 1],
        }
    }

    pub fn target_kernel(&self) -> InteractionKernel {
        self.kernel(0)
    }

    pub fn obstacle_kernel(&self) -> InteractionKernel {
        self.kernel(1)
    }

    pub fn swarm_kernel(&self) -> InteractionKernel {
        self.kernel(2)
    }

    /// Convex combination `phi * self + (1 - phi) * other`, coefficient-wise.
    pub fn blend(&self, other: &Self, phi: f64) -> Self {
        let mut out = [0.0; COEFFICIENT_COUNT];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *o = phi * a + (1.0 - phi) * b;
        }
        Self(out)
    }
}

/// Per-coefficient sampling interval `[lower, upper]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub lower: ParameterVector,
    pub upper: ParameterVector,
}

impl ParameterBounds {
    /// Same interval for every coefficient.
    pub fn uniform(lower: f64, upper: f64) -> Self {
        Self {
            lower: ParameterVector([lower; COEFFICIENT_COUNT]),
            upper: ParameterVector([upper; COEFFICIENT_COUNT]),
        }
    }

    /// Index of the first coefficient whose interval is non-finite or inverted.
    pub fn first_invalid(&self) -> Option<usize> {
        self.lower
            .0
            .iter()
            .zip(self.upper.0.iter())
            .position(|(lo, hi)| !(lo.is_finite() && hi.is_finite() && lo <= hi))
    }

    pub fn contains(&self, params: &ParameterVector) -> bool {
        params
            .0
            .iter()
            .zip(self.lower.0.iter().zip(self.upper.0.iter()))
            .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
    }

    /// Draw every coefficient independently and uniformly from its interval.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParameterVector {
        let mut out = [0.0; COEFFICIENT_COUNT];
        for (o, (lo, hi)) in out
            .iter_mut()
            .zip(self.lower.0.iter().zip(self.upper.0.iter()))
        {
            *o = lo + rng.random::<f64>() * (hi - lo);
        }
        ParameterVector(out)
    }
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self::uniform(0.0, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn indexed() -> ParameterVector {
        let mut c = [0.0; COEFFICIENT_COUNT];
        for (i, v) in c.iter_mut().enumerate() {
            *v = i as f64;
        }
        ParameterVector(c)
    }

    fn parts(k: &InteractionKernel) -> [f64; 4] {
        [k.attract_weight, k.repel_weight, k.attract_decay, k.repel_decay]
    }

    #[test]
    fn kernel_views_follow_coefficient_layout() {
        let p = indexed();
        assert_eq!(
            (p.target_weight(), p.obstacle_weight(), p.swarm_weight()),
            (0.0, 1.0, 2.0)
        );
        let t = p.target_kernel();
        assert_eq!(parts(&t), [3.0, 4.0, 9.0, 10.0]);
        let o = p.obstacle_kernel();
        assert_eq!(parts(&o), [5.0, 6.0, 11.0, 12.0]);
        let s = p.swarm_kernel();
        assert_eq!(parts(&s), [7.0, 8.0, 13.0, 14.0]);
    }

    #[test]
    fn kernel_attracts_far_and_repels_near_for_fast_repulsion_decay() {
        let k = InteractionKernel {
            attract_weight: 1.0,
            repel_weight: 4.0,
            attract_decay: 0.01,
            repel_decay: 1.0,
        };
        assert!(k.magnitude(0.1) < 0.0);
        assert!(k.magnitude(20.0) > 0.0);
    }

    #[test]
    fn blend_endpoints_return_parents() {
        let a = ParameterVector([1.0; COEFFICIENT_COUNT]);
        let b = ParameterVector([3.0; COEFFICIENT_COUNT]);
        assert_eq!(a.blend(&b, 1.0), a);
        assert_eq!(a.blend(&b, 0.0), b);
        assert_eq!(a.blend(&b, 0.25).0, [2.5; COEFFICIENT_COUNT]);
    }

    #[test]
    fn sampling_is_deterministic_for_fixed_seed() {
        let bounds = ParameterBounds::default();
        let mut rng_a = ChaCha12Rng::seed_from_u64(123);
        let mut rng_b = ChaCha12Rng::seed_from_u64(123);
        assert_eq!(bounds.sample(&mut rng_a), bounds.sample(&mut rng_b));
    }

    #[test]
    fn degenerate_interval_pins_coefficient() {
        let mut bounds = ParameterBounds::uniform(0.0, 1.0);
        bounds.lower.0[4] = 0.5;
        bounds.upper.0[4] = 0.5;
        let mut rng = ChaCha12Rng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(bounds.sample(&mut rng).0[4], 0.5);
        }
    }

    #[test]
    fn first_invalid_reports_index() {
        let mut bounds = ParameterBounds::default();
        assert_eq!(bounds.first_invalid(), None);
        bounds.upper.0[7] = f64::NAN;
        assert_eq!(bounds.first_invalid(), Some(7));
    }

    proptest! {
        #[test]
        fn proptest_samples_and_blends_stay_in_bounds(
            seed in any::<u64>(),
            lo in -5.0f64..0.0,
            width in 0.0f64..10.0,
            phi in 0.0f64..=1.0,
        ) {
            let bounds = ParameterBounds::uniform(lo, lo + width);
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let a = bounds.sample(&mut rng);
            let b = bounds.sample(&mut rng);
            prop_assert!(bounds.contains(&a));
            prop_assert!(bounds.contains(&b));
            let child = a.blend(&b, phi);
            for ((c, x), y) in child.0.iter().zip(a.0.iter()).zip(b.0.iter()) {
                let (min, max) = if x <= y { (*x, *y) } else { (*y, *x) };
                prop_assert!(*c >= min - 1e-12 && *c <= max + 1e-12);
            }
        }
    }
}
