use rand::Rng;

/// Hard cap on simulated qubits. The statevector holds `2^n` amplitudes, so
/// 24 qubits is already 256MiB of f64 pairs.
pub const MAX_SUPPORTED_VARIABLES: usize = 24;

/// Dense statevector over `num_qubits` qubits, amplitudes split into real and
/// imaginary parts. Basis state `s` has qubit `i` set iff bit `i` of `s` is.
pub struct StateVector {
    re: Vec<f64>,
    im: Vec<f64>,
    num_qubits: usize,
}

impl StateVector {
    /// The uniform superposition `H^n |0>`.
    pub fn uniform(num_qubits: usize) -> Self {
        assert!(num_qubits <= MAX_SUPPORTED_VARIABLES);
        let dim = 1usize << num_qubits;
        let amplitude = 1.0 / (dim as f64).sqrt();

        Self {
            re: vec![amplitude; dim],
            im: vec![0.0; dim],
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Cost layer: multiply each basis amplitude by `e^{-i gamma E(s)}`.
    /// The cost Hamiltonian is diagonal, so this is a pointwise rotation.
    pub fn apply_phase(&mut self, energies: &[f64], gamma: f64) {
        debug_assert_eq!(energies.len(), self.re.len());

        for (state, &energy) in energies.iter().enumerate() {
            let (sin, cos) = (-gamma * energy).sin_cos();
            let re = self.re[state];
            let im = self.im[state];
            self.re[state] = re * cos - im * sin;
            self.im[state] = re * sin + im * cos;
        }
    }

    /// Mixer layer: `RX(2 beta)` on every qubit. Each qubit pairs basis
    /// states differing only in that bit.
    pub fn apply_mixer(&mut self, beta: f64) {
        let (sin, cos) = beta.sin_cos();

        for qubit in 0..self.num_qubits {
            let bit = 1usize << qubit;
            for low in 0..self.re.len() {
                if low & bit != 0 {
                    continue;
                }
                let high = low | bit;

                let (re0, im0) = (self.re[low], self.im[low]);
                let (re1, im1) = (self.re[high], self.im[high]);

                // RX(2 beta) = [[cos, -i sin], [-i sin, cos]]
                self.re[low] = cos * re0 + sin * im1;
                self.im[low] = cos * im0 - sin * re1;
                self.re[high] = cos * re1 + sin * im0;
                self.im[high] = cos * im1 - sin * re0;
            }
        }
    }

    /// Measurement probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(re, im)| re * re + im * im)
            .collect()
    }

    #[cfg(test)]
    pub fn norm(&self) -> f64 {
        self.probabilities().iter().sum::<f64>().sqrt()
    }
}

/// Draws `shots` basis states from a probability distribution, via the
/// cumulative distribution. Returns one count per basis state.
pub fn sample_counts<R: Rng>(probabilities: &[f64], shots: usize, rng: &mut R) -> Vec<u32> {
    let mut cumulative = Vec::with_capacity(probabilities.len());
    let mut total = 0.0;
    for &p in probabilities {
        total += p;
        cumulative.push(total);
    }

    let mut counts = vec![0u32; probabilities.len()];
    let last = counts.len() - 1;
    for _ in 0..shots {
        let draw = rng.random::<f64>() * total;
        // rounding can push the draw past the final cumulative entry
        let state = cumulative.partition_point(|&c| c <= draw);
        counts[state.min(last)] += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn test_uniform_state_has_unit_norm_and_flat_distribution() {
        let state = StateVector::uniform(4);
        assert!((state.norm() - 1.0).abs() < 1e-12);

        for p in state.probabilities() {
            assert!((p - 1.0 / 16.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_layers_preserve_the_norm() {
        let mut state = StateVector::uniform(3);
        let energies: Vec<f64> = (0..8).map(|s| s as f64 * 1.7).collect();

        state.apply_phase(&energies, 0.8);
        assert!((state.norm() - 1.0).abs() < 1e-12);

        state.apply_mixer(0.3);
        assert!((state.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_phase_layer_does_not_change_probabilities() {
        let mut state = StateVector::uniform(3);
        let before = state.probabilities();

        state.apply_phase(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 1.1);

        for (p, q) in state.probabilities().iter().zip(&before) {
            assert!((p - q).abs() < 1e-12);
        }
    }

    #[test]
    fn test_full_mixer_rotation_flips_every_qubit() {
        // RX(pi) maps |0> to -i|1>, so from |00..0> all probability lands on
        // |11..1>.
        let mut state = StateVector {
            re: {
                let mut re = vec![0.0; 8];
                re[0] = 1.0;
                re
            },
            im: vec![0.0; 8],
            num_qubits: 3,
        };

        state.apply_mixer(std::f64::consts::FRAC_PI_2);

        let probabilities = state.probabilities();
        assert!((probabilities[7] - 1.0).abs() < 1e-12);
        assert!(probabilities[..7].iter().all(|&p| p.abs() < 1e-12));
    }

    #[test]
    fn test_sampling_concentrates_on_the_heavy_state() {
        let mut probabilities = vec![0.01; 10];
        probabilities[4] = 10.0;
        let mut rng = SmallRng::seed_from_u64(3);

        let counts = sample_counts(&probabilities, 1000, &mut rng);

        assert_eq!(counts.iter().sum::<u32>(), 1000);
        assert!(counts[4] > 900);
    }
}
