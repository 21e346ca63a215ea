use rand::Rng;

use crate::quantum::statevector::{StateVector, sample_counts};

/// A QAOA ansatz of `layers` alternating cost/mixer pairs over a diagonal
/// cost Hamiltonian, given as the precomputed energy of every basis state.
///
/// Parameters are laid out `[gamma_1 .. gamma_p, beta_1 .. beta_p]`.
pub struct QaoaCircuit<'a> {
    energies: &'a [f64],
    num_qubits: usize,
    layers: usize,
}

/// One sampled run of the circuit at fixed parameters.
pub struct Evaluation {
    /// Shot-averaged energy, the quantity the outer search minimizes.
    pub expected_energy: f64,
    /// Lowest-energy basis state observed among the shots.
    pub best_state: u64,
    pub best_energy: f64,
}

impl<'a> QaoaCircuit<'a> {
    pub fn new(energies: &'a [f64], num_qubits: usize, layers: usize) -> Self {
        debug_assert_eq!(energies.len(), 1 << num_qubits);
        Self {
            energies,
            num_qubits,
            layers,
        }
    }

    pub fn num_parameters(&self) -> usize {
        2 * self.layers
    }

    /// Small non-zero angles; zero everywhere is a stationary point of the
    /// expectation and would strand the simplex search.
    pub fn initial_parameters(&self) -> Vec<f64> {
        vec![0.1; self.num_parameters()]
    }

    pub fn evaluate<R: Rng>(&self, parameters: &[f64], shots: usize, rng: &mut R) -> Evaluation {
        debug_assert_eq!(parameters.len(), self.num_parameters());
        let (gammas, betas) = parameters.split_at(self.layers);

        let mut state = StateVector::uniform(self.num_qubits);
        for (&gamma, &beta) in gammas.iter().zip(betas) {
            state.apply_phase(self.energies, gamma);
            state.apply_mixer(beta);
        }

        let counts = sample_counts(&state.probabilities(), shots, rng);

        let mut expected_energy = 0.0;
        let mut best_state = 0u64;
        let mut best_energy = f64::INFINITY;
        for (basis, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let energy = self.energies[basis];
            expected_energy += energy * count as f64;
            if energy < best_energy {
                best_energy = energy;
                best_state = basis as u64;
            }
        }
        expected_energy /= shots as f64;

        Evaluation {
            expected_energy,
            best_state,
            best_energy,
        }
    }
}
