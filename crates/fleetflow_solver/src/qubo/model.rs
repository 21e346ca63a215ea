use fxhash::FxHashMap;

/// A Quadratic Unconstrained Binary Optimization problem over at most 64
/// binary variables, so a full assignment fits in a `u64` bitmask (bit i =
/// variable i).
///
/// Constraints are folded in as quadratic penalty terms; `energy` of a
/// feasible assignment is its travel cost, infeasible assignments pay the
/// penalty on top.
pub struct Qubo {
    num_variables: usize,
    linear: Vec<f64>,
    quadratic: FxHashMap<(u32, u32), f64>,
    offset: f64,
}

impl Qubo {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= 64, "QUBO assignments are u64 bitmasks");

        Self {
            num_variables,
            linear: vec![0.0; num_variables],
            quadratic: FxHashMap::default(),
            offset: 0.0,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn add_linear(&mut self, var: usize, weight: f64) {
        self.linear[var] += weight;
    }

    pub fn add_quadratic(&mut self, a: usize, b: usize, weight: f64) {
        debug_assert!(a != b, "diagonal terms belong in `add_linear` (x^2 = x)");
        let key = if a < b {
            (a as u32, b as u32)
        } else {
            (b as u32, a as u32)
        };
        *self.quadratic.entry(key).or_insert(0.0) += weight;
    }

    /// Penalty `weight * (sum(vars) - 1)^2`, expanded with x^2 = x:
    /// `-x_a` per variable, `+2 x_a x_b` per pair, `+1` constant.
    pub fn add_exactly_one_penalty(&mut self, vars: &[usize], weight: f64) {
        for (i, &a) in vars.iter().enumerate() {
            self.add_linear(a, -weight);
            for &b in &vars[i + 1..] {
                self.add_quadratic(a, b, 2.0 * weight);
            }
        }
        self.offset += weight;
    }

    /// Penalty `weight * (sum(plus) - sum(minus))^2`.
    pub fn add_balance_penalty(&mut self, plus: &[usize], minus: &[usize], weight: f64) {
        for side in [plus, minus] {
            for (i, &a) in side.iter().enumerate() {
                self.add_linear(a, weight);
                for &b in &side[i + 1..] {
                    self.add_quadratic(a, b, 2.0 * weight);
                }
            }
        }

        for &a in plus {
            for &b in minus {
                self.add_quadratic(a, b, -2.0 * weight);
            }
        }
    }

    pub fn energy(&self, state: u64) -> f64 {
        let mut energy = self.offset;

        let mut bits = state & mask(self.num_variables);
        while bits != 0 {
            let var = bits.trailing_zeros() as usize;
            energy += self.linear[var];
            bits &= bits - 1;
        }

        for (&(a, b), &weight) in &self.quadratic {
            if state & (1 << a) != 0 && state & (1 << b) != 0 {
                energy += weight;
            }
        }

        energy
    }
}

fn mask(num_variables: usize) -> u64 {
    if num_variables == 64 {
        u64::MAX
    } else {
        (1u64 << num_variables) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_sums_active_terms() {
        let mut qubo = Qubo::new(3);
        qubo.add_linear(0, 1.0);
        qubo.add_linear(1, 2.0);
        qubo.add_linear(2, 4.0);
        qubo.add_quadratic(0, 2, 10.0);

        assert_eq!(qubo.energy(0b000), 0.0);
        assert_eq!(qubo.energy(0b001), 1.0);
        assert_eq!(qubo.energy(0b011), 3.0);
        assert_eq!(qubo.energy(0b101), 15.0);
        assert_eq!(qubo.energy(0b111), 17.0);
    }

    #[test]
    fn test_exactly_one_penalty_is_zero_only_when_satisfied() {
        let mut qubo = Qubo::new(3);
        qubo.add_exactly_one_penalty(&[0, 1, 2], 5.0);

        assert_eq!(qubo.energy(0b001), 0.0);
        assert_eq!(qubo.energy(0b010), 0.0);
        assert_eq!(qubo.energy(0b000), 5.0); // (0 - 1)^2
        assert_eq!(qubo.energy(0b011), 5.0); // (2 - 1)^2
        assert_eq!(qubo.energy(0b111), 20.0); // (3 - 1)^2
    }

    #[test]
    fn test_balance_penalty_is_zero_when_sides_match() {
        let mut qubo = Qubo::new(4);
        qubo.add_balance_penalty(&[0, 1], &[2, 3], 3.0);

        assert_eq!(qubo.energy(0b0000), 0.0); // 0 == 0
        assert_eq!(qubo.energy(0b0101), 0.0); // 1 == 1
        assert_eq!(qubo.energy(0b1111), 0.0); // 2 == 2
        assert_eq!(qubo.energy(0b0001), 3.0); // (1 - 0)^2
        assert_eq!(qubo.energy(0b0011), 12.0); // (2 - 0)^2
    }

    #[test]
    fn test_quadratic_terms_merge_regardless_of_order() {
        let mut qubo = Qubo::new(2);
        qubo.add_quadratic(0, 1, 1.0);
        qubo.add_quadratic(1, 0, 1.0);

        assert_eq!(qubo.energy(0b11), 2.0);
    }
}
