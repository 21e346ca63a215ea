use std::ops::ControlFlow;

/// Derivative-free simplex search (Nelder-Mead). The QAOA objective is a
/// sampled expectation value, so anything gradient-based is off the table.
pub struct NelderMeadParams {
    pub max_iterations: usize,
    /// Offset of the initial simplex vertices from the starting point.
    pub initial_step: f64,
    /// Stop once the value spread across the simplex falls below this.
    pub tolerance: f64,
}

impl Default for NelderMeadParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            initial_step: 0.1,
            tolerance: 1e-6,
        }
    }
}

pub struct Minimized {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    /// True when `control` broke the search off before convergence. The
    /// returned point is still the best one seen.
    pub interrupted: bool,
}

struct Vertex {
    point: Vec<f64>,
    value: f64,
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimizes `objective` starting from `x0`. `control` runs before every
/// objective-heavy step with the current iteration count; returning
/// `ControlFlow::Break` stops the search (deadline or cancellation).
pub fn minimize<F, C>(
    params: &NelderMeadParams,
    x0: &[f64],
    mut objective: F,
    mut control: C,
) -> Minimized
where
    F: FnMut(&[f64]) -> f64,
    C: FnMut(usize) -> ControlFlow<()>,
{
    let dim = x0.len();
    let mut interrupted = false;

    let mut simplex = Vec::with_capacity(dim + 1);
    simplex.push(Vertex {
        point: x0.to_vec(),
        value: objective(x0),
    });
    for i in 0..dim {
        if control(0).is_break() {
            interrupted = true;
            break;
        }
        let mut point = x0.to_vec();
        point[i] += params.initial_step;
        let value = objective(&point);
        simplex.push(Vertex { point, value });
    }

    let mut iterations = 0;
    while !interrupted && iterations < params.max_iterations {
        if control(iterations).is_break() {
            interrupted = true;
            break;
        }
        iterations += 1;

        simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
        if simplex[dim].value - simplex[0].value < params.tolerance {
            break;
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|axis| simplex[..dim].iter().map(|v| v.point[axis]).sum::<f64>() / dim as f64)
            .collect();
        let worst = &simplex[dim];

        let reflected = blend(&centroid, &worst.point, -REFLECT);
        let reflected_value = objective(&reflected);

        if reflected_value < simplex[0].value {
            let expanded = blend(&centroid, &worst.point, -EXPAND);
            let expanded_value = objective(&expanded);
            simplex[dim] = if expanded_value < reflected_value {
                Vertex { point: expanded, value: expanded_value }
            } else {
                Vertex { point: reflected, value: reflected_value }
            };
            continue;
        }

        if reflected_value < simplex[dim - 1].value {
            simplex[dim] = Vertex { point: reflected, value: reflected_value };
            continue;
        }

        let contracted = if reflected_value < worst.value {
            blend(&centroid, &reflected, CONTRACT)
        } else {
            blend(&centroid, &worst.point, CONTRACT)
        };
        let contracted_value = objective(&contracted);

        if contracted_value < worst.value.min(reflected_value) {
            simplex[dim] = Vertex { point: contracted, value: contracted_value };
            continue;
        }

        // Contraction failed, shrink everything towards the best vertex.
        let best = simplex[0].point.clone();
        for vertex in simplex.iter_mut().skip(1) {
            vertex.point = blend(&best, &vertex.point, SHRINK);
            vertex.value = objective(&vertex.point);
        }
    }

    simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
    let best = simplex.swap_remove(0);

    Minimized {
        point: best.point,
        value: best.value,
        iterations,
        interrupted,
    }
}

/// `anchor + weight * (target - anchor)` componentwise.
fn blend(anchor: &[f64], target: &[f64], weight: f64) -> Vec<f64> {
    anchor
        .iter()
        .zip(target)
        .map(|(a, t)| a + weight * (t - a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_on_a_quadratic_bowl() {
        let params = NelderMeadParams {
            max_iterations: 300,
            initial_step: 0.5,
            tolerance: 1e-12,
        };

        let result = minimize(
            &params,
            &[0.0, 0.0],
            |x| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2),
            |_| ControlFlow::Continue(()),
        );

        assert!(!result.interrupted);
        assert!((result.point[0] - 3.0).abs() < 1e-4);
        assert!((result.point[1] + 1.0).abs() < 1e-4);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_break_stops_early_and_keeps_the_best_point() {
        // zero tolerance: the search can only stop via the control callback
        let params = NelderMeadParams {
            tolerance: 0.0,
            ..NelderMeadParams::default()
        };
        let mut calls = 0;

        let result = minimize(
            &params,
            &[5.0],
            |x| x[0] * x[0],
            |_| {
                calls += 1;
                if calls > 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
            },
        );

        assert!(result.interrupted);
        assert!(result.iterations < params.max_iterations);
        assert!(result.value <= 25.0);
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let params = NelderMeadParams {
            max_iterations: 5,
            initial_step: 0.1,
            tolerance: 0.0,
        };

        let result = minimize(
            &params,
            &[1.0, 1.0],
            |x| x[0].powi(2) + x[1].powi(2),
            |_| ControlFlow::Continue(()),
        );

        assert!(!result.interrupted);
        assert_eq!(result.iterations, 5);
    }
}
