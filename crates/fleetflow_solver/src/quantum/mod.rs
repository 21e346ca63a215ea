pub mod nelder_mead;
pub mod qaoa;
pub mod solver;
pub mod statevector;
