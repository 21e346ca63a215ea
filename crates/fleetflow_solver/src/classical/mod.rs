pub mod solver;
pub mod two_opt;
