//! Recombining binomial lattice.

mod binomial;

pub use binomial::BinomialLattice;
