//! Monte Carlo simulation framework.
//!
//! # Overview
//!
//! * [`SimulationGrid`]: equal time steps over `[0, T]`
//! * [`PathTensor`]: simulated states, `paths × (steps + 1) × assets`
//! * [`PathSimulator`]: seeded Euler–Maruyama driver over any
//!   [`StochasticProcess`]
//! * [`McResult`]: estimator mean with its standard error

use lsm_autodiff::{mean, Scalar};
use lsm_core::{ensure, require, Real, Result, Size, Time};
use lsm_math::{GeneratorKind, Statistics};
use lsm_processes::{Correlation, StochasticProcess};

use crate::PricingConfig;

// ─── SimulationGrid ───────────────────────────────────────────────────────────

/// `steps` equal increments `dt = T / steps` over `[0, T]`.
///
/// The maturity is a scalar so that the grid itself carries the
/// sensitivity to `T`.
#[derive(Debug, Clone, Copy)]
pub struct SimulationGrid<S> {
    maturity: S,
    steps: Size,
    dt: S,
    sqrt_dt: S,
}

impl<S: Scalar> SimulationGrid<S> {
    /// Create a grid; `maturity > 0` and `steps > 0`.
    pub fn new(maturity: S, steps: Size) -> Result<Self> {
        ensure!(
            maturity.value() > 0.0,
            "maturity must be positive, got {}",
            maturity.value()
        );
        ensure!(steps > 0, "number of time steps must be positive");
        let dt = maturity / steps as Real;
        Ok(Self {
            maturity,
            steps,
            dt,
            sqrt_dt: dt.sqrt(),
        })
    }

    /// Horizon `T`.
    pub fn maturity(&self) -> S {
        self.maturity
    }

    /// Number of steps `NT`.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Step size `dt`.
    pub fn dt(&self) -> S {
        self.dt
    }

    /// `√dt`, scaling standard normals into Brownian increments.
    pub fn sqrt_dt(&self) -> S {
        self.sqrt_dt
    }

    /// Calendar time of grid column `j`.
    pub fn time(&self, j: Size) -> Time {
        j as Time * self.dt.value()
    }
}

// ─── PathTensor ───────────────────────────────────────────────────────────────

/// Simulated states of every path at every grid column.
///
/// Column `0` holds the initial states and column `steps` the states at
/// maturity. Each column is written once, when it is produced from the
/// previous one, and never modified afterwards.
#[derive(Debug, Clone)]
pub struct PathTensor<S> {
    paths: Size,
    assets: Size,
    // columns[j][p * assets + a]
    columns: Vec<Vec<S>>,
}

impl<S: Scalar> PathTensor<S> {
    /// Number of paths `Np`.
    pub fn paths(&self) -> Size {
        self.paths
    }

    /// Number of time steps `NT` (one fewer than columns).
    pub fn steps(&self) -> Size {
        self.columns.len() - 1
    }

    /// Number of underlyings.
    pub fn assets(&self) -> Size {
        self.assets
    }

    /// States of all underlyings on path `p` at column `j`.
    pub fn states(&self, p: Size, j: Size) -> &[S] {
        &self.columns[j][p * self.assets..(p + 1) * self.assets]
    }

    /// State of underlying `a` on path `p` at column `j`.
    pub fn state(&self, p: Size, j: Size, a: Size) -> S {
        self.columns[j][p * self.assets + a]
    }

    /// Column `j`, path-major.
    pub fn column(&self, j: Size) -> &[S] {
        &self.columns[j]
    }

    /// Plain values of column `j`, path-major.
    pub fn column_values(&self, j: Size) -> Vec<Real> {
        self.columns[j].iter().map(Scalar::value).collect()
    }

    /// Plain values of underlying `a` along path `p`.
    pub fn path_values(&self, p: Size, a: Size) -> Vec<Real> {
        self.columns
            .iter()
            .map(|c| c[p * self.assets + a].value())
            .collect()
    }

    /// Cross-sectional mean of underlying `a` at column `j`.
    pub fn mean_at(&self, j: Size, a: Size) -> S {
        let xs: Vec<S> = (0..self.paths).map(|p| self.state(p, j, a)).collect();
        mean(&xs)
    }
}

// ─── PathSimulator ────────────────────────────────────────────────────────────

/// Seeded Euler–Maruyama path simulator.
///
/// All standard normals for a call are drawn up front, step by step and
/// path by path, from a generator owned by that call; equal seeds
/// therefore reproduce bit-identical tensors.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    paths: Size,
    seed: u64,
    generator: GeneratorKind,
    correlation: Option<Correlation>,
}

impl PathSimulator {
    /// Simulate `paths ≥ 1` paths from `seed`.
    pub fn new(paths: Size, seed: u64) -> Result<Self> {
        ensure!(paths > 0, "number of paths must be positive");
        Ok(Self {
            paths,
            seed,
            generator: GeneratorKind::default(),
            correlation: None,
        })
    }

    /// Paths, seed and generator of `config`.
    pub fn from_config(config: &PricingConfig) -> Result<Self> {
        Ok(Self::new(config.paths, config.seed)?.with_generator(config.generator))
    }

    /// Use a different Gaussian source.
    pub fn with_generator(mut self, generator: GeneratorKind) -> Self {
        self.generator = generator;
        self
    }

    /// Correlate the Brownian drivers of a multi-asset simulation.
    pub fn with_correlation(mut self, correlation: Correlation) -> Self {
        self.correlation = Some(correlation);
        self
    }

    /// Same simulator with another seed.
    pub fn reseeded(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Number of paths.
    pub fn paths(&self) -> Size {
        self.paths
    }

    /// Seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulate one process per underlying from `initial` over `grid`.
    ///
    /// Deterministic shifts reported by a process are added to its
    /// simulated states after the whole base path has been generated.
    pub fn simulate<S: Scalar>(
        &self,
        grid: &SimulationGrid<S>,
        initial: &[S],
        processes: &[&dyn StochasticProcess<S>],
    ) -> Result<PathTensor<S>> {
        let assets = initial.len();
        require!(assets > 0, "at least one underlying is required");
        require!(
            processes.len() == assets,
            "{} initial values but {} processes",
            assets,
            processes.len()
        );
        if let Some(c) = &self.correlation {
            require!(
                c.dimension() == assets,
                "correlation of dimension {} for {} underlyings",
                c.dimension(),
                assets
            );
        }

        let np = self.paths;
        let nt = grid.steps();
        let shocks = self.draw_shocks(nt, assets);
        let sqrt_dt = grid.sqrt_dt();
        let dt = grid.dt();

        let mut columns: Vec<Vec<S>> = Vec::with_capacity(nt + 1);
        columns.push((0..np).flat_map(|_| initial.iter().copied()).collect());

        let mut states = vec![S::from_real(0.0); np];
        let mut dws = vec![S::from_real(0.0); np];
        for j in 0..nt {
            let t = grid.time(j);
            let block = &shocks[j * np * assets..(j + 1) * np * assets];
            let prev = &columns[j];
            let mut next = vec![S::from_real(0.0); np * assets];
            for (a, process) in processes.iter().enumerate() {
                for p in 0..np {
                    states[p] = prev[p * assets + a];
                    dws[p] = sqrt_dt * block[p * assets + a];
                }
                let evolved = process.evolve_column(&states, dt, &dws, t)?;
                for (p, x) in evolved.into_iter().enumerate() {
                    next[p * assets + a] = x;
                }
            }
            columns.push(next);
        }

        for (a, process) in processes.iter().enumerate() {
            if process.shift(0.0).is_none() {
                continue;
            }
            for (j, column) in columns.iter_mut().enumerate() {
                let phi = process.shift(grid.time(j)).unwrap_or(0.0);
                for p in 0..np {
                    column[p * assets + a] = column[p * assets + a] + phi;
                }
            }
        }

        tracing::trace!(paths = np, steps = nt, assets, seed = self.seed, "simulated paths");
        Ok(PathTensor {
            paths: np,
            assets,
            columns,
        })
    }

    /// Standard normals for every (step, path, asset), correlated across
    /// assets when a correlation is set.
    fn draw_shocks(&self, steps: Size, assets: Size) -> Vec<Real> {
        let mut source = self.generator.make_source(self.seed);
        let mut z = vec![0.0; steps * self.paths * assets];
        source.fill(&mut z);
        if let Some(c) = &self.correlation {
            let mut out = vec![0.0; assets];
            for chunk in z.chunks_exact_mut(assets) {
                c.correlate(chunk, &mut out);
                chunk.copy_from_slice(&out);
            }
        }
        z
    }
}

// ─── McResult ─────────────────────────────────────────────────────────────────

/// A Monte Carlo estimate.
#[derive(Debug, Clone, Copy)]
pub struct McResult<S> {
    /// Estimator mean.
    pub value: S,
    /// Standard error of the mean.
    pub std_error: Real,
    /// Number of paths.
    pub paths: Size,
}

impl<S: Scalar> McResult<S> {
    /// Mean and standard error of per-path samples.
    pub fn from_samples(samples: &[S]) -> Self {
        let stats = Statistics::from_samples(samples.iter().map(Scalar::value));
        Self {
            value: mean(samples),
            std_error: stats.error_estimate().unwrap_or(0.0),
            paths: samples.len(),
        }
    }

    /// Plain value of the estimate.
    pub fn price(&self) -> Real {
        self.value.value()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
