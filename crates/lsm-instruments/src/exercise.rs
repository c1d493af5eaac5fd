//! Exercise rights and their resolution onto a simulation grid.
//!
//! An [`Exercise`] says *when* an option may be exercised in continuous
//! time. Pricing on a grid of `NT` equal steps needs the discrete
//! [`ExerciseSchedule`]: the ascending step indices at which exercise is
//! allowed. Step `0` (today) is never an exercise date and the maturity
//! step `NT` always is.

use lsm_core::{ensure, Result, Size, Time};
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, PartialEq)]
pub enum Exercise {
    /// Exercisable only at maturity.
    European,
    /// Exercisable at any time up to maturity, approximated on the grid by
    /// every `M`-th step.
    American,
    /// Exercisable at the given times (in years) and at maturity.
    Bermudan(Vec<Time>),
}

impl Exercise {
    /// Resolve onto a grid of `steps` equal steps spanning `maturity`.
    ///
    /// For `American`, every `frequency`-th step (`M, 2M, ...`) before
    /// maturity is an exercise date. Bermudan times are rounded to the
    /// nearest grid step; times at or beyond maturity collapse onto the
    /// maturity step.
    pub fn schedule(&self, steps: Size, maturity: Time, frequency: Size) -> Result<ExerciseSchedule> {
        ensure!(steps > 0, "number of time steps must be positive");
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        ensure!(frequency > 0, "exercise frequency must be positive");

        let mut dates: Vec<Size> = match self {
            Self::European => Vec::new(),
            Self::American => (1..)
                .map(|k| k * frequency)
                .take_while(|&s| s < steps)
                .collect(),
            Self::Bermudan(times) => {
                let dt = maturity / steps as Time;
                let mut resolved = Vec::with_capacity(times.len());
                for &t in times {
                    ensure!(t > 0.0, "exercise times must be positive, got {t}");
                    let step = ((t / dt).round() as Size).clamp(1, steps);
                    resolved.push(step);
                }
                resolved
            }
        };
        dates.push(steps);
        dates.sort_unstable();
        dates.dedup();
        Ok(ExerciseSchedule { steps: dates })
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::European => write!(f, "European"),
            Self::American => write!(f, "American"),
            Self::Bermudan(times) => write!(f, "Bermudan({} dates)", times.len()),
        }
    }
}

/// Ascending grid steps at which exercise is allowed; the last entry is
/// the maturity step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseSchedule {
    steps: Vec<Size>,
}

impl ExerciseSchedule {
    /// All exercise steps, maturity included.
    pub fn steps(&self) -> &[Size] {
        &self.steps
    }

    /// The maturity step `NT`.
    pub fn terminal(&self) -> Size {
        // never empty: `schedule` always pushes the maturity step
        self.steps[self.steps.len() - 1]
    }

    /// Exercise steps strictly before maturity, ascending.
    pub fn early_steps(&self) -> &[Size] {
        &self.steps[..self.steps.len() - 1]
    }

    /// Whether maturity is the only exercise date.
    pub fn is_european(&self) -> bool {
        self.steps.len() == 1
    }
}
