//! Probability distributions.

mod normal;

pub(crate) use normal::acklam_inverse;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
