//! Convolution kernels for the local density estimate.
//!
//! Each kernel maps a neighbour distance to a density contribution. By
//! convention a point always contributes weight `1.0` to its own density,
//! whatever the kernel parameters.

/// Weighting function applied to neighbour distances during density
/// estimation.
///
/// # Examples
/// ```
/// use tessera_core::DensityKernel;
///
/// let kernel = DensityKernel::default();
/// // Self-contribution is always 1, neighbours get the flat height.
/// assert_eq!(kernel.weigh(0.0, true), 1.0);
/// assert_eq!(kernel.weigh(3.0, false), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DensityKernel {
    /// Constant contribution for every neighbour within the critical radius.
    Flat {
        /// Contribution of each neighbour.
        height: f32,
    },
    /// Gaussian bump centred on `mean` with spread `std_dev`.
    Gaussian {
        /// Distance at which the contribution peaks.
        mean: f32,
        /// Spread of the bump; must be positive.
        std_dev: f32,
        /// Peak contribution.
        amplitude: f32,
    },
    /// Exponential decay `amplitude * exp(-rate * distance)`.
    Exponential {
        /// Decay rate per unit distance.
        rate: f32,
        /// Contribution at zero distance.
        amplitude: f32,
    },
}

impl Default for DensityKernel {
    /// The flat kernel with height `0.5`, matching the conventional default
    /// for this algorithm family.
    fn default() -> Self {
        Self::Flat { height: 0.5 }
    }
}

impl DensityKernel {
    /// Returns the density contribution of a neighbour at `distance`.
    ///
    /// `is_self` marks the self-pair, which contributes `1.0` regardless of
    /// the kernel.
    #[must_use]
    pub fn weigh(&self, distance: f32, is_self: bool) -> f32 {
        if is_self {
            return 1.0;
        }
        match *self {
            Self::Flat { height } => height,
            Self::Gaussian {
                mean,
                std_dev,
                amplitude,
            } => {
                let offset = distance - mean;
                amplitude * (-(offset * offset) / (2.0 * std_dev * std_dev)).exp()
            }
            Self::Exponential { rate, amplitude } => amplitude * (-rate * distance).exp(),
        }
    }

    /// Checks the kernel parameters, returning a description of the first
    /// violation found.
    pub(crate) fn validate(&self) -> std::result::Result<(), &'static str> {
        match *self {
            Self::Flat { height } => {
                if !height.is_finite() || height < 0.0 {
                    return Err("flat kernel height must be finite and non-negative");
                }
            }
            Self::Gaussian {
                mean,
                std_dev,
                amplitude,
            } => {
                if !mean.is_finite() {
                    return Err("gaussian kernel mean must be finite");
                }
                if !std_dev.is_finite() || std_dev <= 0.0 {
                    return Err("gaussian kernel std_dev must be finite and positive");
                }
                if !amplitude.is_finite() || amplitude < 0.0 {
                    return Err("gaussian kernel amplitude must be finite and non-negative");
                }
            }
            Self::Exponential { rate, amplitude } => {
                if !rate.is_finite() || rate < 0.0 {
                    return Err("exponential kernel rate must be finite and non-negative");
                }
                if !amplitude.is_finite() || amplitude < 0.0 {
                    return Err("exponential kernel amplitude must be finite and non-negative");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_contribution_overrides_kernel_shape() {
        let kernel = DensityKernel::Gaussian {
            mean: 0.0,
            std_dev: 1.0,
            amplitude: 7.0,
        };
        assert_eq!(kernel.weigh(0.0, true), 1.0);
    }

    #[test]
    fn gaussian_peaks_at_mean() {
        let kernel = DensityKernel::Gaussian {
            mean: 2.0,
            std_dev: 0.5,
            amplitude: 3.0,
        };
        let at_mean = kernel.weigh(2.0, false);
        assert!((at_mean - 3.0).abs() < 1e-6);
        assert!(kernel.weigh(3.0, false) < at_mean);
    }

    #[test]
    fn exponential_decays_with_distance() {
        let kernel = DensityKernel::Exponential {
            rate: 1.0,
            amplitude: 2.0,
        };
        assert!((kernel.weigh(0.0, false) - 2.0).abs() < 1e-6);
        assert!(kernel.weigh(1.0, false) < kernel.weigh(0.5, false));
    }

    #[test]
    fn validate_rejects_non_positive_gaussian_spread() {
        let kernel = DensityKernel::Gaussian {
            mean: 0.0,
            std_dev: 0.0,
            amplitude: 1.0,
        };
        assert!(kernel.validate().is_err());
    }

    #[test]
    fn validate_accepts_default() {
        assert!(DensityKernel::default().validate().is_ok());
    }
}
