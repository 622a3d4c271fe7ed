use crate::config::FusionParams;
use crate::error::GpResult;
use crate::grid::{CellClass, Kernel};

pub const FILM_KERNEL: Kernel = [[2.0, 2.0, 2.0], [2.0, 5.0, 2.0], [2.0, 2.0, 2.0]];
pub const AGGREGATE_KERNEL: Kernel = [[-1.0, -1.0, -1.0], [-1.0, -2.0, -1.0], [-1.0, -1.0, -1.0]];
pub const ICE_KERNEL: Kernel = [[-2.0, -2.0, -2.0], [-2.0, -5.0, -2.0], [-2.0, -2.0, -2.0]];
pub const CARBON_KERNEL: Kernel = [[0.0, 0.0, 0.0], [0.0, -2.0, 0.0], [0.0, 0.0, 0.0]];

/// One 3x3 spatial weighting per classifier channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionKernels {
    pub film: Kernel,
    pub aggregate: Kernel,
    pub ice: Kernel,
    pub carbon: Kernel,
}

impl Default for FusionKernels {
    fn default() -> Self {
        Self {
            film: FILM_KERNEL,
            aggregate: AGGREGATE_KERNEL,
            ice: ICE_KERNEL,
            carbon: CARBON_KERNEL,
        }
    }
}

impl FusionKernels {
    pub fn from_params(params: &FusionParams) -> GpResult<Self> {
        Ok(Self {
            film: params.get_film_kernel()?,
            aggregate: params.get_aggregate_kernel()?,
            ice: params.get_ice_kernel()?,
            carbon: params.get_carbon_kernel()?,
        })
    }

    #[inline(always)]
    pub fn get(&self, class: CellClass) -> &Kernel {
        match class {
            CellClass::Film => &self.film,
            CellClass::Aggregate => &self.aggregate,
            CellClass::Ice => &self.ice,
            CellClass::Carbon => &self.carbon,
        }
    }
}
