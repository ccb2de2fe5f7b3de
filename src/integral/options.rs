use eyre::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Where the per-element work of an integral is carried out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSpace {
    /// A plain loop over elements on the calling thread.
    Serial,
    /// Elements are distributed across the `rayon` thread pool.
    #[default]
    Cpu,
    /// Accelerator execution. No kernels are available for it.
    Gpu,
}

impl Display for ExecutionSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu => write!(f, "gpu"),
        }
    }
}

/// Configuration shared by domain and boundary integrals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegralOptions {
    pub execution_space: ExecutionSpace,
    /// Minimum number of elements handled by a single parallel task.
    pub min_elements_per_task: usize,
}

impl Default for IntegralOptions {
    fn default() -> Self {
        Self {
            execution_space: ExecutionSpace::default(),
            min_elements_per_task: 50,
        }
    }
}

impl IntegralOptions {
    pub fn serial() -> Self {
        Self {
            execution_space: ExecutionSpace::Serial,
            ..Self::default()
        }
    }

    pub fn with_execution_space(self, execution_space: ExecutionSpace) -> Self {
        Self {
            execution_space,
            ..self
        }
    }

    /// Checks that kernels exist for the requested configuration.
    pub fn validate(&self) -> eyre::Result<()> {
        match self.execution_space {
            ExecutionSpace::Serial | ExecutionSpace::Cpu => {}
            ExecutionSpace::Gpu => bail!(
                "No integral kernels are available for execution space {}",
                self.execution_space
            ),
        }
        if self.min_elements_per_task == 0 {
            bail!("Minimum number of elements per task must be positive");
        }
        Ok(())
    }
}
