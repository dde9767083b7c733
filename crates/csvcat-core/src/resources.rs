//! Batch job resource choices and the walltime estimate derived from them

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const IMAGES_PER_BATCH: RangeInclusive<u32> = 1..=300;
pub const MINUTES_PER_IMAGE: RangeInclusive<u32> = 1..=30;
pub const CPUS_PER_NODE: RangeInclusive<u32> = 1..=10;
pub const RAM_PER_WORKER_GB: RangeInclusive<u32> = 1..=256;

/// Resources requested for one image-processing batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResources {
    pub images_per_batch: u32,
    pub minutes_per_image: u32,
    pub cpus_per_node: u32,
    pub ram_per_worker_gb: u32,
}

impl Default for JobResources {
    fn default() -> Self {
        Self {
            images_per_batch: 20,
            minutes_per_image: 5,
            cpus_per_node: 1,
            ram_per_worker_gb: 4,
        }
    }
}

impl JobResources {
    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<()> {
        check("images_per_batch", self.images_per_batch, IMAGES_PER_BATCH)?;
        check("minutes_per_image", self.minutes_per_image, MINUTES_PER_IMAGE)?;
        check("cpus_per_node", self.cpus_per_node, CPUS_PER_NODE)?;
        check("ram_per_worker_gb", self.ram_per_worker_gb, RAM_PER_WORKER_GB)
    }

    /// Expected walltime of one batch in minutes
    pub fn walltime_minutes(&self) -> u64 {
        u64::from(self.images_per_batch) * u64::from(self.minutes_per_image)
    }
}

impl std::fmt::Display for JobResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Walltime {}*{} = {} min",
            self.images_per_batch,
            self.minutes_per_image,
            self.walltime_minutes()
        )
    }
}

fn check(name: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidResource {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_walltime() {
        let job = JobResources::default();
        assert!(job.validate().is_ok());
        assert_eq!(job.walltime_minutes(), 100);
        assert_eq!(job.to_string(), "Walltime 20*5 = 100 min");
    }

    #[test]
    fn test_upper_bounds() {
        let job = JobResources {
            images_per_batch: 300,
            minutes_per_image: 30,
            cpus_per_node: 10,
            ram_per_worker_gb: 256,
        };
        assert!(job.validate().is_ok());
        assert_eq!(job.walltime_minutes(), 9000);
    }

    #[test]
    fn test_out_of_range() {
        let job = JobResources {
            cpus_per_node: 0,
            ..JobResources::default()
        };
        let err = job.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidResource {
                name: "cpus_per_node",
                value: 0,
                ..
            }
        ));

        let job = JobResources {
            ram_per_worker_gb: 512,
            ..JobResources::default()
        };
        assert!(job.validate().is_err());
    }
}
