//! Disk and load sampling via sysinfo

use std::path::Path;

use sysinfo::{Disks, System};

use crate::error::SampleError;
use crate::models::{DiskUsage, LoadSnapshot};

/// A mounted filesystem as reported by the host
#[derive(Debug, Clone, PartialEq)]
pub struct FilesystemEntry {
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Pick the filesystem holding `path`: the one with the longest mount point
/// that is a prefix of the path.
pub fn select_filesystem(
    entries: &[FilesystemEntry],
    path: &Path,
) -> Result<DiskUsage, SampleError> {
    let entry = entries
        .iter()
        .filter(|entry| path.starts_with(&entry.mount_point))
        .max_by_key(|entry| Path::new(&entry.mount_point).components().count())
        .ok_or_else(|| SampleError::NoFilesystem {
            path: path.display().to_string(),
        })?;

    if entry.total_bytes == 0 {
        return Err(SampleError::ZeroCapacity {
            mount: entry.mount_point.clone(),
        });
    }

    Ok(DiskUsage {
        mount_point: entry.mount_point.clone(),
        total_bytes: entry.total_bytes,
        available_bytes: entry.available_bytes,
    })
}

/// Usage of the filesystem holding `path`
pub(super) fn disk_usage(path: &Path) -> Result<DiskUsage, SampleError> {
    let disks = Disks::new_with_refreshed_list();
    let entries: Vec<FilesystemEntry> = disks
        .iter()
        .map(|disk| FilesystemEntry {
            mount_point: disk.mount_point().to_string_lossy().to_string(),
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
        .collect();

    select_filesystem(&entries, path)
}

/// Build a load snapshot, rejecting a zero core count
pub(crate) fn load_snapshot(load_average_1m: f64, cores: usize) -> Result<LoadSnapshot, SampleError> {
    if cores == 0 {
        return Err(SampleError::NoCpus);
    }
    Ok(LoadSnapshot {
        load_average_1m,
        cores,
    })
}

pub(super) fn load() -> Result<LoadSnapshot, SampleError> {
    let mut system = System::new();
    system.refresh_cpu();
    let load_avg = System::load_average();
    load_snapshot(load_avg.one, system.cpus().len())
}
