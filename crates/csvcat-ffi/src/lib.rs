//! C FFI bindings for csvcat-core
//!
//! Lets a host application (a notebook kernel, a Qt dialog, ...) pass the two
//! directories a user picked straight to the merge core.

use csvcat_core::{ErrorKind, JobResources};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_long};
use std::path::PathBuf;

/// Merge completed
pub const CSVCAT_OK: c_int = 0;
/// Input or output directory problem
pub const CSVCAT_ERR_FILESYSTEM: c_int = 1;
/// A source file is not valid CSV
pub const CSVCAT_ERR_PARSE: c_int = 2;
/// Any other failure
pub const CSVCAT_ERR_OTHER: c_int = 3;
/// Null or non UTF-8 argument
pub const CSVCAT_ERR_INVALID_ARGUMENT: c_int = -1;

unsafe fn path_arg(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(PathBuf::from)
}

/// Concatenate same-named CSV files below `infolder` into `outfolder`
///
/// Returns one of the `CSVCAT_*` status codes.
///
/// # Safety
/// - `infolder` and `outfolder` must be valid NUL-terminated C strings or null
#[no_mangle]
pub unsafe extern "C" fn csvcat_concat_csvs(
    infolder: *const c_char,
    outfolder: *const c_char,
) -> c_int {
    let (Some(infolder), Some(outfolder)) = (path_arg(infolder), path_arg(outfolder)) else {
        return CSVCAT_ERR_INVALID_ARGUMENT;
    };

    match csvcat_core::concat_csvs(&infolder, &outfolder) {
        Ok(()) => CSVCAT_OK,
        Err(e) => {
            log::error!("{}", e);
            match e.kind() {
                ErrorKind::FileSystem => CSVCAT_ERR_FILESYSTEM,
                ErrorKind::Parse => CSVCAT_ERR_PARSE,
                ErrorKind::Config => CSVCAT_ERR_OTHER,
            }
        }
    }
}

/// Walltime estimate in minutes for one batch, or -1 if a value is out of range
#[no_mangle]
pub extern "C" fn csvcat_walltime_minutes(images_per_batch: u32, minutes_per_image: u32) -> c_long {
    let job = JobResources {
        images_per_batch,
        minutes_per_image,
        ..JobResources::default()
    };

    match job.validate() {
        Ok(()) => job.walltime_minutes() as c_long,
        Err(_) => -1,
    }
}
