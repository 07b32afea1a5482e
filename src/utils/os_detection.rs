/// Whether the host operating system is 64-bit.
///
/// A 64-bit build can only run on a 64-bit OS. A 32-bit build running under WOW64 sees
/// `PROCESSOR_ARCHITEW6432` set by the system.
pub fn is_64bit_os() -> bool {
    is_64bit_os_from(
        cfg!(target_pointer_width = "64"),
        std::env::var_os("PROCESSOR_ARCHITEW6432").is_some(),
    )
}

fn is_64bit_os_from(is_64bit_process: bool, wow64_marker_present: bool) -> bool {
    is_64bit_process || wow64_marker_present
}
