// Windows-specific installation helpers
//
// Registry access for locating the IDE. Keys are opened read-only on HKLM.

use log::debug;
use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};
use winreg::RegKey;

/// Read a string value under `HKLM\<key_path>`. Missing keys, missing values and
/// non-string values all read as `None`.
pub fn read_hklm_string(key_path: &str, value_name: &str) -> Option<String> {
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = match hklm.open_subkey_with_flags(key_path, KEY_READ) {
        Ok(k) => k,
        Err(e) => {
            debug!(
                "[PHASE: locate] [STEP: registry] open_subkey failed (key=HKLM\\{}, err={})",
                key_path, e
            );
            return None;
        }
    };

    match key.get_value::<String, _>(value_name) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(
                "[PHASE: locate] [STEP: registry] get_value failed (key=HKLM\\{}, value={}, err={})",
                key_path, value_name, e
            );
            None
        }
    }
}
