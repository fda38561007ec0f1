//! Exit codes for the cookiedialog CLI.
//! These codes are part of the public contract for scripts driving the CLI.

pub const SUCCESS: i32 = 0;
pub const NO_CONSENT: i32 = 1; // `status` found no valid record on file
pub const CONFIG_ERROR: i32 = 2; // Invalid config, bad arguments or internal error
