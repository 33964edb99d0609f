//! Exit code constants for the filegate CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config, misuse)
//! - 4: Lock acquisition failure (already locked, timeout, semaphore full)
//! - 5: Resource failure (open/sync/rename errors)
//!
//! A command run under `lock` or `semaphore` passes its own exit code through.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or API misuse.
pub const USER_ERROR: i32 = 1;

/// Lock acquisition failure: contended lock, timeout, or full semaphore.
pub const LOCK_FAILURE: i32 = 4;

/// Resource failure: the lock file or target file could not be handled.
pub const RESOURCE_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, LOCK_FAILURE, RESOURCE_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
