//! Exit code constants for the lessonbook CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, config, missing file or attribute)
//! - 2: Evaluation failure (bad `nix eval` invocation or evaluator error)
//! - 3: Run failure (sandboxed script failed or toolset incomplete)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, missing lesson inputs.
pub const USER_ERROR: i32 = 1;

/// Evaluation failure: malformed `nix eval` invocation or evaluator error.
pub const EVAL_FAILURE: i32 = 2;

/// Run failure: a sandboxed script exited non-zero or a tool is missing.
pub const RUN_FAILURE: i32 = 3;
