//! Contract-violation diagnostics.
//!
//! `shapetrack`'s API is contract-enforced: passing an argument that
//! violates a movement operation's precondition is a programming error,
//! not a recoverable failure, and is reported by panicking (see the
//! crate's error handling design). This module gives every such panic a
//! single, uniformly-shaped message instead of letting each call site
//! format its own.

use std::fmt;

/// Describes a single contract violation: which operation was called,
/// which argument was at fault, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    pub(crate) operation: &'static str,
    pub(crate) argument: &'static str,
    pub(crate) reason: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shapetrack: {}: {}: {}",
            self.operation, self.argument, self.reason
        )
    }
}

impl std::error::Error for ContractViolation {}

/// Builds a [`ContractViolation`] and panics with it.
///
/// ```should_panic
/// shapetrack::error::contract_violation(
///     "reshape",
///     "new_shape",
///     format!("product mismatch: {:?} -> {:?}", (2, 3), (4,)),
/// );
/// ```
#[cold]
#[track_caller]
pub fn contract_violation(operation: &'static str, argument: &'static str, reason: String) -> ! {
    panic!(
        "{}",
        ContractViolation {
            operation,
            argument,
            reason,
        }
    )
}

macro_rules! ensure {
    ($cond:expr, $operation:expr, $argument:expr, $($reason:tt)*) => {
        if !$cond {
            $crate::error::contract_violation($operation, $argument, format!($($reason)*));
        }
    };
}

pub(crate) use ensure;
