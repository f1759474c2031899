//! Common error infrastructure for battle-core.
//!
//! Errors in this crate are reserved for API misuse (stepping a battle that was
//! never started, asking the effect factory for a kind nobody registered).
//! Problems that arise *inside* a turn never surface as errors: they end the
//! encounter in a well-defined terminal state instead (see
//! [`crate::battle::AbortReason`]).

use crate::combatant::CombatantId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted encounter state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// Provides a uniform interface for error classification across the crate.
/// Use `#[derive(thiserror::Error)]` for the Display/Error impl and classify
/// severity by recoverability, not impact.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors surfaced by the battle API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("battle has not been started")]
    NotStarted,

    #[error("battle has already been started")]
    AlreadyStarted,

    #[error("unknown status effect kind '{0}'")]
    UnknownEffect(String),

    #[error("combatant {0} is not part of this battle")]
    CombatantNotFound(CombatantId),
}

impl CombatError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotStarted | Self::AlreadyStarted => ErrorSeverity::Recoverable,
            Self::UnknownEffect(_) | Self::CombatantNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AlreadyStarted => "already_started",
            Self::UnknownEffect(_) => "unknown_effect",
            Self::CombatantNotFound(_) => "combatant_not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_are_recoverable() {
        assert!(BattleError::NotStarted.severity().is_recoverable());
        assert!(!BattleError::UnknownEffect("frostbite".into()).severity().is_internal());
        assert_eq!(
            BattleError::CombatantNotFound(CombatantId(7)).error_code(),
            "combatant_not_found"
        );
    }
}
