//! Error taxonomy shared by every public operation.
//!
//! Soft warnings (finishing an idle animation, unknown color channels) are
//! not represented here: they are logged with `log::warn!` and the call
//! becomes a no-op.

/// Convenience result type used across the framework.
pub type FrameworkResult<T> = Result<T, FrameworkError>;

#[derive(thiserror::Error, Debug)]
pub enum FrameworkError {
    /// A public operation received a value of the wrong shape.
    #[error("argument type error: {0}")]
    ArgumentType(String),

    /// An animation was started without a valid target, field or bounds.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An animation target stopped exposing a numeric field while running.
    #[error("type assertion error: {0}")]
    TypeAssertion(String),

    /// Reading or writing a configuration file failed.
    #[error("io error: {0}")]
    Io(String),
}

impl FrameworkError {
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::ArgumentType(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn type_assertion(msg: impl Into<String>) -> Self {
        Self::TypeAssertion(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_kind() {
        let e = FrameworkError::argument("expected a number");
        assert_eq!(e.to_string(), "argument type error: expected a number");
        let e = FrameworkError::configuration("no target");
        assert_eq!(e.to_string(), "configuration error: no target");
    }

    #[test]
    fn test_result_alias_propagates() {
        fn fails() -> FrameworkResult<u8> {
            Err(FrameworkError::type_assertion("gone"))
        }
        fn outer() -> FrameworkResult<u8> {
            let v = fails()?;
            Ok(v + 1)
        }
        assert!(matches!(outer(), Err(FrameworkError::TypeAssertion(_))));
    }
}
