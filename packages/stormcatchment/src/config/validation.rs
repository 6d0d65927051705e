//! Configuration validation
//!
//! Every config section implements [`Validatable`]; `StormConfig` validates
//! each section and then the cross-section rules.

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use stormcatchment::config::Validatable;
///
/// fn build<C: Validatable>(config: C) -> Result<Thing, ConfigError> {
///     config.validate()?;
///     // ...
/// }
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid
    fn validate(&self) -> ConfigResult<()>;

    /// Section name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}
