use crate::error::RetroplanError;
use serde::{de::DeserializeOwned, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + DeserializeOwned + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), RetroplanError>;
}

pub(crate) fn check_probability(section: &str, name: &str, value: f64) -> Result<(), RetroplanError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RetroplanError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, name, value
        )));
    }
    Ok(())
}
