//! Configuration access port trait.

/// Typed reads over a sectioned key/value store.
///
/// Numeric getters return `Ok(None)` for an absent key and `Err` with a
/// description when the value is present but malformed.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;
    fn sections(&self) -> Vec<String>;
}
