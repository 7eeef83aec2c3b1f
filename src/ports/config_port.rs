//! Configuration access port trait.
//!
//! Sections used by fxdca: `[simulation]`, `[data]` and `[report]`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
}
