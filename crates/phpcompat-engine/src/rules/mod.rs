//! The rule catalogue
//!
//! Rules are grouped by what they look for: features that newer versions
//! added, features that newer versions deprecated or removed, and
//! constructs that became forbidden.

pub mod forbidden;
pub mod new;
pub mod removed;

mod support;
