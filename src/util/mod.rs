//! Utility modules: error-recovery retry, timeout.

pub mod retry;
pub mod timeout;
