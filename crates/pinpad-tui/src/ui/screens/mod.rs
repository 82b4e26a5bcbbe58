//! Screen modules for different views

pub mod enter;
pub mod home;
pub mod locked;
pub mod reset;
pub mod set;
