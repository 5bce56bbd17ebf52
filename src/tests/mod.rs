pub mod common;
pub mod startup;
