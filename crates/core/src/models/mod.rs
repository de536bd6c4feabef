pub mod holding;
pub mod portfolio;
