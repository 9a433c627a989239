pub mod traits;

// Concrete provider implementations
pub mod static_schedule;
