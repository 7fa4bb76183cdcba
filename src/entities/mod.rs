pub mod business;

/// A business as served to clients, whether read from storage or generated.
pub use business::Model as Business;
pub use business::BusinessType;
