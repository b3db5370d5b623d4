pub mod adjustments_errors;
pub mod adjustments_service;

pub use adjustments_errors::AdjustmentError;
pub use adjustments_service::CorporateActionNormalizer;
