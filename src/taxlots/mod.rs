pub mod taxlots_model;
pub mod taxlots_service;

pub use taxlots_model::{OpenLot, TaxClass, TaxLotReport};
pub use taxlots_service::TaxLotMatcher;
