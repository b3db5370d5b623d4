pub mod dividends_model;
pub mod dividends_service;

pub use dividends_model::DividendIncome;
pub use dividends_service::DividendAllocator;
