pub mod reference_model;

pub use reference_model::{DividendEvent, ReferenceStore, SecurityProfile, SplitEvent};
