pub mod policy;
pub mod selector;

pub use policy::SelectionPolicy;
pub use selector::{select, InclusionMask, Selector, ShuffleSelector};
