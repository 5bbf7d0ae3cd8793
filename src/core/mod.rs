// Core modules implementing batch sorting and error modeling.
pub mod error;
pub mod sort;
