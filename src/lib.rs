pub mod batch;
pub mod container;
pub mod viewer;
