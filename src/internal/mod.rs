// Internal support shared across searchmap modules

pub mod error;
