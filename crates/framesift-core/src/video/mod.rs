pub mod frame;
pub mod probe;
pub mod source;
