pub mod atomic;
pub mod naming;
