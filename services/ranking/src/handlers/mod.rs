pub mod ops;
pub mod rankings;
