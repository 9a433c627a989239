pub mod dividend;
pub mod fees;
pub mod order;
pub mod position;
pub mod t0;
