pub mod brackets;
pub mod debt_in_front;
pub mod risk;
