pub mod calculator;
pub mod policy;

pub use calculator::{calculate_emi, round_money, CalculatorError, EmiInput, EmiResult};
