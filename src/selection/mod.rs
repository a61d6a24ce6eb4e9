pub mod budgeting;
pub mod tokens;

pub use budgeting::{apply_budget, BudgetResult};
pub use tokens::{ApproxTokenCounter, TokenCounter};
