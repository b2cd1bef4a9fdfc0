pub mod rule;
pub mod table;

pub use rule::ProfitRule;
pub use table::{RuleMatch, RuleTable};
