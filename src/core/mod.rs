pub mod ledger;
pub mod lifecycle;

pub use ledger::{BalanceLedger, LeaveBalance};
pub use lifecycle::RequestLifecycle;
