//! Discovery: eligibility rules and application scanning

pub mod eligibility;
pub mod scanner;

pub use eligibility::is_eligible;
pub use scanner::{AppModules, ClassEntry, DiscoveryIndex, DiscoveryScanner, ModuleClasses};
