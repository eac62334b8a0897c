//! Classification pipeline: walker, member classifier, assembler
//!
//! A classification request is stateless relative to any other, so a
//! batch of classes can be processed in parallel with no coordination.

pub mod assemble;
pub mod member;
pub mod report;
pub mod walker;

pub use assemble::assemble;
pub use member::{classify_member, Classified};
pub use report::{
    AttributeRecord, ClassReport, DefiningClass, FieldRecord, LineSpan, MemberMap, MethodRecord,
    OtherRecord,
};
pub use walker::HierarchyWalker;

use crate::config::Config;
use crate::discovery::is_eligible;
use crate::error::Result;
use crate::registry::{ClassRegistry, Resolved};
use rayon::prelude::*;

/// The classification pipeline for one registry and rule set
pub struct Classifier<'a> {
    registry: &'a ClassRegistry,
    config: &'a Config,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a ClassRegistry, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Walk and assemble the class at `path`.
    ///
    /// Returns `Ok(None)` when the class is not eligible for
    /// documentation, which is an outcome, not a failure. A path that
    /// cannot be resolved is an error.
    ///
    /// Eligibility is checked twice on purpose: once against the path
    /// string, once against the resolved class's own module attribute.
    /// The two can disagree for re-exports, so neither check subsumes
    /// the other.
    pub fn walk_and_assemble(&self, path: &str) -> Result<Option<ClassReport>> {
        if !is_eligible(path, self.config) {
            return Ok(None);
        }

        let class = match self.registry.resolve(path)? {
            Resolved::Class(class) => class,
            Resolved::Module(_) => return Err(crate::error::Error::not_a_class(path)),
        };

        let eligibility = &self.config.eligibility;
        let under_base = eligibility
            .bases
            .iter()
            .any(|base| class.module.starts_with(base.as_str()));
        let included = eligibility.include.iter().any(|p| p == path);
        if !under_base && !included {
            return Ok(None);
        }

        let walker = HierarchyWalker::new(self.registry);
        let raw = walker.walk(path)?;
        Ok(Some(assemble(raw)))
    }

    /// Classify a batch of paths in parallel, preserving input order.
    ///
    /// Each item carries its own outcome; one class's failure never
    /// aborts the rest of the batch.
    pub fn classify_batch(&self, paths: &[String]) -> Vec<(String, Result<Option<ClassReport>>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.walk_and_assemble(path)))
            .collect()
    }
}
