//! Ordered chains of union, intersection and subtraction.

use super::loader::{check_files_exist, load_builder_from_file, load_inputs};
use crate::config::Context;
use crate::error::{ConfigError, Result};
use crate::prefix_set::{PrefixSet, PrefixSetBuilder};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Set operation applied to the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOperator {
    Union,
    Intersect,
    Subtract,
}

impl CombineOperator {
    pub fn apply(self, working: &mut PrefixSetBuilder, operand: &PrefixSet) {
        match self {
            CombineOperator::Union => working.merge(operand),
            CombineOperator::Intersect => working.intersect(operand),
            CombineOperator::Subtract => working.subtract(operand),
        }
    }
}

impl fmt::Display for CombineOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CombineOperator::Union => write!(f, "union"),
            CombineOperator::Intersect => write!(f, "intersect"),
            CombineOperator::Subtract => write!(f, "subtract"),
        }
    }
}

/// One step of a chain: an operator and the file holding its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineOp {
    pub operator: CombineOperator,
    pub path: PathBuf,
}

impl CombineOp {
    pub fn new(operator: CombineOperator, path: impl Into<PathBuf>) -> CombineOp {
        CombineOp {
            operator,
            path: path.into(),
        }
    }
}

/// Operations applied to the working set in the order they were given.
///
/// Set algebra is not commutative here: `-u a -s b` and `-s b -u a` give
/// different results, so the order is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineChain {
    ops: Vec<CombineOp>,
}

impl CombineChain {
    pub fn new(ops: Vec<CombineOp>) -> CombineChain {
        CombineChain { ops }
    }

    pub fn ops(&self) -> &[CombineOp] {
        &self.ops
    }

    /// Check every operand file exists before any input is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_files_exist(self.ops.iter().map(|op| &op.path))
    }

    /// Apply each operation in turn to `working`.
    ///
    /// Each operand file is loaded into its own builder and materialized
    /// before being applied.
    pub fn apply<W: Write>(
        &self,
        working: &mut PrefixSetBuilder,
        ctx: &Context,
        out: &mut W,
    ) -> Result<()> {
        for op in &self.ops {
            let operand = load_builder_from_file(&op.path, ctx, &mut *out)?.prefix_set();
            log::info!(
                "Applying {} with '{}' ({} entries)",
                op.operator,
                op.path.display(),
                operand.len()
            );
            op.operator.apply(working, &operand);
        }
        Ok(())
    }

    /// Build the working set from `inputs`, apply the chain and return the
    /// resulting set.
    ///
    /// # Arguments
    /// * `inputs` - Primary input paths (empty for stdin)
    /// * `ctx` - Run context
    /// * `out` - Output stream used by the `print` policy
    ///
    /// # Errors
    /// A missing operand file is reported before any input is read.
    pub fn run<W: Write>(
        &self,
        inputs: &[PathBuf],
        ctx: &Context,
        out: &mut W,
    ) -> Result<PrefixSet> {
        self.validate()?;
        let mut working = load_inputs(inputs, ctx, &mut *out)?;
        log::info!("Working set has {} entries", working.len());
        self.apply(&mut working, ctx, out)?;
        Ok(working.prefix_set())
    }
}
