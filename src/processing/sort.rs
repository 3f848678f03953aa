//! Sorting and merging whole input lists.

use super::loader::load_inputs;
use crate::config::Context;
use crate::error::Result;
use crate::models::Prefix;
use std::io::Write;
use std::path::PathBuf;

/// Every distinct input prefix in canonical order.
///
/// Prefixes covered by another input prefix are dropped; adjacent siblings
/// are not merged.
pub fn sort_inputs<W: Write>(
    inputs: &[PathBuf],
    ctx: &Context,
    out: &mut W,
) -> Result<Vec<Prefix>> {
    let builder = load_inputs(inputs, ctx, out)?;
    log::info!("Done loading CIDRs");
    Ok(builder.prefix_set().prefixes())
}

/// The minimal set of prefixes covering every input, in canonical order.
pub fn merge_inputs<W: Write>(
    inputs: &[PathBuf],
    ctx: &Context,
    out: &mut W,
) -> Result<Vec<Prefix>> {
    let builder = load_inputs(inputs, ctx, out)?;
    log::info!("Done loading CIDRs");
    Ok(builder.prefix_set().prefixes_compact())
}
