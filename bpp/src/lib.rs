pub mod config;
pub mod error;
pub mod extract;
pub mod ir;
pub mod label;
pub mod lower;
pub mod pack;
pub mod prep;
pub mod resolve;
pub mod scan;
pub mod source;

pub use config::{Finalize, Mode, Options};
pub use error::{Error, Result};
pub use ir::Program;
pub use pack::RenumberMap;
pub use source::{Loc, Sources, Stmt};

use log::info;
use lower::StackVars;

/// Number, lower, resolve and pack `stmts`.
pub fn compile(stmts: &[Stmt], opts: &Finalize) -> Result<Program> {
    let extracted = extract::extract(stmts, &StackVars::default())?;
    let labels = extracted.labels;
    let lines = resolve::bind(extracted.lines, &labels, opts.keep_unresolved)?;

    let (lines, renumber) = if opts.skip_combine_lines {
        let renumber = RenumberMap::identity(&lines);
        (lines, renumber)
    } else {
        pack::pack(&lines, &labels, opts.width)?
    };

    let lines = resolve::propagate(&lines, &labels, &renumber, opts.keep_unresolved)?;
    Ok(Program {
        lines,
        labels,
        renumber,
    })
}

/// [`compile`], rendered as `<number> <text>` lines.
pub fn finalize(stmts: &[Stmt], opts: &Finalize) -> Result<Vec<String>> {
    Ok(compile(stmts, opts)?.text_lines())
}

/// Run the line filters and then [`compile`]. Files pulled in by includes
/// are recorded in `sources`.
pub fn preprocess(sources: &mut Sources, stmts: Vec<Stmt>, opts: &Options) -> Result<Program> {
    let opts = opts.clone().normalized();
    let stmts = prep::run(sources, stmts, &opts)?;
    let program = compile(&stmts, &opts.finalize)?;
    info!("Lines after finalizing: {}", program.lines.len());
    Ok(program)
}
