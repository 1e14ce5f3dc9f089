//! Runtime convention for procedure calls.
//!
//! The target dialect has no call stack with return values, so a call site
//! pushes its selector onto an integer array indexed by a stack pointer, jumps
//! to the procedure, and the procedure's `END SUB` dispatches on the stored
//! selector with `ON ... GOTO`.

use crate::ir::{Part, Target};
use crate::label::Symbol;
use crate::scan::Kw;

pub trait Convention {
    /// Statements that push `selector` and jump to `sub`.
    fn call(&self, selector: u32, sub: &str) -> String;

    /// Statement run at the return point.
    fn ret(&self) -> String;

    /// Multi-way jump prefix keyed on the stored selector.
    fn dispatch(&self) -> String;

    /// Statement that does nothing. Stands in for the `END SUB` of a
    /// procedure that is never called, so control falls through it.
    fn nop(&self) -> String;
}

/// `X` is the stack pointer, `X%` the selector stack.
#[derive(Debug, Clone)]
pub struct StackVars {
    pointer: &'static str,
    array: &'static str,
}

impl Default for StackVars {
    fn default() -> Self {
        StackVars {
            pointer: "X",
            array: "X%",
        }
    }
}

impl Convention for StackVars {
    fn call(&self, selector: u32, sub: &str) -> String {
        let (p, a) = (self.pointer, self.array);
        format!("{p}={p}+1:{a}({p})={selector}:{} {sub}", Kw::Goto)
    }

    fn ret(&self) -> String {
        format!("{p}={p}-1", p = self.pointer)
    }

    fn dispatch(&self) -> String {
        format!("{} {}({}) {} ", Kw::On, self.array, self.pointer, Kw::Goto)
    }

    fn nop(&self) -> String {
        format!("{p}={p}", p = self.pointer)
    }
}

/// Body of the `END SUB` of `sub`: one branch per call site, in call order.
/// `None` when `sub` is never called.
pub fn dispatch(conv: &dyn Convention, sub: &str, calls: u32) -> Option<Vec<Part>> {
    if calls == 0 {
        return None;
    }
    let mut parts = vec![Part::Text(conv.dispatch())];
    for index in 1..=calls {
        if index > 1 {
            parts.push(Part::text(","));
        }
        parts.push(Part::Jump(Target::Symbol(Symbol::Return {
            sub: sub.to_string(),
            index,
        })));
    }
    Some(parts)
}
