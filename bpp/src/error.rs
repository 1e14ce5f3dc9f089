use crate::source::{Loc, Sources};
use color_print::ceprintln;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CALL must be the last statement on its line")]
    MalformedCallSite(Loc),

    #[error("END SUB without a matching SUB")]
    UnmatchedEndSub(Loc),

    #[error("SUB `{0}` opened inside another SUB")]
    NestedSub(String, Loc),

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String, Loc),

    #[error("Label `{0}` does not mark any line")]
    DanglingLabel(String, Loc),

    #[error("Undefined line: {0}")]
    UndefinedLine(u32, Loc),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    /// Source location the error points at, if any.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            Error::MalformedCallSite(loc)
            | Error::UnmatchedEndSub(loc)
            | Error::NestedSub(_, loc)
            | Error::UndefinedLabel(_, loc)
            | Error::DanglingLabel(_, loc)
            | Error::UndefinedLine(_, loc) => Some(loc),
            _ => None,
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, sources: &Sources) {
        ceprintln!("<red,bold>error</>: {}", self);
        if let Some(source) = std::error::Error::source(self) {
            ceprintln!("     <blue>=</> {}", source);
        }

        let loc = match self.loc() {
            Some(loc) => loc,
            None => return,
        };

        // Loc::line is 0-based, display as 1-based
        let line_num = loc.line + 1;
        ceprintln!("     <blue>--></> <underline>{}:{}</>", loc.file, line_num);
        ceprintln!("      <blue>|</>");
        let line_content = sources.line(loc).unwrap_or("");
        ceprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
        ceprintln!("      <blue>|</>");
    }
}
