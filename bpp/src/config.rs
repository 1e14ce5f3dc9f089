use crate::pack::DEFAULT_WIDTH;
use log::info;
use strum::{Display, EnumString};

/// Dialect whose `#<mode>` lines are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Cbm,
    Qbasic,
}

/// Settings of the numbering/lowering core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalize {
    /// Emit one source line per output line.
    pub skip_combine_lines: bool,
    /// Leave references to undefined labels or lines as written.
    pub keep_unresolved: bool,
    /// Packed lines stay shorter than this many characters.
    pub width: usize,
}

impl Default for Finalize {
    fn default() -> Self {
        Finalize {
            skip_combine_lines: false,
            keep_unresolved: false,
            width: DEFAULT_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub keep_rems: bool,
    pub keep_blank_lines: bool,
    pub keep_indent: bool,
    pub skip_misc_fixups: bool,
    pub finalize: Finalize,
}

impl Options {
    /// Apply the implications between options.
    pub fn normalized(mut self) -> Self {
        if self.keep_rems && !self.finalize.skip_combine_lines {
            info!("Option --keep-rems implies --skip-combine-lines");
            self.finalize.skip_combine_lines = true;
        }
        if self.mode == Mode::Qbasic && !self.skip_misc_fixups {
            info!("Mode 'qbasic' implies --skip-misc-fixups");
            self.skip_misc_fixups = true;
        }
        self
    }
}
