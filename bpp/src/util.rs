use bpp::{Program, Sources};
use color_print::{ceprintln, cformat};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Stderr logger in the style of the diagnostics.
pub struct Logger;

static LOGGER: Logger = Logger;

impl Logger {
    pub fn init(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error => ceprintln!("<red,bold>error</>: {}", record.args()),
            Level::Warn => ceprintln!("<yellow,bold>warn</>: {}", record.args()),
            Level::Info => eprintln!("{}", record.args()),
            Level::Debug | Level::Trace => ceprintln!("<green,bold>note</>: {}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Listing of the output: new number, the line it started as, where it came
/// from and the label bound there.
pub fn print_dump(program: &Program, sources: &Sources) {
    eprintln!("{}", "-".repeat(72));
    let mut file = None;
    for line in &program.lines {
        // File header for first line of each file
        if file != Some(&line.loc.file) {
            file = Some(&line.loc.file);
            eprintln!(
                "{}+------[{}]{}",
                "-".repeat(13),
                line.loc.file,
                "-".repeat(50usize.saturating_sub(line.loc.file.len()))
            );
        }
        let label = program
            .labels
            .name_at(line.origin)
            .map(|sym| cformat!("<g>{}:</>", sym))
            .unwrap_or_default();
        let raw = sources.line(&line.loc).unwrap_or("").trim();
        eprintln!(
            "[{:>4} <{:>4}] | {:>4}: {} {}",
            line.number,
            line.origin,
            line.loc.line + 1,
            label,
            cformat!("<s>{}</>", raw)
        );
        eprintln!("             |       {}", line.text);
    }
    eprintln!("{}", "-".repeat(72));
}
