mod util;

use bpp::{Finalize, Mode, Options, Sources};
use log::{info, LevelFilter};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Basic files to preprocess
    #[clap(required = true)]
    infiles: Vec<String>,

    /// Dialect whose `#<mode>` lines are kept
    #[clap(long, value_enum, default_value_t = Mode::Cbm)]
    mode: Mode,

    /// Keep REM lines (implies --skip-combine-lines)
    #[clap(long)]
    keep_rems: bool,

    /// Keep blank lines from the input
    #[clap(long)]
    keep_blank_lines: bool,

    /// Keep line indenting
    #[clap(long)]
    keep_indent: bool,

    /// Skip miscellaneous shrinking fixups
    #[clap(long)]
    skip_misc_fixups: bool,

    /// Do not combine lines using the ":" separator
    #[clap(long)]
    skip_combine_lines: bool,

    /// Leave references to undefined labels or lines as written
    #[clap(long)]
    keep_unresolved: bool,

    /// Combined lines stay shorter than this many characters
    #[clap(short, long, default_value_t = bpp::pack::DEFAULT_WIDTH)]
    width: usize,

    /// Output file (stdout if omitted)
    #[clap(short, long)]
    output: Option<String>,

    /// Dump a listing of the output to stderr
    #[clap(short, long)]
    dump: bool,

    /// Print debug progress
    #[clap(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            mode: self.mode,
            keep_rems: self.keep_rems,
            keep_blank_lines: self.keep_blank_lines,
            keep_indent: self.keep_indent,
            skip_misc_fixups: self.skip_misc_fixups,
            finalize: Finalize {
                skip_combine_lines: self.skip_combine_lines,
                keep_unresolved: self.keep_unresolved,
                width: self.width,
            },
        }
    }
}

fn run(args: &Args, sources: &mut Sources) -> bpp::Result<()> {
    use std::io::Write;

    info!("Preprocessing basic files: {}", args.infiles.join(", "));
    let mut stmts = vec![];
    for path in &args.infiles {
        stmts.extend(sources.load(path)?);
    }

    let program = bpp::preprocess(sources, stmts, &args.options())?;
    if args.dump {
        util::print_dump(&program, sources);
    }

    let lines = program.text_lines();
    match &args.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .map_err(|e| bpp::Error::FileCreate(path.clone(), e))?;
            for line in &lines {
                writeln!(file, "{}", line).map_err(|e| bpp::Error::FileWrite(path.clone(), e))?;
            }
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn main() {
    use clap::Parser;

    let args = Args::parse();
    util::Logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let mut sources = Sources::new();
    if let Err(err) = run(&args, &mut sources) {
        err.print_diag(&sources);
        std::process::exit(1);
    }
}
