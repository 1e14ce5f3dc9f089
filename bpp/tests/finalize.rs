use bpp::{Error, Finalize, Stmt};

fn unpacked() -> Finalize {
    Finalize {
        skip_combine_lines: true,
        ..Finalize::default()
    }
}

fn run(src: &str, opts: &Finalize) -> bpp::Result<Vec<String>> {
    println!("{src}");
    let out = bpp::finalize(&Stmt::lines("main.bas", src), opts);
    if let Ok(lines) = &out {
        for line in lines {
            println!("  > {line}");
        }
    }
    out
}

fn case(src: &str, opts: Finalize, expects: &[&str]) {
    let lines = run(src, &opts).unwrap();
    assert_eq!(lines, expects);
}

macro_rules! case {
    ($name:ident, $src:expr, $opts:expr, [$($line:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            case($src, $opts, &[$($line),*]);
        }
    };
}

// Labels
case!(
    label_goto,
    "FOO:\nPRINT \"HI\"\nGOTO FOO",
    unpacked(),
    ["1 PRINT \"HI\"", "2 GOTO 1"]
);
case!(
    label_goto_packed,
    "FOO:\nPRINT \"HI\"\nGOTO FOO",
    Finalize::default(),
    ["1 PRINT \"HI\":GOTO 1"]
);
case!(
    label_redefined,
    "L:\nPRINT 1\nL:\nPRINT 2\nGOTO L",
    unpacked(),
    ["1 PRINT 1", "2 PRINT 2", "3 GOTO 2"]
);
case!(
    on_goto_list,
    "A:\nPRINT 1\nB:\nPRINT 2\nON N GOTO A, B",
    unpacked(),
    ["1 PRINT 1", "2 PRINT 2", "3 ON N GOTO 1, 2"]
);
case!(
    on_gosub_list,
    "A=1\nB=2\nP:\nRETURN\nQ:\nC=3\nRETURN\nON N GOSUB P,Q",
    unpacked(),
    ["1 A=1", "2 B=2", "3 RETURN", "4 C=3", "5 RETURN", "6 ON N GOSUB 3,4"]
);
case!(
    on_gosub_list_packed,
    "A=1\nB=2\nP:\nRETURN\nQ:\nC=3\nRETURN\nON N GOSUB P,Q",
    Finalize::default(),
    ["1 A=1:B=2", "2 RETURN", "3 C=3:RETURN", "4 ON N GOSUB 2,3"]
);
case!(
    then_label,
    "IF A THEN DONE\nPRINT 1\nDONE:\nEND",
    unpacked(),
    ["1 IF A THEN 3", "2 PRINT 1", "3 END"]
);
case!(
    strings_are_not_jumps,
    "PRINT \"GOTO FOO\"\nFOO:\nGOTO FOO",
    unpacked(),
    ["1 PRINT \"GOTO FOO\"", "2 GOTO 2"]
);

// Procedures
case!(
    sub_called_twice,
    "SUB GREET\nPRINT \"HI\"\nEND SUB\nCALL GREET\nCALL GREET",
    unpacked(),
    [
        "1 PRINT \"HI\"",
        "2 ON X%(X) GOTO 4,6",
        "3 X=X+1:X%(X)=1:GOTO 1",
        "4 X=X-1",
        "5 X=X+1:X%(X)=2:GOTO 1",
        "6 X=X-1",
    ]
);
case!(
    sub_called_twice_packed,
    "SUB GREET\nPRINT \"HI\"\nEND SUB\nCALL GREET\nCALL GREET",
    Finalize::default(),
    [
        "1 PRINT \"HI\":ON X%(X) GOTO 3,4",
        "2 X=X+1:X%(X)=1:GOTO 1",
        "3 X=X-1:X=X+1:X%(X)=2:GOTO 1",
        "4 X=X-1",
    ]
);
case!(
    call_with_prefix,
    "IF A THEN CALL S\nEND\nSUB S\nPRINT 1\nEND SUB",
    unpacked(),
    [
        "1 IF A THEN X=X+1:X%(X)=1:GOTO 4",
        "2 X=X-1",
        "3 END",
        "4 PRINT 1",
        "5 ON X%(X) GOTO 2",
    ]
);
// An uncalled body is declared inline; control falls through its END SUB
case!(
    sub_never_called,
    "SUB UNUSED\nPRINT 1\nEND SUB\nPRINT 2",
    unpacked(),
    ["1 PRINT 1", "2 X=X", "3 PRINT 2"]
);
case!(
    sub_never_called_packed,
    "SUB UNUSED\nPRINT 1\nEND SUB\nAFTER:\nPRINT 2\nGOTO AFTER",
    Finalize::default(),
    ["1 PRINT 1:X=X", "2 PRINT 2:GOTO 2"]
);

// Packing
case!(
    pack_return,
    "GOSUB S\nEND\nS:\nPRINT 1\nRETURN\nPRINT 2",
    Finalize::default(),
    ["1 GOSUB 2:END", "2 PRINT 1:RETURN", "3 PRINT 2"]
);
case!(
    pack_numeric_target,
    "PRINT 1\nPRINT 2\nPRINT 3\nGOTO 3",
    Finalize::default(),
    ["1 PRINT 1:PRINT 2", "2 PRINT 3:GOTO 2"]
);
case!(
    pack_width,
    "PRINT 1234567\nPRINT 1234567\nPRINT 1234567\nPRINT 1234567",
    Finalize {
        width: 30,
        ..Finalize::default()
    },
    ["1 PRINT 1234567:PRINT 1234567", "2 PRINT 1234567:PRINT 1234567"]
);
case!(
    pack_long_line_alone,
    "PRINT 123456789\nA=1",
    Finalize {
        width: 10,
        ..Finalize::default()
    },
    ["1 PRINT 123456789", "2 A=1"]
);

// Unresolved references
case!(
    keep_undefined_line,
    "GOTO 7",
    Finalize {
        keep_unresolved: true,
        ..Finalize::default()
    },
    ["1 GOTO 7"]
);
case!(
    keep_undefined_label,
    "PRINT 1\nGOSUB NOWHERE",
    Finalize {
        keep_unresolved: true,
        ..unpacked()
    },
    ["1 PRINT 1", "2 GOSUB NOWHERE"]
);

#[test]
fn kept_trailing_label_is_measured_by_name() {
    let long = format!("PRINT \"{}\"", "A".repeat(60));
    let label = "DONE_WITH_A_RATHER_LONG_LABEL_NAME";
    let src = format!("{long}\nGOTO {label}\n{label}:");
    let opts = Finalize {
        keep_unresolved: true,
        ..Finalize::default()
    };
    let lines = run(&src, &opts).unwrap();
    assert_eq!(lines, vec![format!("1 {long}"), format!("2 GOTO {label}")]);
    for line in &lines {
        assert!(line.chars().count() < opts.width, "{}", line);
    }
}

#[test]
fn errors() {
    for opts in [unpacked(), Finalize::default()] {
        assert!(matches!(
            run("CALL FOO:PRINT 1", &opts),
            Err(Error::MalformedCallSite(loc)) if loc.line == 0
        ));
        assert!(matches!(
            run("PRINT 1\nEND SUB", &opts),
            Err(Error::UnmatchedEndSub(loc)) if loc.line == 1
        ));
        assert!(matches!(
            run("GOTO NOWHERE", &opts),
            Err(Error::UndefinedLabel(name, _)) if name == "NOWHERE"
        ));
        assert!(matches!(run("GOTO 7", &opts), Err(Error::UndefinedLine(7, _))));
        assert!(matches!(
            run("GOTO DONE\nDONE:", &opts),
            Err(Error::DanglingLabel(name, _)) if name == "DONE"
        ));
    }
}

// ----------------------------------------------------------------------------
// Properties over a larger program

const PROGRAM: &str = "\
SUB DRAW
  FOR I=1 TO 10
    PRINT \"*\";
  NEXT I
  PRINT
END SUB
SUB CLEAR
  PRINT CHR$(147)
END SUB
MAIN:
  CALL CLEAR
  INPUT \"ROWS\";N
  IF N=0 THEN DONE
  FOR R=1 TO N
    CALL DRAW
  NEXT R
  GOSUB PAUSE
  ON N GOTO MAIN, DONE
PAUSE:
  FOR T=1 TO 500:NEXT T
  RETURN
DONE:
  CALL CLEAR
  END
";

fn program() -> Vec<Stmt> {
    Stmt::lines("main.bas", PROGRAM)
        .into_iter()
        .map(|s| s.with_text(s.text.trim_start()))
        .collect()
}

/// Line numbers that follow GOTO, GOSUB or THEN, including `ON` lists.
fn referenced(line: &str) -> Vec<u32> {
    let mut refs = vec![];
    for kw in ["GOTO ", "GOSUB ", "THEN "] {
        for (at, _) in line.match_indices(kw) {
            let rest = &line[at + kw.len()..];
            let list = rest.split(':').next().unwrap_or("");
            for item in list.split(',') {
                if let Ok(n) = item.trim().parse::<u32>() {
                    refs.push(n);
                }
            }
        }
    }
    refs
}

#[test]
fn every_reference_starts_a_line() {
    let stmts = program();
    for width in [20, 40, 88] {
        for skip_combine_lines in [false, true] {
            let opts = Finalize {
                skip_combine_lines,
                width,
                ..Finalize::default()
            };
            let lines = bpp::finalize(&stmts, &opts).unwrap();
            let nums: Vec<u32> = lines
                .iter()
                .map(|l| l.split(' ').next().unwrap().parse().unwrap())
                .collect();
            let expect: Vec<u32> = (1..=lines.len() as u32).collect();
            assert_eq!(nums, expect);
            for line in &lines {
                for r in referenced(line) {
                    assert!(nums.contains(&r), "{} in `{}`", r, line);
                }
            }
        }
    }
}

#[test]
fn program_packed() {
    let lines = bpp::finalize(&program(), &Finalize::default()).unwrap();
    assert_eq!(
        lines,
        vec![
            "1 FOR I=1 TO 10:PRINT \"*\";:NEXT I:PRINT:ON X%(X) GOTO 6",
            "2 PRINT CHR$(147):ON X%(X) GOTO 4,9",
            "3 X=X+1:X%(X)=1:GOTO 2",
            "4 X=X-1:INPUT \"ROWS\";N:IF N=0 THEN 8",
            "5 FOR R=1 TO N:X=X+1:X%(X)=1:GOTO 1",
            "6 X=X-1:NEXT R:GOSUB 7:ON N GOTO 3, 8",
            "7 FOR T=1 TO 500:NEXT T:RETURN",
            "8 X=X+1:X%(X)=2:GOTO 2",
            "9 X=X-1:END",
        ]
    );
}

#[test]
fn program_packed_narrow() {
    let width = 40;
    let program = bpp::compile(
        &program(),
        &Finalize {
            width,
            ..Finalize::default()
        },
    )
    .unwrap();
    let lines = program.text_lines();
    assert_eq!(
        lines,
        vec![
            "1 FOR I=1 TO 10:PRINT \"*\";:NEXT I:PRINT",
            "2 ON X%(X) GOTO 7",
            "3 PRINT CHR$(147):ON X%(X) GOTO 5,10",
            "4 X=X+1:X%(X)=1:GOTO 3",
            "5 X=X-1:INPUT \"ROWS\";N:IF N=0 THEN 9",
            "6 FOR R=1 TO N:X=X+1:X%(X)=1:GOTO 1",
            "7 X=X-1:NEXT R:GOSUB 8:ON N GOTO 4, 9",
            "8 FOR T=1 TO 500:NEXT T:RETURN",
            "9 X=X+1:X%(X)=2:GOTO 3",
            "10 X=X-1:END",
        ]
    );
    for line in &lines {
        assert!(line.chars().count() < width, "{}", line);
    }
    // Output line 7 starts at the return point of `CALL DRAW`
    assert_eq!(program.lines[6].origin, 14);
    assert_eq!(program.renumber.new_of(20), Some(9));
}

#[test]
fn unpacked_keeps_one_statement_per_line() {
    let stmts = program();
    let lines = bpp::finalize(&stmts, &unpacked()).unwrap();
    assert_eq!(lines.len(), 22);
    assert_eq!(lines[4], "5 ON X%(X) GOTO 14");
    assert_eq!(lines[6], "7 ON X%(X) GOTO 9,21");
    assert_eq!(lines[16], "17 ON N GOTO 8, 20");
}
