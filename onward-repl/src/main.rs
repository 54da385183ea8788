use std::io::{self, Stdout};
use std::process;

use clap::{ArgAction, Parser};
use onward_core::errors::Error;
use onward_core::{Flow, Quotation, State, DEFAULT_STACK_CAPACITY};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "onward")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive concatenative stack language", long_about = None)]
struct Args {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the top of the stack after every line
    #[arg(long)]
    show_stack: bool,

    /// Initial stack capacity in values
    #[arg(long, default_value_t = DEFAULT_STACK_CAPACITY)]
    stack_capacity: usize,

    /// Exit with status 1 on the first evaluation error
    #[arg(long)]
    fail_fast: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let status = match run(&args) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    process::exit(status);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let mut state = State::with_capacity(io::stdout(), args.stack_capacity)?;
    let mut rl = DefaultEditor::new()?;
    info!(capacity = args.stack_capacity, "session started");

    loop {
        if args.show_stack {
            print_stack(&state.stack, 70);
        }

        let prompt = if state.is_capturing() { ".. " } else { ">> " };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("end of input");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        rl.add_history_entry(line.as_str())?;

        match line.trim() {
            ":quit" => return Ok(0),
            ":words" => {
                print_words(&state);
                continue;
            }
            _ => {}
        }

        match state.eval_line(&line) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit(status)) => {
                info!(status, "exit");
                return Ok(status);
            }
            Err(e) => {
                report_error(&e);
                if args.fail_fast {
                    return Ok(1);
                }
            }
        }
    }
}

/// One-line stack preview. A stack wider than `width` keeps only as many
/// values off the top as fit behind a leading `..`.
fn print_stack(stack: &Quotation, width: usize) {
    println!("{}", stack_preview(stack, width));
}

fn stack_preview(stack: &Quotation, width: usize) -> String {
    let full = stack.to_string();
    if full.len() <= width {
        return full;
    }

    let mut top: Vec<String> = stack
        .iter()
        .rev()
        .map(|value| value.to_string())
        .scan("[.., ]".len(), |used, repr| {
            *used += repr.len() + 2;
            if *used > width {
                None
            } else {
                Some(repr)
            }
        })
        .collect();
    top.reverse();
    format!("[.., {}]", top.join(", "))
}

fn print_words(state: &State<Stdout>) {
    let mut words: Vec<_> = state.dictionary.iter().collect();
    words.sort_by(|a, b| a.name.cmp(&b.name));
    for entry in words {
        println!("{:>20}   {}", entry.name, entry.word);
    }
}

fn report_error(e: &Error) {
    eprintln!("{}", e)
}
