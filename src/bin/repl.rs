use anyhow::{bail, Result};
use clap::Parser;
use dice_roller::{Command, Config, Error, Interpreter, Reply, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DICE};
use nu_ansi_term::Color;
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

const PROMPT: &str = "dice> ";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Roll dice expressions like `3d6 + 2` or `max 2d20`
#[derive(Parser, Debug)]
#[command(name = "repl")]
#[command(about = "Roll dice expressions", long_about = None)]
struct Args {
    /// Seed the roller for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Largest number of dice a single term may roll
    #[arg(long, default_value_t = DEFAULT_MAX_DICE)]
    max_dice: u32,

    /// Deepest nesting of operators, parens and calls an expression may use
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Print the trace after a one-shot roll
    #[arg(long)]
    trace: bool,

    /// Expression to roll once (if not provided, reads lines from stdin)
    expression: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DICE_LOG").or_else(|_| EnvFilter::try_new("warn"));
    if let Ok(filter) = filter {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

struct Printer {
    color: bool,
}

impl Printer {
    /// Prints `err` with a caret under the offending column, `offset` columns from the left.
    fn error(&self, err: &Error, offset: usize) {
        let message = match err.position() {
            Some(pos) => format!("{}^ {}", "-".repeat(offset + pos), err),
            None => format!("{}", err),
        };
        if self.color {
            eprintln!("{}", Color::Red.paint(message));
        } else {
            eprintln!("{}", message);
        }
    }

    fn reply(&self, reply: Reply) {
        match reply {
            Reply::Total(total) if self.color => println!("{}", Color::LightGreen.bold().paint(total.to_string())),
            Reply::Total(total) => println!("{}", total),
            Reply::Trace(trace) => println!("{}", trace),
            Reply::Nothing => {}
        }
    }
}

fn run_once(interp: &mut Interpreter<StdRng>, printer: &Printer, expression: &str, trace: bool) -> Result<()> {
    let expression = expression.trim();
    match interp.execute(expression) {
        Ok(reply) => printer.reply(reply),
        Err(err) => {
            eprintln!("{}", expression);
            printer.error(&err, 0);
            bail!("could not roll {:?}", expression);
        }
    }
    if trace {
        printer.reply(interp.execute("?")?);
    }
    Ok(())
}

fn run_loop(interp: &mut Interpreter<StdRng>, printer: &Printer) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line?;

        match line.trim() {
            "q" => return Ok(()),
            "c" => {
                print!("{}", CLEAR_SCREEN);
                io::stdout().flush()?;
            }
            _ => {
                let repeated = match Command::parse(&line) {
                    Command::Repeat => interp.last_line().map(str::to_string),
                    _ => None,
                };
                match (interp.execute(&line), repeated) {
                    (Ok(reply), _) => printer.reply(reply),
                    // the caret points into the echoed line
                    (Err(err), Some(repeated)) => {
                        eprintln!("{}{}", PROMPT, repeated);
                        printer.error(&err, PROMPT.len());
                    }
                    (Err(err), None) => {
                        // Positions are relative to the trimmed line.
                        let indent = line.len() - line.trim_start().len();
                        printer.error(&err, PROMPT.len() + indent);
                    }
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let printer = Printer { color: !args.no_color };
    let mut interp = Interpreter::new(rng)
        .with_config(
            Config::new()
                .with_max_dice(args.max_dice)
                .with_max_depth(args.max_depth),
        )
        .with_color(printer.color);
    tracing::debug!(seed = ?args.seed, max_dice = args.max_dice, max_depth = args.max_depth, "starting");

    match args.expression {
        Some(expression) => run_once(&mut interp, &printer, &expression, args.trace),
        None => run_loop(&mut interp, &printer),
    }
}
