use std::io::{self, BufRead, Write};
use std::panic;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use safecalc::{format_number, CalcError, Calculator, ErrorKind, Limits};

const RULE: &str = "----------------------------------------";
const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

/// safecalc evaluates arithmetic expressions without ever executing code.
/// Run it with an expression for a one-shot answer, or without one for an
/// interactive prompt.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maximum accepted expression length in bytes.
    #[arg(long, default_value_t = Limits::default().max_length)]
    max_length: usize,

    /// Maximum nesting depth of brackets and unary operators.
    #[arg(long, default_value_t = Limits::default().max_depth)]
    max_depth: usize,

    /// Expression to evaluate. Words are joined with spaces.
    #[arg(allow_hyphen_values = true)]
    expression: Vec<String>,
}

enum Outcome {
    Value(f64),
    Failed(CalcError),
    Crashed,
}

fn evaluate_guarded(calculator: &Calculator, expression: &str) -> Outcome {
    match panic::catch_unwind(|| calculator.evaluate_text(expression)) {
        Ok(Ok(value)) => Outcome::Value(value),
        Ok(Err(err)) => Outcome::Failed(err),
        Err(_) => {
            error!("Evaluation of {:?} panicked", expression);
            Outcome::Crashed
        }
    }
}

fn describe_error(err: &CalcError) -> String {
    match err.kind() {
        ErrorKind::DivisionByZero => "Error: division by zero.".to_string(),
        _ => format!("Invalid input: {}", err),
    }
}

fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Value(value) => format_number(*value),
        Outcome::Failed(err) => describe_error(err),
        Outcome::Crashed => "An error occurred while evaluating the expression.".to_string(),
    }
}

fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}

fn run_interactive(calculator: &Calculator) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    println!("Examples: 1+1, 2.5 * (3 - 1), -4**2, 10 // 3");
    println!("Type 'exit' to quit.\n");

    loop {
        print!("Enter an expression: ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let expression = line.trim();

        if expression.is_empty() {
            continue;
        }
        if is_exit_command(expression) {
            println!("\nThanks for using safecalc. Goodbye!");
            break;
        }

        let outcome = evaluate_guarded(calculator, expression);
        debug!("Input {:?} finished", expression);
        match outcome {
            Outcome::Value(_) => {
                println!("\n{}", RULE);
                println!("  Result:\n    {} = {}", expression, describe_outcome(&outcome));
                println!("{}\n", RULE);
            }
            _ => println!("{}\n", describe_outcome(&outcome)),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Args::parse();
    let calculator = Calculator::new(Limits {
        max_length: args.max_length,
        max_depth: args.max_depth,
    });

    if args.expression.is_empty() {
        return match run_interactive(&calculator) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("I/O error: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    let expression = args.expression.join(" ");
    let outcome = evaluate_guarded(&calculator, &expression);
    match outcome {
        Outcome::Value(_) => {
            println!("{}", describe_outcome(&outcome));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("{}", describe_outcome(&outcome));
            ExitCode::FAILURE
        }
    }
}
