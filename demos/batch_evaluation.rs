use safecalc::{evaluate_batch, format_number};

fn main() {
    pretty_env_logger::init();

    let expressions: Vec<String> = (1..=10)
        .map(|i| format!("({} * 7 + 3) // {} % 5", i, i - 1))
        .collect();

    for (expression, result) in expressions.iter().zip(evaluate_batch(&expressions)) {
        match result {
            Ok(value) => println!("{} = {}", expression, format_number(value)),
            Err(err) => println!("{} -> {}", expression, err),
        }
    }
}
