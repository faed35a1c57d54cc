use safecalc::{evaluate_text, format_number};

fn main() {
    pretty_env_logger::init();

    let expressions = ["1+1", "2.5 * (3 - 1)", "-4**2", "10 // 3", "5 / 0", "__import__('os')"];

    for expression in expressions {
        match evaluate_text(expression) {
            Ok(result) => println!("{} = {}", expression, format_number(result)),
            Err(err) => println!("{} -> error: {}", expression, err),
        }
    }
}
