use safecalc::{evaluate, format_number, parse};

fn main() {
    pretty_env_logger::init();

    let expression = "2 ** 3 ** 2 - -4 ** 2";
    let ast = parse(expression).expect("Failed to parse");
    println!("Canonical form: {}", ast);

    match evaluate(&ast) {
        Ok(result) => println!("Result: {}", format_number(result)),
        Err(err) => println!("Error: {}", err),
    }
}
