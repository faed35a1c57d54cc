use crate::ast::{ExpressionNode, OperatorKind, UnaryOperatorKind};
use crate::config::Limits;
use crate::error::ParseError;
use log::{debug, trace};
use once_cell::sync::Lazy;
use pest::error::{Error as PestError, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression.pest"] // Link to the grammar file
pub struct ExpressionParser;

// Lowest binding first. Unary +/- sit below `**`, so `-4**2` is `-(4**2)`.
static PRATT_PARSER: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    use Assoc::*;
    use Rule::*;

    PrattParser::new()
        .op(Op::infix(or_op, Left))
        .op(Op::infix(and_op, Left))
        .op(Op::prefix(not_op))
        .op(Op::infix(eq, Left)
            | Op::infix(ne, Left)
            | Op::infix(lt, Left)
            | Op::infix(le, Left)
            | Op::infix(gt, Left)
            | Op::infix(ge, Left)
            | Op::infix(in_op, Left)
            | Op::infix(not_in, Left)
            | Op::infix(is_op, Left)
            | Op::infix(is_not, Left))
        .op(Op::infix(bit_or, Left))
        .op(Op::infix(bit_xor, Left))
        .op(Op::infix(bit_and, Left))
        .op(Op::infix(shl, Left) | Op::infix(shr, Left))
        .op(Op::infix(add, Left) | Op::infix(sub, Left))
        .op(Op::infix(mul, Left)
            | Op::infix(mat_mul, Left)
            | Op::infix(div, Left)
            | Op::infix(floor_div, Left)
            | Op::infix(modulo, Left))
        .op(Op::prefix(pos) | Op::prefix(neg) | Op::prefix(invert))
        .op(Op::infix(pow, Right))
        .op(Op::postfix(call) | Op::postfix(subscript) | Op::postfix(attribute))
});

impl ExpressionParser {
    /// Parses `input` with the default [`Limits`].
    pub fn parse_expression(input: &str) -> Result<ExpressionNode, ParseError> {
        Self::parse_with_limits(input, &Limits::default())
    }

    /// Parses `input` into a whitelisted tree.
    ///
    /// The grammar accepts a general expression language; anything that is not
    /// a number, a grouping, or one of the whitelisted operators is turned into
    /// [`ParseError::DisallowedConstruct`] while the tree is built.
    pub fn parse_with_limits(input: &str, limits: &Limits) -> Result<ExpressionNode, ParseError> {
        debug!("Parsing expression: {}", input);
        if input.trim().is_empty() {
            return Err(ParseError::syntax("empty expression"));
        }
        limits.check(input)?;

        let root = ExpressionParser::parse(Rule::expression, input)
            .map_err(syntax_error)?
            .next()
            .ok_or_else(|| ParseError::syntax("empty expression"))?;

        let list = root
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::syntax("empty expression"))?;
        let ast = build_expr_list(list)?;

        trace!("Parsed tree: {}", ast);
        Ok(ast)
    }
}

fn syntax_error(error: PestError<Rule>) -> ParseError {
    let error = error.renamed_rules(describe_rule);
    let column = match error.line_col {
        LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _) => column,
    };
    debug!("Syntax error at column {}: {}", column, error.variant.message());
    ParseError::syntax(format!("{} at column {}", error.variant.message(), column))
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input".to_string(),
        Rule::expr | Rule::expr_list => "expression".to_string(),
        Rule::number | Rule::dec_int | Rule::float_lit => "number".to_string(),
        Rule::paren => "`(`".to_string(),
        Rule::add | Rule::pos => "`+`".to_string(),
        Rule::sub | Rule::neg => "`-`".to_string(),
        Rule::mul => "`*`".to_string(),
        Rule::div => "`/`".to_string(),
        Rule::floor_div => "`//`".to_string(),
        Rule::modulo => "`%`".to_string(),
        Rule::pow => "`**`".to_string(),
        other => format!("{:?}", other),
    }
}

/// `a, b` and `a,` are tuples; a single expression is passed through.
fn build_expr_list(pair: Pair<Rule>) -> Result<ExpressionNode, ParseError> {
    let mut pairs = pair.into_inner();
    let first = pairs
        .next()
        .ok_or_else(|| ParseError::syntax("expected an expression"))?;
    if pairs.next().is_some() {
        return Err(ParseError::disallowed("tuple literal"));
    }
    build_expression(first.into_inner())
}

fn build_expression(pairs: Pairs<Rule>) -> Result<ExpressionNode, ParseError> {
    PRATT_PARSER
        .map_primary(build_primary)
        .map_prefix(|op, operand| {
            let operator = match op.as_rule() {
                Rule::not_op => return Err(ParseError::disallowed("boolean operator")),
                Rule::invert => return Err(ParseError::disallowed("bitwise inversion")),
                _ => UnaryOperatorKind::try_from(op.as_str())?,
            };
            Ok(ExpressionNode::unary(operator, operand?))
        })
        .map_postfix(|_operand, op| {
            let construct = match op.as_rule() {
                Rule::call => "function call",
                Rule::subscript => "subscript",
                _ => "attribute access",
            };
            Err(ParseError::disallowed(construct))
        })
        .map_infix(|left, op, right| {
            let operator = binary_operator(&op)?;
            Ok(ExpressionNode::binary(operator, left?, right?))
        })
        .parse(pairs)
}

fn binary_operator(op: &Pair<Rule>) -> Result<OperatorKind, ParseError> {
    match op.as_rule() {
        Rule::or_op | Rule::and_op => Err(ParseError::disallowed("boolean operator")),
        Rule::eq
        | Rule::ne
        | Rule::lt
        | Rule::le
        | Rule::gt
        | Rule::ge
        | Rule::in_op
        | Rule::not_in
        | Rule::is_op
        | Rule::is_not => Err(ParseError::disallowed("comparison")),
        Rule::bit_or | Rule::bit_xor | Rule::bit_and => {
            Err(ParseError::disallowed("bitwise operator"))
        }
        Rule::shl | Rule::shr => Err(ParseError::disallowed("bitwise shift")),
        Rule::mat_mul => Err(ParseError::disallowed("matrix multiplication")),
        _ => OperatorKind::try_from(op.as_str()),
    }
}

fn build_primary(pair: Pair<Rule>) -> Result<ExpressionNode, ParseError> {
    trace!("Building primary expression: {:?}", pair.as_rule());
    match pair.as_rule() {
        Rule::number => build_number(pair),
        Rule::paren => match pair.into_inner().next() {
            Some(list) => build_expr_list(list),
            None => Err(ParseError::disallowed("tuple literal")),
        },
        Rule::identifier => Err(ParseError::disallowed("identifier")),
        Rule::string => Err(ParseError::disallowed(string_kind(pair.as_str()))),
        Rule::constant if pair.as_str() == "None" => Err(ParseError::disallowed("None literal")),
        Rule::constant => Err(ParseError::disallowed("boolean literal")),
        Rule::ellipsis => Err(ParseError::disallowed("ellipsis")),
        Rule::list => Err(ParseError::disallowed("list literal")),
        Rule::braces => Err(ParseError::disallowed(braces_kind(pair))),
        rule => Err(ParseError::syntax(format!(
            "unexpected rule in primary expression: {:?}",
            rule
        ))),
    }
}

fn build_number(pair: Pair<Rule>) -> Result<ExpressionNode, ParseError> {
    let text = pair.as_str();
    let mut pairs = pair.into_inner();
    let literal = pairs
        .next()
        .ok_or_else(|| ParseError::syntax(format!("malformed number: {}", text)))?;
    if pairs.next().is_some() {
        return Err(ParseError::disallowed("complex literal"));
    }

    let digits: String = literal.as_str().chars().filter(|c| *c != '_').collect();
    let value = match literal.as_rule() {
        Rule::hex_int => radix_value(&digits[2..], 16),
        Rule::oct_int => radix_value(&digits[2..], 8),
        Rule::bin_int => radix_value(&digits[2..], 2),
        _ => digits
            .parse::<f64>()
            .map_err(|_| ParseError::syntax(format!("malformed number: {}", text)))?,
    };

    Ok(ExpressionNode::Number(value))
}

fn radix_value(digits: &str, radix: u32) -> f64 {
    u64::from_str_radix(digits, radix)
        .map(|value| value as f64)
        .unwrap_or_else(|_| {
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0, |acc, digit| acc * radix as f64 + digit as f64)
        })
}

fn string_kind(literal: &str) -> &'static str {
    let prefix = literal
        .split(|c| c == '\'' || c == '"')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if prefix.contains('b') {
        "bytes literal"
    } else if prefix.contains('f') {
        "f-string"
    } else {
        "string literal"
    }
}

fn braces_kind(pair: Pair<Rule>) -> &'static str {
    match pair.into_inner().next() {
        Some(item) => {
            // `key: value` items carry two expressions
            if item.into_inner().count() > 1 {
                "dict literal"
            } else {
                "set literal"
            }
        }
        None => "dict literal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExpressionNode, OperatorKind, UnaryOperatorKind};
    use std::time::{Duration, Instant};

    fn number(value: f64) -> ExpressionNode {
        ExpressionNode::Number(value)
    }

    fn binary(operator: OperatorKind, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
        ExpressionNode::binary(operator, left, right)
    }

    fn disallowed(input: &str) -> String {
        match ExpressionParser::parse_expression(input) {
            Err(ParseError::DisallowedConstruct(name)) => name,
            other => panic!("expected a disallowed construct for {:?}, got {:?}", input, other),
        }
    }

    fn is_syntax_error(input: &str) -> bool {
        matches!(
            ExpressionParser::parse_expression(input),
            Err(ParseError::SyntaxError(_))
        )
    }

    #[test]
    fn test_simple_binary_expression() {
        let ast = ExpressionParser::parse_expression("1+1").unwrap();
        assert_eq!(ast, binary(OperatorKind::Add, number(1.0), number(1.0)));
    }

    #[test]
    fn test_grouped_expression() {
        let ast = ExpressionParser::parse_expression(" 2.5 * (3 - 1) ").unwrap();
        let expected_ast = binary(
            OperatorKind::Mul,
            number(2.5),
            binary(OperatorKind::Sub, number(3.0), number(1.0)),
        );
        assert_eq!(ast, expected_ast);
    }

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        let ast = ExpressionParser::parse_expression("1 + 2 * 3 // 4 % 5").unwrap();
        assert_eq!(ast.to_string(), "(1 + (((2 * 3) // 4) % 5))");
    }

    #[test]
    fn test_left_associativity() {
        let ast = ExpressionParser::parse_expression("10 - 4 - 3").unwrap();
        assert_eq!(ast.to_string(), "((10 - 4) - 3)");
        let ast = ExpressionParser::parse_expression("64 / 4 / 2").unwrap();
        assert_eq!(ast.to_string(), "((64 / 4) / 2)");
    }

    #[test]
    fn test_power_is_right_associative() {
        let ast = ExpressionParser::parse_expression("2**3**2").unwrap();
        let expected_ast = binary(
            OperatorKind::Pow,
            number(2.0),
            binary(OperatorKind::Pow, number(3.0), number(2.0)),
        );
        assert_eq!(ast, expected_ast);
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let ast = ExpressionParser::parse_expression("-4**2").unwrap();
        let expected_ast = ExpressionNode::unary(
            UnaryOperatorKind::Minus,
            binary(OperatorKind::Pow, number(4.0), number(2.0)),
        );
        assert_eq!(ast, expected_ast);

        let ast = ExpressionParser::parse_expression("(-4)**2").unwrap();
        assert_eq!(ast.to_string(), "((-4) ** 2)");
    }

    #[test]
    fn test_unary_operand_of_power() {
        assert_eq!(
            ExpressionParser::parse_expression("2**-1").unwrap().to_string(),
            "(2 ** (-1))"
        );
        assert_eq!(
            ExpressionParser::parse_expression("2 ** -3 ** 2")
                .unwrap()
                .to_string(),
            "(2 ** (-(3 ** 2)))"
        );
        assert_eq!(
            ExpressionParser::parse_expression("2 ** -1 * 3")
                .unwrap()
                .to_string(),
            "((2 ** (-1)) * 3)"
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_multiplication() {
        assert_eq!(
            ExpressionParser::parse_expression("-2 * 3").unwrap().to_string(),
            "((-2) * 3)"
        );
        assert_eq!(
            ExpressionParser::parse_expression("5 - - +3").unwrap().to_string(),
            "(5 - (-(+3)))"
        );
    }

    #[test]
    fn test_numeric_literals() {
        let cases = [
            ("42", 42.0),
            ("0", 0.0),
            ("00", 0.0),
            ("1_000", 1000.0),
            ("2.5", 2.5),
            ("1.", 1.0),
            (".5", 0.5),
            ("1e3", 1000.0),
            ("1.5E-3", 0.0015),
            ("1.e2", 100.0),
            ("1_0.2_5", 10.25),
            ("0x1F", 31.0),
            ("0o17", 15.0),
            ("0b101", 5.0),
            ("0X_ff", 255.0),
        ];
        for (input, expected) in cases {
            assert_eq!(
                ExpressionParser::parse_expression(input).unwrap(),
                number(expected),
                "literal {}",
                input
            );
        }
    }

    #[test]
    fn test_huge_hex_literal_does_not_overflow() {
        let ast = ExpressionParser::parse_expression("0xFFFFFFFFFFFFFFFFFF").unwrap();
        assert_eq!(ast, number(4722366482869645213695.0));
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "", "   ", "(1 + 2", "1 + 2)", "1 +", "* 2", "1 2", "1.2.3", "01", "1abc", "1_",
            "0x", "0b12", "2 * * 3", "()+", "1 = 2", "if", "1 if 1 else 2", "lambda: 1", "$",
        ] {
            assert!(is_syntax_error(input), "expected a syntax error for {:?}", input);
        }
    }

    #[test]
    fn test_syntax_error_reports_column() {
        match ExpressionParser::parse_expression("1 + ") {
            Err(ParseError::SyntaxError(message)) => assert!(message.contains("column 5"), "{}", message),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_disallowed_constructs() {
        let cases = [
            ("x", "identifier"),
            ("price + 1", "identifier"),
            ("__import__('os')", "function call"),
            ("abs(-1)", "function call"),
            ("(1)(2)", "function call"),
            ("math.pi", "attribute access"),
            ("1 .real", "attribute access"),
            ("[1, 2][0]", "subscript"),
            ("'abc'", "string literal"),
            ("\"abc\"", "string literal"),
            ("r'\\d'", "string literal"),
            ("'''doc'''", "string literal"),
            ("b'abc'", "bytes literal"),
            ("f'{1}'", "f-string"),
            ("True", "boolean literal"),
            ("False + 1", "boolean literal"),
            ("None", "None literal"),
            ("...", "ellipsis"),
            ("1 < 2", "comparison"),
            ("1 == 1", "comparison"),
            ("1 is not 2", "comparison"),
            ("1 not in 2", "comparison"),
            ("1 and 2", "boolean operator"),
            ("1 or 2", "boolean operator"),
            ("not 1", "boolean operator"),
            ("1 | 2", "bitwise operator"),
            ("1 ^ 2", "bitwise operator"),
            ("1 & 2", "bitwise operator"),
            ("1 << 2", "bitwise shift"),
            ("~1", "bitwise inversion"),
            ("1 @ 2", "matrix multiplication"),
            ("[1, 2]", "list literal"),
            ("[]", "list literal"),
            ("(1, 2)", "tuple literal"),
            ("()", "tuple literal"),
            ("1, 2", "tuple literal"),
            ("(1,)", "tuple literal"),
            ("{}", "dict literal"),
            ("{1: 2}", "dict literal"),
            ("{1, 2}", "set literal"),
            ("2j", "complex literal"),
        ];
        for (input, expected) in cases {
            assert_eq!(disallowed(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_outermost_disallowed_construct_is_reported() {
        assert_eq!(disallowed("f(x) + 1"), "function call");
        assert_eq!(disallowed("x < f(1)"), "comparison");
        assert_eq!(disallowed("-f(x)"), "function call");
        assert_eq!(disallowed("~x"), "bitwise inversion");
        assert_eq!(disallowed("x + 'a'"), "identifier");
        assert_eq!(disallowed("1 + 'a' * y"), "string literal");
    }

    #[test]
    fn test_syntax_error_wins_over_disallowed_construct() {
        assert!(is_syntax_error("x + (1"));
        assert!(is_syntax_error("__import__('os'"));
    }

    #[test]
    fn test_keyword_prefixed_identifiers() {
        assert_eq!(disallowed("notx"), "identifier");
        assert_eq!(disallowed("android"), "identifier");
        assert_eq!(disallowed("island"), "identifier");
        assert_eq!(disallowed("Truex"), "identifier");
    }

    #[test]
    fn test_limits_are_applied_before_parsing() {
        let limits = Limits {
            max_length: 16,
            max_depth: 3,
        };
        assert!(ExpressionParser::parse_with_limits("((((1))))", &limits).is_err());
        assert!(ExpressionParser::parse_with_limits("1 + 1 + 1 + 1 + 1", &limits).is_err());
        assert!(ExpressionParser::parse_with_limits("(((1)))", &limits).is_ok());
    }

    #[test]
    fn test_brace_literal_kinds() {
        assert_eq!(disallowed("{1}"), "set literal");
        assert_eq!(disallowed("{1 + 2, 3}"), "set literal");
        assert_eq!(disallowed("{1: 2, 3: 4}"), "dict literal");
        assert_eq!(disallowed("{(1): (2)}"), "dict literal");
        assert_eq!(disallowed("{} + 1"), "dict literal");
    }

    #[test]
    fn test_slices_and_subscripts() {
        for input in ["a[1]", "a[1:]", "a[:2]", "a[:]", "a[::]", "a[1:2:3]", "a[::-1]", "a[1, 2:3]"] {
            assert_eq!(disallowed(input), "subscript", "input {:?}", input);
        }
        assert!(is_syntax_error("a[]"));
        assert!(is_syntax_error("a[1:2:3:4]"));
    }

    fn assert_parses_quickly(input: &str, expected: &str) {
        let start = Instant::now();
        assert_eq!(disallowed(input), expected, "input {:?}", input);
        let elapsed = start.elapsed();
        assert!(
            elapsed < Duration::from_secs(2),
            "parsing {} bytes took {:?}",
            input.len(),
            elapsed
        );
    }

    #[test]
    fn test_nested_subscripts_parse_in_linear_time() {
        let input = format!("{}1{}", "a[".repeat(40), "]".repeat(40));
        assert_parses_quickly(&input, "subscript");

        let input = format!("{}1{}", "a[1:".repeat(40), "]".repeat(40));
        assert_parses_quickly(&input, "subscript");

        let input = format!("{}1{}", "(a[".repeat(40), "])".repeat(40));
        assert_parses_quickly(&input, "subscript");
    }

    #[test]
    fn test_nested_calls_parse_in_linear_time() {
        let input = format!("{}1{}", "f(".repeat(40), ")".repeat(40));
        assert_parses_quickly(&input, "function call");

        let input = format!("{}1{}", "f(x=".repeat(40), ")".repeat(40));
        assert_parses_quickly(&input, "function call");

        let input = format!("{}1{}", "{a[".repeat(40), "]}".repeat(40));
        assert_parses_quickly(&input, "set literal");
    }

    #[test]
    fn test_unclosed_nesting_fails_in_linear_time() {
        for opener in ["a[", "f(", "(a[", "{a:"] {
            let input = format!("{}1", opener.repeat(40));
            let start = Instant::now();
            assert!(is_syntax_error(&input), "input {:?}", input);
            assert!(start.elapsed() < Duration::from_secs(2), "input {:?}", input);
        }
    }

    #[test]
    fn test_deeply_nested_input_is_rejected() {
        let input = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(is_syntax_error(&input));
        let input = format!("{}1", "-".repeat(500));
        assert!(is_syntax_error(&input));
    }
}
