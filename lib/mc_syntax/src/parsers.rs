//! MicroC source text parsers.
//!
//! Parsers are written with `nom` combinators over `&str`. Every lexeme
//! swallows the whitespace that precedes it, so programs can be formatted
//! freely. The grammar is the classical MicroC one: declarations (`int x;`,
//! `int[4] a;`, `{ int fst; int snd } r;`), assignments, `read`/`write`,
//! `if`/`if-else` and `while` with brace-delimited blocks.

use crate::ast::{
    ArithmeticExpression, ArithmeticOperator, BooleanExpression, BooleanOperator, ReadTarget,
    RecordMember, RelationalOperator, Statement,
};
use crate::errors::{SyntaxError, SyntaxResult};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value, verify};
use nom::multi::{fold_many0, many0, many0_count};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{Finish, IResult};

const KEYWORDS: &[&str] = &["int", "if", "else", "while", "read", "write"];

/// Parses a full MicroC program into its statement sequence.
///
/// # Errors
///
/// Returns a [`SyntaxError`] when the input is not a well-formed program or
/// when trailing garbage remains after the last statement.
pub fn parse_program(input: &str) -> SyntaxResult<Vec<Statement>> {
    log::trace!("parsing program ({} bytes)...", input.len());
    match all_consuming(terminated(many0(statement), multispace0))(input).finish() {
        Ok((_, statements)) => Ok(statements),
        Err(err) if err.input.trim().is_empty() => Err(SyntaxError::Incomplete),
        Err(err) => {
            let snippet: String = err.input.trim_start().chars().take(24).collect();
            Err(SyntaxError::Parse(snippet))
        }
    }
}

fn sym<'a>(s: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(s))
}

fn raw_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        verify(preceded(multispace0, raw_identifier), |s: &str| {
            !KEYWORDS.contains(&s)
        }),
        str::to_string,
    )(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(preceded(multispace0, raw_identifier), move |s: &str| s == kw)
}

fn number(input: &str) -> IResult<&str, i64> {
    map_res(preceded(multispace0, digit1), str::parse)(input)
}

fn record_member(input: &str) -> IResult<&str, RecordMember> {
    alt((
        value(RecordMember::Fst, tag("fst")),
        value(RecordMember::Snd, tag("snd")),
    ))(input)
}

// ---- arithmetic expressions ----

fn arithmetic_expression(input: &str) -> IResult<&str, ArithmeticExpression> {
    let (input, init) = term(input)?;
    fold_many0(
        pair(
            preceded(
                multispace0,
                alt((
                    value(ArithmeticOperator::Add, char('+')),
                    value(ArithmeticOperator::Subtract, char('-')),
                )),
            ),
            term,
        ),
        move || init.clone(),
        |lhs, (op, rhs)| ArithmeticExpression::Binary(Box::new(lhs), op, Box::new(rhs)),
    )(input)
}

fn term(input: &str) -> IResult<&str, ArithmeticExpression> {
    let (input, init) = factor(input)?;
    fold_many0(
        pair(
            preceded(
                multispace0,
                alt((
                    value(ArithmeticOperator::Multiply, char('*')),
                    value(ArithmeticOperator::Divide, char('/')),
                    value(ArithmeticOperator::Modulo, char('%')),
                )),
            ),
            factor,
        ),
        move || init.clone(),
        |lhs, (op, rhs)| ArithmeticExpression::Binary(Box::new(lhs), op, Box::new(rhs)),
    )(input)
}

fn factor(input: &str) -> IResult<&str, ArithmeticExpression> {
    alt((
        map(number, ArithmeticExpression::Number),
        record_access,
        array_access,
        map(identifier, ArithmeticExpression::Variable),
        delimited(sym("("), arithmetic_expression, sym(")")),
    ))(input)
}

fn record_access(input: &str) -> IResult<&str, ArithmeticExpression> {
    map(
        pair(identifier, preceded(char('.'), record_member)),
        |(name, member)| ArithmeticExpression::RecordAccess(name, member),
    )(input)
}

fn array_access(input: &str) -> IResult<&str, ArithmeticExpression> {
    map(
        pair(
            identifier,
            delimited(sym("["), arithmetic_expression, sym("]")),
        ),
        |(name, index)| ArithmeticExpression::ArrayAccess(name, Box::new(index)),
    )(input)
}

// ---- boolean expressions ----

fn boolean_expression(input: &str) -> IResult<&str, BooleanExpression> {
    let (input, init) = boolean_term(input)?;
    fold_many0(
        pair(
            preceded(multispace0, value(BooleanOperator::Or, char('|'))),
            boolean_term,
        ),
        move || init.clone(),
        |lhs, (op, rhs)| BooleanExpression::Binary(Box::new(lhs), op, Box::new(rhs)),
    )(input)
}

fn boolean_term(input: &str) -> IResult<&str, BooleanExpression> {
    let (input, init) = boolean_factor(input)?;
    fold_many0(
        pair(
            preceded(multispace0, value(BooleanOperator::And, char('&'))),
            boolean_factor,
        ),
        move || init.clone(),
        |lhs, (op, rhs)| BooleanExpression::Binary(Box::new(lhs), op, Box::new(rhs)),
    )(input)
}

fn boolean_factor(input: &str) -> IResult<&str, BooleanExpression> {
    alt((
        map(preceded(sym("!"), boolean_factor), |inner| {
            BooleanExpression::Not(Box::new(inner))
        }),
        relation,
        delimited(sym("("), boolean_expression, sym(")")),
    ))(input)
}

fn relation(input: &str) -> IResult<&str, BooleanExpression> {
    map(
        tuple((
            arithmetic_expression,
            relational_operator,
            arithmetic_expression,
        )),
        |(lhs, op, rhs)| BooleanExpression::Relation(lhs, op, rhs),
    )(input)
}

fn relational_operator(input: &str) -> IResult<&str, RelationalOperator> {
    preceded(
        multispace0,
        alt((
            value(RelationalOperator::LessOrEqual, tag("<=")),
            value(RelationalOperator::GreaterOrEqual, tag(">=")),
            value(RelationalOperator::Equal, tag("==")),
            value(RelationalOperator::NotEqual, tag("!=")),
            value(RelationalOperator::LessThan, tag("<")),
            value(RelationalOperator::GreaterThan, tag(">")),
        )),
    )(input)
}

// ---- statements ----

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((
        declaration,
        if_statement,
        while_statement,
        read_statement,
        write_statement,
        assignment,
    ))(input)
}

fn declaration(input: &str) -> IResult<&str, Statement> {
    alt((int_or_array_declaration, record_declaration))(input)
}

fn int_or_array_declaration(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("int")(input)?;
    let (input, size) = opt(delimited(sym("["), number, sym("]")))(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = sym(";")(input)?;
    let statement = match size {
        Some(size) => Statement::ArrayDeclaration {
            name,
            size: size as u32,
        },
        None => Statement::IntDeclaration { name },
    };
    Ok((input, statement))
}

fn record_declaration(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tuple((
        sym("{"),
        keyword("int"),
        preceded(multispace0, tag("fst")),
        sym(";"),
        keyword("int"),
        preceded(multispace0, tag("snd")),
        sym("}"),
    ))(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = sym(";")(input)?;
    Ok((input, Statement::RecordDeclaration { name }))
}

fn assignment(input: &str) -> IResult<&str, Statement> {
    alt((
        record_member_assignment,
        array_assignment,
        record_assignment,
        int_assignment,
    ))(input)
}

fn record_member_assignment(input: &str) -> IResult<&str, Statement> {
    let (input, (name, member)) = pair(identifier, preceded(char('.'), record_member))(input)?;
    let (input, value) = delimited(sym(":="), arithmetic_expression, sym(";"))(input)?;
    Ok((
        input,
        Statement::RecordMemberAssignment {
            name,
            member,
            value,
        },
    ))
}

fn array_assignment(input: &str) -> IResult<&str, Statement> {
    let (input, (name, index)) = pair(
        identifier,
        delimited(sym("["), arithmetic_expression, sym("]")),
    )(input)?;
    let (input, value) = delimited(sym(":="), arithmetic_expression, sym(";"))(input)?;
    Ok((input, Statement::ArrayAssignment { name, index, value }))
}

fn record_assignment(input: &str) -> IResult<&str, Statement> {
    let (input, name) = terminated(identifier, sym(":="))(input)?;
    let (input, (first, second)) = delimited(
        sym("("),
        pair(arithmetic_expression, preceded(sym(","), arithmetic_expression)),
        sym(")"),
    )(input)?;
    let (input, _) = sym(";")(input)?;
    Ok((
        input,
        Statement::RecordAssignment {
            name,
            first,
            second,
        },
    ))
}

fn int_assignment(input: &str) -> IResult<&str, Statement> {
    let (input, name) = terminated(identifier, sym(":="))(input)?;
    let (input, value) = terminated(arithmetic_expression, sym(";"))(input)?;
    Ok((input, Statement::IntAssignment { name, value }))
}

fn read_statement(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("read")(input)?;
    let (input, target) = alt((
        map(
            pair(identifier, preceded(char('.'), record_member)),
            |(name, member)| ReadTarget::RecordMember(name, member),
        ),
        map(
            pair(
                identifier,
                delimited(sym("["), arithmetic_expression, sym("]")),
            ),
            |(name, index)| ReadTarget::Array(name, index),
        ),
        map(identifier, ReadTarget::Variable),
    ))(input)?;
    let (input, _) = sym(";")(input)?;
    Ok((input, Statement::Read(target)))
}

fn write_statement(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("write")(input)?;
    let (input, value) = terminated(arithmetic_expression, sym(";"))(input)?;
    Ok((input, Statement::Write(value)))
}

fn if_statement(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("if")(input)?;
    let (input, condition) = delimited(sym("("), boolean_expression, sym(")"))(input)?;
    let (input, then_branch) = block(input)?;
    let (input, else_branch) = opt(preceded(keyword("else"), block))(input)?;
    Ok((
        input,
        Statement::If {
            condition,
            then_branch,
            else_branch,
        },
    ))
}

fn while_statement(input: &str) -> IResult<&str, Statement> {
    let (input, _) = keyword("while")(input)?;
    let (input, condition) = delimited(sym("("), boolean_expression, sym(")"))(input)?;
    let (input, body) = block(input)?;
    Ok((input, Statement::While { condition, body }))
}

fn block(input: &str) -> IResult<&str, Vec<Statement>> {
    delimited(sym("{"), many0(statement), sym("}"))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declaration_and_assignment() {
        let program = parse_program("int x; x := 2;").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(
            program[0],
            Statement::IntDeclaration {
                name: "x".to_string()
            }
        );
        assert_eq!(
            program[1],
            Statement::IntAssignment {
                name: "x".to_string(),
                value: ArithmeticExpression::Number(2),
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse_program("x := 1 + 2 * 3;").unwrap();
        let Statement::IntAssignment { value, .. } = &program[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            *value,
            ArithmeticExpression::Binary(
                Box::new(ArithmeticExpression::Number(1)),
                ArithmeticOperator::Add,
                Box::new(ArithmeticExpression::Binary(
                    Box::new(ArithmeticExpression::Number(2)),
                    ArithmeticOperator::Multiply,
                    Box::new(ArithmeticExpression::Number(3)),
                )),
            )
        );
    }

    #[test]
    fn parses_record_declaration_and_member_access() {
        let program =
            parse_program("{ int fst; int snd } r; r := (3, 1); r.fst := r.snd; write r.fst;")
                .unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(
            program[2],
            Statement::RecordMemberAssignment {
                name: "r".to_string(),
                member: RecordMember::Fst,
                value: ArithmeticExpression::RecordAccess("r".to_string(), RecordMember::Snd),
            }
        );
    }

    #[test]
    fn parses_control_flow_with_boolean_operators() {
        let program = parse_program(
            "int input; read input; \
             if (input == 0 | input == 1) { input := 2; } \
             while (input > 1) { input := input - 1; }",
        )
        .unwrap();
        assert_eq!(program.len(), 4);
        let Statement::If { condition, .. } = &program[2] else {
            panic!("expected if statement");
        };
        assert!(matches!(
            condition,
            BooleanExpression::Binary(_, BooleanOperator::Or, _)
        ));
    }

    #[test]
    fn parses_array_program() {
        let program = parse_program("int[6] n; n[0] := 2; read n[1]; write n[0] + n[1];").unwrap();
        assert_eq!(
            program[0],
            Statement::ArrayDeclaration {
                name: "n".to_string(),
                size: 6,
            }
        );
        assert!(matches!(program[2], Statement::Read(ReadTarget::Array(_, _))));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_program("int x; x := ;").is_err());
        assert!(parse_program("int x; x := 2").is_err());
    }
}
