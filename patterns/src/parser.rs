use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, multispace0},
    combinator::{all_consuming, opt, recognize},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::{Pattern, PatternLibrary, Token, TokenTemplate, RECURSION_KEYWORD};

/// Surround a parser with optional whitespace.
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Require the parser to consume the whole input, ignoring surrounding
/// whitespace.
pub fn complete<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(ws(inner))
}

pub fn value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("\""), take_until("\""), tag("\"")),
        delimited(tag("\'"), take_until("\'"), tag("\'")),
    ))(input)
}

pub fn kind(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

pub fn token(input: &str) -> IResult<&str, Token> {
    let (rem, (matched_kind, matched_value)) =
        pair(kind, opt(preceded(multispace0, value)))(input)?;
    Ok((
        rem,
        Token {
            kind: matched_kind.to_owned(),
            value: matched_value.filter(|v| !v.is_empty()).map(str::to_owned),
        },
    ))
}

pub fn template(input: &str) -> IResult<&str, TokenTemplate> {
    let (rem, tok) = token(input)?;
    if tok.kind == RECURSION_KEYWORD && tok.value.is_none() {
        Ok((rem, TokenTemplate::RecursionPoint))
    } else {
        Ok((rem, TokenTemplate::Literal(tok)))
    }
}

pub fn pattern(input: &str) -> IResult<&str, Pattern> {
    let (rem, templates) = terminated(
        separated_list1(ws(tag(",")), ws(template)),
        ws(tag(";")),
    )(input)?;
    Ok((rem, Pattern(templates)))
}

pub fn library(input: &str) -> IResult<&str, PatternLibrary> {
    let (rem, patterns) = many0(ws(pattern))(input)?;
    Ok((rem, PatternLibrary { patterns }))
}

pub fn tokens(input: &str) -> IResult<&str, Vec<Token>> {
    separated_list0(ws(tag(",")), ws(token))(input)
}
