//! Low-level nom parser functions for resolved style values.
//!
//! Only already-resolved values are handled here (what a computed style
//! reports): lengths, percentages, a few keywords, colors and linear
//! gradients. Selector or cascade syntax never reaches this module.

use crate::dimension::Dimension;
use crate::flow::VerticalAlign;
use crate::gradient::Gradient;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_until, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};
use thiserror::Error;
use weft_types::Color;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },
}

// --- Helper Parsers ---

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parses a signed decimal number such as `-12`, `0.5` or `.25`.
pub fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(pair(
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

// --- Unit & Dimension Parsers ---

fn parse_unit(input: &str) -> IResult<&str, f32> {
    alt((
        value(1.0, tag_no_case("px")),
        value(96.0 / 72.0, tag_no_case("pt")),
        value(96.0, tag_no_case("in")),
        value(96.0 / 2.54, tag_no_case("cm")),
        value(96.0 / 25.4, tag_no_case("mm")),
    ))
    .parse(input)
}

/// Parses a length and converts it to px (e.g., "12px", "9pt", "1in").
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    let (input, number) = parse_f32(input)?;
    let (input, multiplier) = opt(parse_unit).parse(input)?;
    Ok((input, number * multiplier.unwrap_or(1.0)))
}

/// Parses a dimension value (length, percentage, or "auto").
pub fn parse_dimension(input: &str) -> IResult<&str, Dimension> {
    alt((
        value(Dimension::Auto, tag_no_case("auto")),
        map(terminated(parse_f32, char('%')), Dimension::Percent),
        map(parse_length, Dimension::Px),
    ))
    .parse(input)
}

pub fn parse_vertical_align(input: &str) -> IResult<&str, VerticalAlign> {
    alt((
        value(VerticalAlign::Baseline, tag_no_case("baseline")),
        value(VerticalAlign::TextTop, tag_no_case("text-top")),
        value(VerticalAlign::TextBottom, tag_no_case("text-bottom")),
        value(VerticalAlign::Top, tag_no_case("top")),
        value(VerticalAlign::Middle, tag_no_case("middle")),
        value(VerticalAlign::Bottom, tag_no_case("bottom")),
        value(VerticalAlign::Sub, tag_no_case("sub")),
        value(VerticalAlign::Super, tag_no_case("super")),
        map(terminated(parse_f32, char('%')), VerticalAlign::Percent),
        map(parse_length, VerticalAlign::Length),
    ))
    .parse(input)
}

// --- Color & Gradient Parsers ---

/// Recognizes one color token, keeping functional notation intact.
fn color_token(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((tag_no_case("rgba("), take_until(")"), char(')'))),
        recognize((tag_no_case("rgb("), take_until(")"), char(')'))),
        recognize((char('#'), take_while1(|c: char| c.is_ascii_hexdigit()))),
        take_while1(|c: char| c.is_ascii_alphabetic()),
    ))
    .parse(input)
}

pub fn parse_color(input: &str) -> IResult<&str, Color> {
    map_res(color_token, Color::parse).parse(input)
}

fn parse_angle(input: &str) -> IResult<&str, f32> {
    alt((
        terminated(parse_f32, tag_no_case("deg")),
        map(terminated(parse_f32, tag_no_case("turn")), |t| t * 360.0),
        map(terminated(parse_f32, tag_no_case("rad")), |r| r.to_degrees()),
        value(0.0, tag_no_case("to top")),
        value(90.0, tag_no_case("to right")),
        value(180.0, tag_no_case("to bottom")),
        value(270.0, tag_no_case("to left")),
    ))
    .parse(input)
}

/// A color stop; an optional position after the color is accepted and ignored.
fn color_stop(input: &str) -> IResult<&str, Color> {
    terminated(
        parse_color,
        opt(preceded(multispace1, parse_dimension)),
    )
    .parse(input)
}

pub fn parse_linear_gradient(input: &str) -> IResult<&str, Gradient> {
    let (input, _) = tag_no_case("linear-gradient(").parse(input)?;
    let (input, angle) = opt(terminated(ws(parse_angle), char(','))).parse(input)?;
    let (input, stops) = separated_list1(char(','), ws(color_stop)).parse(input)?;
    let (input, _) = char(')').parse(input)?;
    match Gradient::new(angle.unwrap_or(180.0), &stops) {
        Some(gradient) => Ok((input, gradient)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

// --- Whole-value entry points ---

/// Runs `parser` over the complete value, mapping failure to an error naming the property.
pub fn run_parser<'a, O, F>(property: &str, input: &'a str, parser: F) -> Result<O, StyleParseError>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    all_consuming(ws(parser))
        .parse(input)
        .map(|(_, out)| out)
        .map_err(|_| StyleParseError::InvalidValue {
            property: property.to_string(),
            value: input.to_string(),
        })
}

/// Parses `normal` or a length into px; `normal` becomes `None`.
pub fn parse_normal_or_length(property: &str, input: &str) -> Result<Option<f32>, StyleParseError> {
    run_parser(
        property,
        input,
        alt((value(None, tag("normal")), map(parse_length, Some))),
    )
}

/// Parses a whitespace separated list of 1-4 lengths into (top, right, bottom, left).
pub fn parse_box_shorthand(property: &str, input: &str) -> Result<[f32; 4], StyleParseError> {
    let parts = run_parser(property, input, separated_list1(multispace1, parse_length))?;
    match parts.as_slice() {
        [all] => Ok([*all; 4]),
        [v, h] => Ok([*v, *h, *v, *h]),
        [t, h, b] => Ok([*t, *h, *b, *h]),
        [t, r, b, l] => Ok([*t, *r, *b, *l]),
        _ => Err(StyleParseError::Parse(format!(
            "Invalid number of values for {}: got {}, expected 1 to 4.",
            property,
            parts.len()
        ))),
    }
}
