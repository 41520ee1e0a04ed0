//! Placeholders, pieces and fragments.
//!
//! A fragment is the output of one node, kept as a list of pieces rather
//! than text so that slots can be resolved by walking ids instead of
//! substituting strings.

use nom::IResult;
use nom::Parser;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, digit1};
use nom::combinator::{map_res, opt, recognize};
use nom::sequence::{delimited, preceded};
use std::fmt;
use weft_types::NodeId;

/// A slot in the output of `owner`, at its `position`-th render child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placeholder {
    pub owner: NodeId,
    pub position: i32,
}

impl Placeholder {
    pub fn new(owner: NodeId, position: i32) -> Self {
        Self { owner, position }
    }
}

/// The literal marker left in output when a slot cannot be resolved.
impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{slot:{}:{}}}}}", self.owner.raw(), self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Open(NodeId),
    Close(NodeId),
    SelfClose(NodeId),
    Slot(Placeholder),
    /// Verbatim text, e.g. an extension's replacement output.
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub pieces: Vec<Piece>,
}

impl Fragment {
    /// A node with nothing inside it.
    pub fn leaf(node: NodeId) -> Self {
        Self {
            pieces: vec![Piece::SelfClose(node)],
        }
    }

    /// A node wrapping one slot per render child.
    pub fn container(node: NodeId, slots: usize) -> Self {
        if slots == 0 {
            return Self::leaf(node);
        }
        let mut pieces = Vec::with_capacity(slots + 2);
        pieces.push(Piece::Open(node));
        pieces.extend((0..slots).map(|i| Piece::Slot(Placeholder::new(node, i as i32))));
        pieces.push(Piece::Close(node));
        Self { pieces }
    }

    /// Splits replacement text at its slot markers so that references to
    /// other fragments take part in resolution.
    pub fn from_raw(text: &str) -> Self {
        let mut pieces = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match find_marker(rest) {
                Some((before, placeholder, after)) => {
                    if !before.is_empty() {
                        pieces.push(Piece::Raw(before.to_string()));
                    }
                    pieces.push(Piece::Slot(placeholder));
                    rest = after;
                }
                None => {
                    pieces.push(Piece::Raw(rest.to_string()));
                    break;
                }
            }
        }
        Self { pieces }
    }

    pub fn slots(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Slot(ph) => Some(*ph),
            _ => None,
        })
    }

    pub fn contains_slot(&self, placeholder: &Placeholder) -> bool {
        self.slots().any(|ph| ph == *placeholder)
    }
}

fn number(input: &str) -> IResult<&str, i32> {
    map_res(recognize((opt(char('-')), digit1)), str::parse::<i32>).parse(input)
}

fn marker(input: &str) -> IResult<&str, Placeholder> {
    delimited(
        tag("{{slot:"),
        (map_res(digit1, str::parse::<u32>), preceded(char(':'), number)),
        tag("}}"),
    )
    .map(|(owner, position)| Placeholder::new(NodeId::new(owner), position))
    .parse(input)
}

/// The text before the first well-formed marker, the marker, and the rest.
fn find_marker(input: &str) -> Option<(&str, Placeholder, &str)> {
    let mut offset = 0;
    loop {
        let (_, skipped) = take_until::<_, _, nom::error::Error<&str>>("{{slot:")
            .parse(&input[offset..])
            .ok()?;
        let start = offset + skipped.len();
        match marker(&input[start..]) {
            Ok((after, placeholder)) => return Some((&input[..start], placeholder, after)),
            Err(_) => offset = start + 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trips_through_raw_text() {
        let ph = Placeholder::new(NodeId::new(12), 3);
        let fragment = Fragment::from_raw(&format!("<include/>{}<tail/>", ph));
        assert_eq!(
            fragment.pieces,
            vec![
                Piece::Raw("<include/>".into()),
                Piece::Slot(ph),
                Piece::Raw("<tail/>".into())
            ]
        );
    }

    #[test]
    fn test_malformed_marker_stays_raw() {
        let fragment = Fragment::from_raw("{{slot:x:1}} and {{slot:4:0}}");
        assert_eq!(
            fragment.pieces,
            vec![
                Piece::Raw("{{slot:x:1}} and ".into()),
                Piece::Slot(Placeholder::new(NodeId::new(4), 0))
            ]
        );
    }

    #[test]
    fn test_out_of_range_position_stays_raw() {
        let fragment = Fragment::from_raw("{{slot:1:99999999999}}");
        assert_eq!(fragment.slots().count(), 0);
        assert_eq!(fragment.pieces, vec![Piece::Raw("{{slot:1:99999999999}}".into())]);
    }

    #[test]
    fn test_container_fragment_has_one_slot_per_child() {
        let node = NodeId::new(7);
        let fragment = Fragment::container(node, 2);
        assert_eq!(fragment.slots().count(), 2);
        assert!(fragment.contains_slot(&Placeholder::new(node, 1)));
        assert_eq!(Fragment::container(node, 0), Fragment::leaf(node));
    }
}
