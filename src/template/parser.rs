use nom::{
    IResult, Offset, Parser as NomParser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1},
    combinator::{opt, recognize},
    multi::{many0_count, separated_list0},
    sequence::{delimited, pair, preceded},
};

pub const PROTOTYPE_KEYWORD: &str = "PROTOTYPE";

/// A parameter as written in the declaration, before kinds are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam<'a> {
    pub kind: &'a str,
    pub name: &'a str,
    pub count_param: Option<&'a str>,
}

/// `PROTOTYPE <RET> <name>(<KIND name[:count]>, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub return_kind: &'a str,
    pub name: &'a str,
    pub params: Vec<RawParam<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationError {
    /// Byte offset into the declaration text.
    pub offset: usize,
    pub message: String,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parameter(input: &str) -> IResult<&str, RawParam<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, kind) = identifier(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = identifier(input)?;
    let (input, count_param) = opt(preceded(char(':'), identifier)).parse(input)?;
    let (input, _) = multispace0(input)?;
    Ok((
        input,
        RawParam {
            kind,
            name,
            count_param,
        },
    ))
}

fn declaration(input: &str) -> IResult<&str, Declaration<'_>> {
    let (input, _) = tag(PROTOTYPE_KEYWORD).parse(input)?;
    let (input, _) = multispace1(input)?;
    let (input, return_kind) = identifier(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, params) = delimited(
        char('('),
        separated_list0(char(','), parameter),
        preceded(multispace0, char(')')),
    )
    .parse(input)?;
    Ok((
        input,
        Declaration {
            return_kind,
            name,
            params,
        },
    ))
}

/// Parses a complete declaration. Line breaks count as ordinary whitespace,
/// so a declaration split over several lines parses like the joined line.
pub fn parse_declaration(src: &str) -> Result<Declaration<'_>, DeclarationError> {
    match declaration(src) {
        Ok((rest, decl)) if rest.trim().is_empty() => Ok(decl),
        Ok((rest, _)) => Err(DeclarationError {
            offset: src.offset(rest),
            message: "unexpected text after the parameter list".into(),
        }),
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(DeclarationError {
            offset: src.offset(err.input),
            message: format!(
                "malformed {PROTOTYPE_KEYWORD} declaration, expected \
                 `{PROTOTYPE_KEYWORD} <KIND> <name>(<KIND name[:count]>, ...)`"
            ),
        }),
        Err(nom::Err::Incomplete(_)) => Err(DeclarationError {
            offset: src.len(),
            message: format!("unterminated {PROTOTYPE_KEYWORD} declaration"),
        }),
    }
}
