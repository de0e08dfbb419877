//! The stage 1 representation is just the raw output from Pest
use once_cell::sync::Lazy;
use pest::error::InputLocation;
use pest::iterators::Pairs;
use pest::Parser;
use pest_derive::Parser;
use regex::Regex;
use thiserror::Error;

pub type PestError = pest::error::Error<Rule>;

/// Parsing error
///
/// The grammar is strict enough that once the text parses, translating it can only fail on
/// things the grammar can't express. This is the error for everything else.
///
/// We report which clause broke, and keep Pest's error around since its output points at the
/// exact spot.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid SELECT format:\n{0}")]
    InvalidSelect(Box<PestError>),
    #[error("Invalid WHERE clause format:\n{0}")]
    InvalidWhere(Box<PestError>),
    #[error("Invalid GROUP BY format:\n{0}")]
    InvalidGroupBy(Box<PestError>),
}

/// Pest parser
///
/// Pest will autogenerate all of the code needed, and will also give an enum called "Rule" that
/// will have all the rule names from the query.pest file.
#[derive(Parser)]
#[grammar = "engine/syntax/query.pest"]
struct Stage1Parser;

static WHERE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bWHERE\b").expect("static regex is valid"));
static GROUP_BY_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGROUP\s+BY\b").expect("static regex is valid"));

pub fn parse_stage1(input: &str) -> Result<Stage1Rep<'_>, ParseError> {
    let input = input.trim();

    match Stage1Parser::parse(Rule::query, input) {
        Ok(pest) => Ok(Stage1Rep { input, pest }),
        Err(error) => Err(classify(input, error)),
    }
}

/// Works out which clause the error belongs to.
///
/// If the head (SELECT ... FROM ... JOIN ...) parses on its own, the problem is further along:
/// in the WHERE or GROUP BY clause, depending on which keyword comes before the error position.
fn classify(input: &str, error: PestError) -> ParseError {
    let head_end = match Stage1Parser::parse(Rule::head, input) {
        Ok(mut pairs) => match pairs.next() {
            Some(head) => head.as_span().end(),
            None => return ParseError::InvalidSelect(Box::new(error)),
        },
        Err(head_error) => return ParseError::InvalidSelect(Box::new(head_error)),
    };

    let error_position = match error.location {
        InputLocation::Pos(position) => position,
        InputLocation::Span((start, _)) => start,
    };

    let tail = &input[head_end..];
    let keyword_before_error = |keyword: &Regex| {
        keyword
            .find(tail)
            .map(|found| head_end + found.start() <= error_position)
            .unwrap_or(false)
    };

    if keyword_before_error(&GROUP_BY_KEYWORD) {
        ParseError::InvalidGroupBy(Box::new(error))
    } else if keyword_before_error(&WHERE_KEYWORD) {
        ParseError::InvalidWhere(Box::new(error))
    } else {
        ParseError::InvalidSelect(Box::new(error))
    }
}

/// Pest pair holder
///
/// Everything in the stage 1 representation points into the input string, nothing is copied
/// until stage 2 builds the query.
#[derive(Debug)]
pub struct Stage1Rep<'a> {
    pub input: &'a str,
    pub pest: Pairs<'a, Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base() {
        let result = Stage1Parser::parse(Rule::query, "SELECT id FROM student");
        assert!(result.is_ok());

        let root = result.unwrap().peek();
        assert!(root.is_some());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert!(parse_stage1("select id from student where age = 1 group by id").is_ok());
        assert!(parse_stage1("SeLeCt id FrOm student").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_and_semicolon() {
        assert!(parse_stage1("  \n SELECT id FROM student;  \n").is_ok());
    }

    #[test]
    fn test_missing_from_is_a_select_error() {
        let error = parse_stage1("SELECT id student").unwrap_err();

        assert!(matches!(error, ParseError::InvalidSelect(_)));
        assert!(error.to_string().starts_with("Invalid SELECT format"));
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        let error = parse_stage1("SELECT FROM student").unwrap_err();

        assert!(matches!(error, ParseError::InvalidSelect(_)));
    }

    #[test]
    fn test_broken_condition_is_a_where_error() {
        let error = parse_stage1("SELECT id FROM student WHERE age 25").unwrap_err();

        assert!(matches!(error, ParseError::InvalidWhere(_)));
        assert!(error.to_string().starts_with("Invalid WHERE clause format"));
    }

    #[test]
    fn test_broken_group_by() {
        let error = parse_stage1("SELECT name FROM student GROUP BY").unwrap_err();

        assert!(matches!(error, ParseError::InvalidGroupBy(_)));
    }

    #[test]
    fn test_unsupported_join_kind_is_rejected() {
        let error =
            parse_stage1("SELECT a.id FROM a FULL JOIN b ON a.id = b.id").unwrap_err();

        assert!(matches!(error, ParseError::InvalidSelect(_)));
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let error = parse_stage1("SELECT id FROM student ORDER BY id").unwrap_err();

        assert!(matches!(error, ParseError::InvalidSelect(_)));
    }
}
