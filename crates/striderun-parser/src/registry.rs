use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{FloorsParser, HeartRateParser, PedometerParser};
use crate::model::ParsedExport;

pub trait ExportParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<ParsedExport, ParserError>;
}

pub fn parse_export_file(content: &str) -> Result<ParsedExport, ParserError> {
    let pedometer = PedometerParser;
    let heart_rate = HeartRateParser;
    let floors = FloorsParser;
    let parsers: [&dyn ExportParser; 3] = [&pedometer, &heart_rate, &floors];
    parse_with_parsers(content, &parsers)
}

pub fn parse_with_parsers(
    content: &str,
    parsers: &[&dyn ExportParser],
) -> Result<ParsedExport, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
