use sgp4::{Constants, Elements};

use crate::catalog::error::FormatError;
use crate::catalog::record::{canonical_line, IdentityKey, OrbitalRecord, SourceTag};

/// Raw name line plus both element lines of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleTriplet {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// A triplet that failed to parse, kept for diagnostics.
#[derive(Debug)]
pub struct Rejected {
    pub triplet: TleTriplet,
    pub error: FormatError,
}

/// Groups consecutive lines into triplets. A trailing group of one or two
/// lines is dropped.
pub struct Triplets<I> {
    lines: I,
}

impl<I, S> Iterator for Triplets<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = TleTriplet;

    fn next(&mut self) -> Option<Self::Item> {
        let name = clean(self.lines.next()?.as_ref());
        let line1 = clean(self.lines.next()?.as_ref());
        let line2 = clean(self.lines.next()?.as_ref());
        Some(TleTriplet { name, line1, line2 })
    }
}

pub fn triplets<I, S>(lines: I) -> Triplets<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Triplets {
        lines: lines.into_iter(),
    }
}

fn clean(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_string()
}

/// Turns TLE text from one source into orbital records.
pub struct TleParser {
    source: SourceTag,
}

#[derive(Default)]
pub struct ParseReport {
    pub records: Vec<OrbitalRecord>,
    pub rejected: Vec<Rejected>,
}

impl TleParser {
    pub fn new(source: SourceTag) -> Self {
        Self { source }
    }

    /// Lazily parses the lines, yielding one result per complete triplet.
    pub fn records<'a, I, S>(
        &'a self,
        lines: I,
    ) -> impl Iterator<Item = Result<OrbitalRecord, Rejected>> + 'a
    where
        I: IntoIterator<Item = S>,
        I: 'a,
        I::IntoIter: 'a,
        S: AsRef<str> + 'a,
    {
        triplets(lines).map(move |triplet| match self.parse_triplet(&triplet) {
            Ok(record) => Ok(record),
            Err(error) => Err(Rejected { triplet, error }),
        })
    }

    /// Parses a whole file's text. Malformed records are logged and skipped.
    pub fn parse(&self, text: &str) -> ParseReport {
        let mut report = ParseReport::default();
        for result in self.records(text.lines()) {
            match result {
                Ok(record) => report.records.push(record),
                Err(rejected) => {
                    log::warn!(
                        "Line does not conform to tle format ({}):\n       {}\n       {}\n       {}",
                        rejected.error,
                        rejected.triplet.name,
                        rejected.triplet.line1,
                        rejected.triplet.line2
                    );
                    report.rejected.push(rejected);
                }
            }
        }
        report
    }

    pub fn parse_triplet(&self, triplet: &TleTriplet) -> Result<OrbitalRecord, FormatError> {
        let name = triplet.name.trim().to_string();
        let elements = Elements::from_tle(
            Some(name.clone()),
            triplet.line1.as_bytes(),
            triplet.line2.as_bytes(),
        )?;
        let constants = Constants::from_elements(&elements)?;

        let mut parts = triplet.line1.split_whitespace().skip(1);
        let catalog_number = parts.next().unwrap_or_default().to_string();
        let international_designator = parts.next().unwrap_or_default().to_string();

        let identity = IdentityKey::from_canonical(&canonical_line(&name, &elements));

        Ok(OrbitalRecord {
            name,
            catalog_number,
            international_designator,
            identity,
            elements,
            constants,
            source: self.source.clone(),
            picked: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{tle_text, ISS, NOAA_18, NOAA_20};

    fn parser() -> TleParser {
        TleParser::new(crate::test_support::source_tag("visual"))
    }

    #[test]
    fn seven_lines_yield_two_records() {
        let mut text = tle_text(&[ISS, NOAA_18]);
        text.push_str("LEFTOVER NAME\n");
        let report = parser().parse(&text);
        assert_eq!(report.records.len(), 2);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn record_count_is_floor_of_lines_over_three() {
        let full = tle_text(&[ISS, NOAA_18, NOAA_20]);
        let lines: Vec<&str> = full.lines().collect();
        for n in 0..=lines.len() {
            let report = parser().parse(&lines[..n].join("\n"));
            assert_eq!(report.records.len(), n / 3, "with {} lines", n);
        }
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let mut text = String::from("BROKEN\n1 garbage\n2 garbage\n");
        text.push_str(&tle_text(&[ISS]));
        let report = parser().parse(&text);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].triplet.name, "BROKEN");
        assert_eq!(report.records[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn catalog_number_and_designator_come_from_line_one_tokens() {
        let report = parser().parse(&tle_text(&[ISS]));
        let record = &report.records[0];
        assert_eq!(record.catalog_number, "25544U");
        assert_eq!(record.international_designator, "98067A");
        assert!(!record.picked);
        assert_eq!(record.source.id, "visual");
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = tle_text(&[ISS]).replace('\n', "\r\n");
        let report = parser().parse(&text);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn identity_ignores_the_name_line() {
        let renamed = ("ZARYA", ISS.1, ISS.2);
        let a = parser().parse(&tle_text(&[ISS])).records.remove(0);
        let b = parser().parse(&tle_text(&[renamed])).records.remove(0);
        assert_eq!(a.identity, b.identity);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn lazy_iterator_reports_each_triplet() {
        let mut text = tle_text(&[ISS]);
        text.push_str("BROKEN\n1 x\n2 y\n");
        let parser = parser();
        let results: Vec<_> = parser.records(text.lines()).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
