//! Shared fixtures for unit tests.

use crate::catalog::{OrbitalRecord, SourceTag, TleParser};
use crate::sources::HexColor;

pub type Tle = (&'static str, &'static str, &'static str);

pub const ISS_LINE1: &str =
    "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_LINE2: &str =
    "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

pub const ISS: Tle = ("ISS (ZARYA)", ISS_LINE1, ISS_LINE2);

pub const NOAA_20: Tle = (
    "NOAA 20",
    "1 43013U 17073A   20194.55714455  .00000010  00000-0  25464-4 0  9997",
    "2 43013  98.7287 128.0467 0001195  95.8796 264.2522 14.19545651136219",
);

pub const NOAA_18: Tle = (
    "NOAA 18",
    "1 28654U 05018A   20194.54213889  .00000052  00000-0  52622-4 0  9993",
    "2 28654  99.0513 245.3268 0014143 102.5117 257.7623 14.12413839780513",
);

pub fn tle_text(sets: &[Tle]) -> String {
    let mut text = String::new();
    for (name, line1, line2) in sets {
        text.push_str(name);
        text.push('\n');
        text.push_str(line1);
        text.push('\n');
        text.push_str(line2);
        text.push('\n');
    }
    text
}

pub fn source_tag(id: &str) -> SourceTag {
    SourceTag {
        id: id.to_string(),
        label: format!("{} feed", id),
        color: HexColor::parse("#00ff00").unwrap(),
    }
}

pub fn record(tle: Tle, source: &str) -> OrbitalRecord {
    TleParser::new(source_tag(source))
        .parse(&tle_text(&[tle]))
        .records
        .remove(0)
}
