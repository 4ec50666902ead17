use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::structured::ROOT_ELEMENT;
use crate::errors::{EngineError, EngineResult};
use crate::models::{Segment, SegmentKind, Workout};
use crate::services::interval_synthesis_service::MAX_DURATION_MINUTES;

/// Most repetitions one `IntervalsT` element may expand into
pub const MAX_INTERVAL_REPEATS: u32 = 500;

/// Longest timeline a single `IntervalsT` element may describe
const MAX_INTERVALS_SECONDS: u64 = MAX_DURATION_MINUTES as u64 * 60;

/// Header fields and timeline read back from a structured document
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredDocument {
    pub name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub segments: Vec<Segment>,
}

impl StructuredDocument {
    /// The document has no focus of its own; the caller supplies one.
    pub fn into_workout(self, focus: impl Into<String>) -> Workout {
        let mut workout = Workout::new(self.name, focus, self.segments);
        workout.description = self.description;
        workout
    }
}

/// Parse a structured (`.zwo`) document.
///
/// Understands `SteadyState`, `Warmup`, `Cooldown`, `Ramp` and `IntervalsT`
/// (expanded into work/recovery pairs) with nested `textevent` notes. The
/// result is not sanitized.
pub fn decode_structured(bytes: &[u8]) -> EngineResult<StructuredDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| EngineError::malformed_document(format!("not UTF-8: {err}")))?;

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut parser = DocumentParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => parser.open(&element, false)?,
            Event::Empty(element) => parser.open(&element, true)?,
            Event::End(_) => parser.close(),
            Event::Text(content) => parser.text(content.unescape()?.into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }

    parser.finish()
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    Name,
    Author,
    Description,
    Note,
}

#[derive(Debug, Default)]
struct DocumentParser {
    path: Vec<String>,
    seen_root: bool,
    seen_workout: bool,
    name: Option<String>,
    author: Option<String>,
    description: Option<String>,
    segments: Vec<Segment>,
    /// Segments of a non-empty segment element, flushed when it closes
    pending: Option<Vec<Segment>>,
    capture: Option<Capture>,
}

impl DocumentParser {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> EngineResult<()> {
        let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();

        match self.path.last().map(String::as_str) {
            None => {
                if tag != ROOT_ELEMENT && tag != "workout-file" {
                    return Err(EngineError::malformed_document(format!(
                        "unexpected root element <{tag}>"
                    )));
                }
                self.seen_root = true;
            }
            Some(parent) if parent == ROOT_ELEMENT || parent == "workout-file" => {
                self.capture = match tag.as_str() {
                    "name" => Some(Capture::Name),
                    "author" => Some(Capture::Author),
                    "description" => Some(Capture::Description),
                    _ => None,
                };
                if tag == "workout" {
                    self.seen_workout = true;
                }
            }
            Some("workout") => {
                let segments = parse_segment_element(&tag, element)?;
                if empty {
                    self.segments.extend(segments);
                } else {
                    self.pending = Some(segments);
                }
            }
            Some(_) if tag == "textevent" => {
                if let Some(pending) = self.pending.as_mut() {
                    match attribute(element, "message")? {
                        Some(message) => attach_note(pending, message),
                        None if !empty => self.capture = Some(Capture::Note),
                        None => {}
                    }
                }
            }
            Some(_) => {}
        }

        if !empty {
            self.path.push(tag);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.path.pop();
        self.capture = None;
        if self.path.last().map(String::as_str) == Some("workout") {
            if let Some(pending) = self.pending.take() {
                self.segments.extend(pending);
            }
        }
    }

    fn text(&mut self, content: String) {
        match self.capture {
            Some(Capture::Name) => self.name = Some(content),
            Some(Capture::Author) => self.author = Some(content),
            Some(Capture::Description) => self.description = Some(content),
            Some(Capture::Note) => {
                if let Some(pending) = self.pending.as_mut() {
                    attach_note(pending, content);
                }
            }
            None => {}
        }
    }

    fn finish(self) -> EngineResult<StructuredDocument> {
        if !self.seen_root {
            return Err(EngineError::malformed_document("missing <workout_file> root"));
        }
        if !self.seen_workout {
            return Err(EngineError::malformed_document("missing <workout> element"));
        }
        let name = self
            .name
            .ok_or_else(|| EngineError::malformed_document("missing <name> element"))?;

        debug!(name = %name, segments = self.segments.len(), "Decoded structured document");

        Ok(StructuredDocument {
            name,
            author: self.author,
            description: self.description,
            segments: self.segments,
        })
    }
}

/// The first note of an element goes to its first segment.
fn attach_note(segments: &mut [Segment], note: String) {
    if let Some(first) = segments.first_mut() {
        if first.note.is_none() {
            first.note = Some(note);
        }
    }
}

fn parse_segment_element(tag: &str, element: &BytesStart<'_>) -> EngineResult<Vec<Segment>> {
    let ramp_kind = match tag {
        "SteadyState" => None,
        "Warmup" => Some(SegmentKind::Warmup),
        "Cooldown" => Some(SegmentKind::Cooldown),
        "Ramp" => Some(SegmentKind::Ramp),
        "IntervalsT" => return parse_intervals(element),
        other => {
            return Err(EngineError::malformed_document(format!(
                "unsupported workout element <{other}>"
            )))
        }
    };

    let duration = required_seconds(element, "Duration")?;
    let mut segment = match ramp_kind {
        None => Segment::steady(duration, required_number(element, "Power")?),
        Some(kind) => Segment::ramp(
            kind,
            duration,
            required_number(element, "PowerLow")?,
            required_number(element, "PowerHigh")?,
        ),
    };
    segment.cadence = optional_cadence(element, "Cadence")?;

    Ok(vec![segment])
}

fn parse_intervals(element: &BytesStart<'_>) -> EngineResult<Vec<Segment>> {
    let repeat = required_seconds(element, "Repeat")?;
    let on_duration = required_seconds(element, "OnDuration")?;
    let off_duration = required_seconds(element, "OffDuration")?;
    let on_power = required_number(element, "OnPower")?;
    let off_power = required_number(element, "OffPower")?;
    let on_cadence = optional_cadence(element, "Cadence")?;
    let off_cadence = optional_cadence(element, "CadenceResting")?;

    let span = u64::from(repeat) * (u64::from(on_duration) + u64::from(off_duration));
    if repeat > MAX_INTERVAL_REPEATS || span > MAX_INTERVALS_SECONDS {
        return Err(EngineError::malformed_document(format!(
            "IntervalsT Repeat=\"{repeat}\" spans {span}s (limits: {MAX_INTERVAL_REPEATS} repeats, {MAX_INTERVALS_SECONDS}s)"
        )));
    }

    let mut segments = Vec::new();
    for _ in 0..repeat {
        let mut on = Segment::steady(on_duration, on_power);
        on.cadence = on_cadence;
        let mut off = Segment::steady(off_duration, off_power);
        off.cadence = off_cadence;
        segments.push(on);
        segments.push(off);
    }
    Ok(segments)
}

fn attribute(element: &BytesStart<'_>, key: &str) -> EngineResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn optional_number(element: &BytesStart<'_>, key: &str) -> EngineResult<Option<f64>> {
    let Some(raw) = attribute(element, key)? else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(EngineError::malformed_document(format!(
            "attribute {key}=\"{raw}\" is not a number"
        ))),
    }
}

fn required_number(element: &BytesStart<'_>, key: &str) -> EngineResult<f64> {
    optional_number(element, key)?
        .ok_or_else(|| EngineError::malformed_document(format!("missing attribute {key}")))
}

fn required_seconds(element: &BytesStart<'_>, key: &str) -> EngineResult<u32> {
    let value = required_number(element, key)?;
    to_whole(value)
        .ok_or_else(|| EngineError::malformed_document(format!("attribute {key} is negative")))
}

fn optional_cadence(element: &BytesStart<'_>, key: &str) -> EngineResult<Option<u32>> {
    match optional_number(element, key)? {
        None => Ok(None),
        Some(value) => to_whole(value).map(Some).ok_or_else(|| {
            EngineError::malformed_document(format!("attribute {key} is negative"))
        }),
    }
}

fn to_whole(value: f64) -> Option<u32> {
    if value < 0.0 {
        return None;
    }
    Some(value.round().min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_third_party_document() {
        let xml = br#"<?xml version="1.0"?>
<workout_file>
    <author>Somebody</author>
    <name>Over &amp; under</name>
    <sportType>bike</sportType>
    <tags><tag name="INTERVALS"/></tags>
    <workout>
        <Warmup Duration="600" PowerLow="0.25" PowerHigh="0.75"/>
        <IntervalsT Repeat="2" OnDuration="60" OffDuration="30" OnPower="1.2" OffPower="0.5" Cadence="100">
            <textevent timeoffset="0" message="Go"/>
        </IntervalsT>
        <SteadyState Duration="300.0" Power="0.65">
            <textevent timeoffset="10">Settle in</textevent>
        </SteadyState>
    </workout>
</workout_file>"#;

        let document = decode_structured(xml).unwrap();

        assert_eq!(document.name, "Over & under");
        assert_eq!(document.author.as_deref(), Some("Somebody"));
        assert_eq!(document.description, None);
        assert_eq!(
            document.segments,
            vec![
                Segment::ramp(SegmentKind::Warmup, 600, 0.25, 0.75),
                Segment::steady(60, 1.2).with_cadence(100).with_note("Go"),
                Segment::steady(30, 0.5),
                Segment::steady(60, 1.2).with_cadence(100),
                Segment::steady(30, 0.5),
                Segment::steady(300, 0.65).with_note("Settle in"),
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_workout_element() {
        let xml = br#"<workout_file><name>x</name><workout><FreeRide Duration="60"/></workout></workout_file>"#;
        let err = decode_structured(xml).unwrap_err();
        assert!(matches!(err, EngineError::MalformedStructuredDocument(_)));
    }

    #[test]
    fn test_rejects_missing_parts() {
        let cases: [&[u8]; 5] = [
            b"",
            b"<plan><name>x</name></plan>",
            b"<workout_file><name>x</name></workout_file>",
            br#"<workout_file><workout><SteadyState Duration="60" Power="1"/></workout></workout_file>"#,
            br#"<workout_file><name>x</name><workout><SteadyState Duration="60"/></workout></workout_file>"#,
        ];
        for xml in cases {
            let err = decode_structured(xml).unwrap_err();
            assert!(matches!(err, EngineError::MalformedStructuredDocument(_)), "{err:?}");
        }
    }

    #[test]
    fn test_rejects_oversized_intervals() {
        let cases: [&[u8]; 3] = [
            br#"<workout_file><name>x</name><workout><IntervalsT Repeat="5000000" OnDuration="1" OffDuration="1" OnPower="1.2" OffPower="0.5"/></workout></workout_file>"#,
            br#"<workout_file><name>x</name><workout><IntervalsT Repeat="4294967295" OnDuration="0" OffDuration="0" OnPower="1.2" OffPower="0.5"/></workout></workout_file>"#,
            br#"<workout_file><name>x</name><workout><IntervalsT Repeat="100" OnDuration="600" OffDuration="300" OnPower="1.2" OffPower="0.5"/></workout></workout_file>"#,
        ];
        for xml in cases {
            let err = decode_structured(xml).unwrap_err();
            assert!(matches!(err, EngineError::MalformedStructuredDocument(_)), "{err:?}");
        }
    }

    #[test]
    fn test_accepts_intervals_at_the_limit() {
        let xml = br#"<workout_file><name>x</name><workout><IntervalsT Repeat="500" OnDuration="30" OffDuration="30" OnPower="1.2" OffPower="0.5"/></workout></workout_file>"#;
        let document = decode_structured(xml).unwrap();
        assert_eq!(document.segments.len(), 1000);
    }

    #[test]
    fn test_rejects_non_numeric_power() {
        let xml = br#"<workout_file><name>x</name><workout><SteadyState Duration="60" Power="hard"/></workout></workout_file>"#;
        assert!(decode_structured(xml).is_err());
    }

    #[test]
    fn test_into_workout_keeps_description() {
        let xml = br#"<workout_file><name>Easy</name><description>Spin</description><workout><SteadyState Duration="60" Power="0.5"/></workout></workout_file>"#;
        let workout = decode_structured(xml).unwrap().into_workout("Recovery");
        assert_eq!(workout.focus, "Recovery");
        assert_eq!(workout.description.as_deref(), Some("Spin"));
    }
}
