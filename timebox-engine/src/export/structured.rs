use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::errors::{EngineError, EngineResult};
use crate::models::{Segment, SegmentKind, Workout};

pub(crate) const ROOT_ELEMENT: &str = "workout_file";

/// Encode a workout as a structured (`.zwo`) trainer document.
///
/// `description` overrides the workout's own description; when neither is
/// set the element is omitted. Output is deterministic for a given input.
pub fn encode_structured(
    workout: &Workout,
    author: Option<&str>,
    description: Option<&str>,
) -> EngineResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

    if let Some(author) = author.filter(|a| !a.is_empty()) {
        write_text_element(&mut writer, "author", author)?;
    }
    write_text_element(&mut writer, "name", &workout.name)?;
    if let Some(description) = description
        .or(workout.description.as_deref())
        .filter(|d| !d.is_empty())
    {
        write_text_element(&mut writer, "description", description)?;
    }
    write_text_element(&mut writer, "sportType", "bike")?;

    emit(&mut writer, Event::Start(BytesStart::new("workout")))?;
    for segment in &workout.segments {
        write_segment(&mut writer, segment)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("workout")))?;
    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Element name used for a segment of the given rendered kind.
pub(crate) fn element_name(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Steady => "SteadyState",
        SegmentKind::Ramp => "Ramp",
        SegmentKind::Warmup => "Warmup",
        SegmentKind::Cooldown => "Cooldown",
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> EngineResult<()> {
    writer.write_event(event).map_err(EngineError::encoding)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> EngineResult<()> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn write_segment(writer: &mut Writer<Vec<u8>>, segment: &Segment) -> EngineResult<()> {
    let kind = segment.rendered_kind();
    let mut attributes = vec![("Duration", segment.duration_seconds.to_string())];

    if kind == SegmentKind::Steady {
        attributes.push(("Power", format_power(segment.power_start)));
    } else {
        attributes.push(("PowerLow", format_power(segment.power_start)));
        attributes.push(("PowerHigh", format_power(segment.end_power())));
    }
    if let Some(cadence) = segment.cadence {
        attributes.push(("Cadence", cadence.to_string()));
    }

    let tag = element_name(kind);
    let element = BytesStart::new(tag)
        .with_attributes(attributes.iter().map(|(key, value)| (*key, value.as_str())));

    match segment.note.as_deref() {
        Some(note) => {
            emit(writer, Event::Start(element))?;
            let text_event = BytesStart::new("textevent")
                .with_attributes([("timeoffset", "0"), ("message", note)]);
            emit(writer, Event::Empty(text_event))?;
            emit(writer, Event::End(BytesEnd::new(tag)))
        }
        None => emit(writer, Event::Empty(element)),
    }
}

fn format_power(value: f64) -> String {
    format!("{value:.3}")
}
