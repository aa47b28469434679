// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CoViS3D XML scene reader and writer.
//!
//! The XML flavor is a tree-structured document with one `<Scene>` root
//! containing a sequence of `<Primitive3D>` children:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Scene version="1.0">
//!   <Primitive3D observation="0">
//!     <Location x="1" y="2" z="3"/>
//!     <Orientation qw="1" qx="0" qy="0" qz="0"/>
//!     <Weight>0.5</Weight>
//!     <Descriptor>0.1 0.9</Descriptor>
//!   </Primitive3D>
//! </Scene>
//! ```
//!
//! The reader streams XML events lazily, decoding one `Primitive3D` per
//! call; `reset` re-parses from the source path, because the document
//! cursor cannot be rewound in place. The writer accumulates records in an
//! owned buffer and serializes the whole document on every commit - a
//! tree-structured format cannot be validly truncated mid-document.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::warn;

use crate::core::{FormatTag, KernelPayload, ObsError, Observation, Result};
use crate::io::traits::{ObservationReader, ObservationWriter};

type XmlFileReader = Reader<BufReader<File>>;

/// Format a coordinate for the document: on-disk precision is `f32`.
fn format_value(v: f64) -> String {
    (v as f32).to_string()
}

// =============================================================================
// Reader
// =============================================================================

/// Streaming reader over a CoViS3D XML scene document.
pub struct Covis3dXmlReader {
    path: String,
    reader: Option<XmlFileReader>,
    buf: Vec<u8>,
    ordinal: usize,
    exhausted: bool,
}

impl Covis3dXmlReader {
    /// Open a scene document for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = Self {
            path: path.as_ref().to_string_lossy().to_string(),
            reader: None,
            buf: Vec::new(),
            ordinal: 0,
            exhausted: false,
        };
        reader.reopen()?;
        Ok(reader)
    }

    /// Re-parse the document from the source path.
    fn reopen(&mut self) -> Result<()> {
        let mut reader = Reader::from_file(&self.path)
            .map_err(|e| ObsError::io(format!("open {} for reading", self.path), e.to_string()))?;
        reader.config_mut().trim_text(true);
        self.reader = Some(reader);
        self.ordinal = 0;
        self.exhausted = false;
        Ok(())
    }
}

impl ObservationReader for Covis3dXmlReader {
    fn format(&self) -> FormatTag {
        FormatTag::Covis3d
    }

    fn reset(&mut self) -> Result<()> {
        self.reopen()
    }

    fn next_observation(&mut self) -> Result<Option<Observation>> {
        if self.exhausted {
            return Ok(None);
        }
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };
        let ordinal = self.ordinal;

        loop {
            self.buf.clear();
            let event = reader.read_event_into(&mut self.buf).map_err(|e| {
                ObsError::parse_at(FormatTag::Covis3d, ordinal, format!("malformed XML: {e}"))
            })?;
            match event {
                Event::Start(e) if e.local_name().as_ref() == b"Primitive3D" => {
                    let mut scratch = Vec::new();
                    let obs = decode_primitive(reader, &mut scratch, ordinal)?;
                    self.ordinal += 1;
                    return Ok(Some(obs));
                }
                Event::Empty(e) if e.local_name().as_ref() == b"Primitive3D" => {
                    return Err(ObsError::parse_at(
                        FormatTag::Covis3d,
                        ordinal,
                        "Primitive3D element has no Location",
                    ));
                }
                Event::Eof => {
                    self.exhausted = true;
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

/// Text-bearing child elements of `Primitive3D`.
enum TextTarget {
    Weight,
    Descriptor,
}

/// Decode one `Primitive3D` element; the opening tag has been consumed.
fn decode_primitive(
    reader: &mut XmlFileReader,
    buf: &mut Vec<u8>,
    ordinal: usize,
) -> Result<Observation> {
    let mut position: Option<[f64; 3]> = None;
    let mut orientation = [1.0, 0.0, 0.0, 0.0];
    let mut weight = 1.0;
    let mut descriptor = Vec::new();
    let mut text_target: Option<TextTarget> = None;

    loop {
        buf.clear();
        let event = reader.read_event_into(buf).map_err(|e| {
            ObsError::parse_at(FormatTag::Covis3d, ordinal, format!("malformed XML: {e}"))
        })?;
        match event {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"Location" => {
                    position = Some([
                        attr_value(&e, "x", ordinal)?,
                        attr_value(&e, "y", ordinal)?,
                        attr_value(&e, "z", ordinal)?,
                    ]);
                }
                b"Orientation" => {
                    orientation = [
                        attr_value(&e, "qw", ordinal)?,
                        attr_value(&e, "qx", ordinal)?,
                        attr_value(&e, "qy", ordinal)?,
                        attr_value(&e, "qz", ordinal)?,
                    ];
                }
                b"Weight" => text_target = Some(TextTarget::Weight),
                b"Descriptor" => text_target = Some(TextTarget::Descriptor),
                other => {
                    return Err(ObsError::parse_at(
                        FormatTag::Covis3d,
                        ordinal,
                        format!(
                            "unexpected element '{}' in Primitive3D",
                            String::from_utf8_lossy(other)
                        ),
                    ));
                }
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| {
                    ObsError::parse_at(FormatTag::Covis3d, ordinal, format!("bad text node: {e}"))
                })?;
                match text_target {
                    Some(TextTarget::Weight) => {
                        weight = text.trim().parse::<f32>().map(f64::from).map_err(|_| {
                            ObsError::parse_at(
                                FormatTag::Covis3d,
                                ordinal,
                                format!("non-numeric Weight '{}'", text.trim()),
                            )
                        })?;
                    }
                    Some(TextTarget::Descriptor) => {
                        descriptor.clear();
                        for token in text.split_whitespace() {
                            let v = token.parse::<f32>().map_err(|_| {
                                ObsError::parse_at(
                                    FormatTag::Covis3d,
                                    ordinal,
                                    format!("non-numeric Descriptor value '{token}'"),
                                )
                            })?;
                            descriptor.push(v as f64);
                        }
                    }
                    None => {}
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"Primitive3D" => break,
            Event::End(_) => text_target = None,
            Event::Eof => {
                return Err(ObsError::parse_at(
                    FormatTag::Covis3d,
                    ordinal,
                    "document ended inside Primitive3D",
                ));
            }
            _ => {}
        }
    }

    let position = position.ok_or_else(|| {
        ObsError::parse_at(FormatTag::Covis3d, ordinal, "Primitive3D missing Location")
    })?;
    let kernel = KernelPayload {
        position,
        orientation,
        weight,
    };
    let mut obs = Observation::with_kernel(FormatTag::Covis3d, kernel);
    obs.descriptor = descriptor;
    Ok(obs)
}

/// Look up one numeric attribute on an element.
fn attr_value(element: &BytesStart, name: &str, ordinal: usize) -> Result<f64> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| {
            ObsError::parse_at(FormatTag::Covis3d, ordinal, format!("bad attribute: {e}"))
        })?;
        if attr.key.as_ref() != name.as_bytes() {
            continue;
        }
        let value = attr.unescape_value().map_err(|e| {
            ObsError::parse_at(FormatTag::Covis3d, ordinal, format!("bad attribute: {e}"))
        })?;
        return value.parse::<f32>().map(f64::from).map_err(|_| {
            ObsError::parse_at(
                FormatTag::Covis3d,
                ordinal,
                format!("non-numeric value '{value}' for attribute '{name}'"),
            )
        });
    }
    Err(ObsError::parse_at(
        FormatTag::Covis3d,
        ordinal,
        format!(
            "missing attribute '{name}' on '{}'",
            String::from_utf8_lossy(element.local_name().as_ref())
        ),
    ))
}

// =============================================================================
// Writer
// =============================================================================

/// Buffered writer producing a CoViS3D XML scene document.
///
/// Each `write_observation` appends to an owned buffer; `write_buffer`
/// serializes the full document to the destination in one pass. `init`
/// already materializes the empty scene skeleton, so a destination exists
/// (and is valid) before the first record is committed.
pub struct Covis3dXmlWriter {
    path: String,
    buffer: Vec<Observation>,
    initialized: bool,
    dirty: bool,
}

impl Covis3dXmlWriter {
    /// Create a writer bound to the given output path. No byte is written
    /// until [`init`](ObservationWriter::init).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            buffer: Vec::new(),
            initialized: false,
            dirty: false,
        }
    }

    /// Serialize the accumulated scene document.
    fn serialize(&self) -> Result<Vec<u8>> {
        fn io_err<E: std::fmt::Display>(e: E) -> ObsError {
            ObsError::io("serialize scene document", e.to_string())
        }

        let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(io_err)?;

        let mut scene = BytesStart::new("Scene");
        scene.push_attribute(("version", "1.0"));
        xml.write_event(Event::Start(scene)).map_err(io_err)?;

        for (i, obs) in self.buffer.iter().enumerate() {
            let mut primitive = BytesStart::new("Primitive3D");
            primitive.push_attribute(("observation", i.to_string().as_str()));
            xml.write_event(Event::Start(primitive)).map_err(io_err)?;

            let mut location = BytesStart::new("Location");
            location.push_attribute(("x", format_value(obs.kernel.position[0]).as_str()));
            location.push_attribute(("y", format_value(obs.kernel.position[1]).as_str()));
            location.push_attribute(("z", format_value(obs.kernel.position[2]).as_str()));
            xml.write_event(Event::Empty(location)).map_err(io_err)?;

            let mut orientation = BytesStart::new("Orientation");
            orientation.push_attribute(("qw", format_value(obs.kernel.orientation[0]).as_str()));
            orientation.push_attribute(("qx", format_value(obs.kernel.orientation[1]).as_str()));
            orientation.push_attribute(("qy", format_value(obs.kernel.orientation[2]).as_str()));
            orientation.push_attribute(("qz", format_value(obs.kernel.orientation[3]).as_str()));
            xml.write_event(Event::Empty(orientation)).map_err(io_err)?;

            xml.write_event(Event::Start(BytesStart::new("Weight")))
                .map_err(io_err)?;
            let weight = format_value(obs.kernel.weight);
            xml.write_event(Event::Text(BytesText::new(&weight)))
                .map_err(io_err)?;
            xml.write_event(Event::End(BytesEnd::new("Weight")))
                .map_err(io_err)?;

            if !obs.descriptor.is_empty() {
                xml.write_event(Event::Start(BytesStart::new("Descriptor")))
                    .map_err(io_err)?;
                let text = obs
                    .descriptor
                    .iter()
                    .map(|&v| format_value(v))
                    .collect::<Vec<_>>()
                    .join(" ");
                xml.write_event(Event::Text(BytesText::new(&text)))
                    .map_err(io_err)?;
                xml.write_event(Event::End(BytesEnd::new("Descriptor")))
                    .map_err(io_err)?;
            }

            xml.write_event(Event::End(BytesEnd::new("Primitive3D")))
                .map_err(io_err)?;
        }

        xml.write_event(Event::End(BytesEnd::new("Scene")))
            .map_err(io_err)?;

        let mut bytes = xml.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Write the full document to the destination, truncating.
    fn commit(&self) -> Result<()> {
        let bytes = self.serialize()?;
        let mut file = File::create(&self.path).map_err(|e| {
            ObsError::io(format!("create {} for writing", self.path), e.to_string())
        })?;
        file.write_all(&bytes)
            .map_err(|e| ObsError::io(format!("write {}", self.path), e.to_string()))?;
        file.flush()
            .map_err(|e| ObsError::io(format!("flush {}", self.path), e.to_string()))?;
        Ok(())
    }
}

impl ObservationWriter for Covis3dXmlWriter {
    fn format(&self) -> FormatTag {
        FormatTag::Covis3d
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn init(&mut self) -> Result<()> {
        self.buffer.clear();
        self.commit()?;
        self.initialized = true;
        self.dirty = false;
        Ok(())
    }

    fn write_observation(&mut self, observation: &Observation) -> Result<()> {
        if !self.initialized {
            return Err(ObsError::contract(
                "covis3d writer: write_observation called before init",
            ));
        }
        if observation.tag() != FormatTag::Covis3d {
            return Err(ObsError::contract(format!(
                "covis3d writer fed a {} observation",
                observation.tag()
            )));
        }
        self.buffer.push(observation.clone());
        self.dirty = true;
        Ok(())
    }

    fn write_buffer(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(ObsError::contract(
                "covis3d writer: write_buffer called before init",
            ));
        }
        self.commit()?;
        self.dirty = false;
        Ok(())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.dirty = false;
    }

    fn buffered_count(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for Covis3dXmlWriter {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                path = %self.path,
                pending = self.buffer.len(),
                "covis3d writer dropped with uncommitted observations"
            );
        }
    }
}
