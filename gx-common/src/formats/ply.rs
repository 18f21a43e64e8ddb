//! PLY header (.ply)
//!
//! # Layout
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment <text>                      (zero or more)
//! element vertex <vertex_count>
//! property <type> <name>              (one per packed vertex scalar)
//! element face <face_count>
//! property list uchar uint vertex_indices
//! end_header
//! <vertex payload><face payload>
//! ```
//!
//! Each face is stored as a `u8` corner count (always 3) followed by three
//! `u32` vertex indices.

use super::FormatError;

pub const PLY_MAGIC: &str = "ply";
pub const PLY_FORMAT_LINE: &str = "format binary_little_endian 1.0";
pub const FACE_LIST_PROPERTY: &str = "property list uchar uint vertex_indices";
pub const END_HEADER: &str = "end_header";

/// Corner count written before every face
pub const FACE_CORNERS: u8 = 3;

/// Bytes per face record: corner count + 3 × u32
pub const FACE_RECORD_SIZE: usize = 1 + 3 * 4;

/// Scalar types used by exported vertex properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    UChar,
    Int,
    Float,
}

impl ScalarType {
    /// Name as written in the header
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::UChar => "uchar",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
        }
    }

    /// Parse a header type name, including the sized aliases some writers use
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uchar" | "uint8" => Some(ScalarType::UChar),
            "int" | "int32" => Some(ScalarType::Int),
            "float" | "float32" => Some(ScalarType::Float),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        match self {
            ScalarType::UChar => 1,
            ScalarType::Int | ScalarType::Float => 4,
        }
    }
}

/// One `property <type> <name>` line of the vertex element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyProperty {
    pub ty: ScalarType,
    pub name: String,
}

impl PlyProperty {
    pub fn new(ty: ScalarType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Parsed or to-be-written PLY header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlyHeader {
    pub comments: Vec<String>,
    pub vertex_count: u32,
    pub vertex_properties: Vec<PlyProperty>,
    pub face_count: u32,
}

impl PlyHeader {
    pub fn new(vertex_count: u32, face_count: u32, vertex_properties: Vec<PlyProperty>) -> Self {
        Self {
            comments: Vec::new(),
            vertex_count,
            vertex_properties,
            face_count,
        }
    }

    /// Append a comment; multi-line text becomes one `comment` line per line
    pub fn with_comment(mut self, text: &str) -> Self {
        self.comments.extend(text.lines().map(str::to_owned));
        self
    }

    /// Write header to bytes (including the trailing `end_header\n`)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(128 + self.vertex_properties.len() * 24);

        out.push_str(PLY_MAGIC);
        out.push('\n');
        out.push_str(PLY_FORMAT_LINE);
        out.push('\n');
        for comment in &self.comments {
            out.push_str("comment ");
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(&format!("element vertex {}\n", self.vertex_count));
        for property in &self.vertex_properties {
            out.push_str(&format!("property {} {}\n", property.ty.name(), property.name));
        }
        out.push_str(&format!("element face {}\n", self.face_count));
        out.push_str(FACE_LIST_PROPERTY);
        out.push('\n');
        out.push_str(END_HEADER);
        out.push('\n');

        out.into_bytes()
    }

    /// Read header from bytes
    ///
    /// Returns the header and the offset of the first payload byte.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), FormatError> {
        let header_end = find_end_header(bytes).ok_or(FormatError::MissingEndHeader)?;
        let payload_offset = header_end + END_HEADER.len() + 1;

        let text = &bytes[..header_end];
        if !text.is_ascii() {
            return Err(FormatError::NonAsciiHeader);
        }
        // ASCII is always valid UTF-8
        let text = std::str::from_utf8(text).map_err(|_| FormatError::NonAsciiHeader)?;

        let mut lines = text.lines().enumerate().peekable();

        match lines.next() {
            Some((_, PLY_MAGIC)) => {}
            _ => return Err(FormatError::BadMagic),
        }
        match lines.next() {
            Some((_, PLY_FORMAT_LINE)) => {}
            Some((_, other)) => return Err(FormatError::UnsupportedFormat(other.to_owned())),
            None => return Err(FormatError::UnsupportedFormat(String::new())),
        }

        let mut header = PlyHeader::default();

        while let Some(&(_, line)) = lines.peek() {
            if let Some(comment) = line.strip_prefix("comment ") {
                header.comments.push(comment.to_owned());
            } else if line == "comment" {
                header.comments.push(String::new());
            } else {
                break;
            }
            lines.next();
        }

        let (line_no, line) = lines.next().ok_or(FormatError::MissingEndHeader)?;
        header.vertex_count = parse_element(line, "vertex").ok_or_else(|| unexpected(line_no, line))??;

        loop {
            let (line_no, line) = lines.next().ok_or(FormatError::MissingEndHeader)?;
            if let Some(count) = parse_element(line, "face") {
                header.face_count = count?;
                break;
            }
            header.vertex_properties.push(parse_property(line_no, line)?);
        }

        match lines.next() {
            Some((_, FACE_LIST_PROPERTY)) => {}
            Some((line_no, line)) => return Err(unexpected(line_no, line)),
            None => return Err(FormatError::MissingEndHeader),
        }

        if let Some((line_no, line)) = lines.next() {
            return Err(unexpected(line_no, line));
        }

        Ok((header, payload_offset))
    }
}

/// Find the start of an `end_header\n` line
fn find_end_header(bytes: &[u8]) -> Option<usize> {
    let needle = b"end_header\n";
    bytes
        .windows(needle.len())
        .enumerate()
        .find(|&(i, window)| window == needle && (i == 0 || bytes[i - 1] == b'\n'))
        .map(|(i, _)| i)
}

/// Parse `element <name> <count>`; `None` when the line is not that element
fn parse_element(line: &str, name: &str) -> Option<Result<u32, FormatError>> {
    let rest = line.strip_prefix("element ")?.strip_prefix(name)?.strip_prefix(' ')?;
    Some(
        rest.trim()
            .parse::<u32>()
            .map_err(|_| FormatError::InvalidCount(line.to_owned())),
    )
}

fn parse_property(line_no: usize, line: &str) -> Result<PlyProperty, FormatError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("property"), Some(ty), Some(name), None) => {
            let ty = ScalarType::from_name(ty).ok_or_else(|| unexpected(line_no, line))?;
            Ok(PlyProperty::new(ty, name))
        }
        _ => Err(unexpected(line_no, line)),
    }
}

fn unexpected(line_no: usize, line: &str) -> FormatError {
    FormatError::UnexpectedLine {
        line: line_no + 1,
        text: line.to_owned(),
    }
}
