//! Flat node records as produced by the record decoder, and the decoder boundary itself.

use crate::geom::{AffineMatrix, Point, Size};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Names a node within one document: `(session id, local id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Identifier {
    pub session_id: u32,
    pub local_id: u32,
}

impl Identifier {
    pub const ROOT: Identifier = Identifier::new(0, 0);

    pub const fn new(session_id: u32, local_id: u32) -> Self {
        Self {
            session_id,
            local_id,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session_id, self.local_id)
    }
}

/// A record's link to its parent: the parent identifier plus the sibling ordering key.
///
/// Links are only consumed by the scene graph builder; they never live on a [`NodeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentLink {
    pub parent: Identifier,
    pub position: SiblingKey,
}

/// Ordering key among siblings.
///
/// Documents store either plain numbers or fractional-index strings. Strings compare byte by
/// byte over their full length; numbers compare numerically and sort below every string.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SiblingKey {
    Number(f64),
    Index(String),
}

impl Default for SiblingKey {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl Ord for SiblingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Index(a), Self::Index(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Number(_), Self::Index(_)) => Ordering::Less,
            (Self::Index(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SiblingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SiblingKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SiblingKey {}

impl From<f64> for SiblingKey {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SiblingKey {
    fn from(value: &str) -> Self {
        Self::Index(value.to_string())
    }
}

impl From<String> for SiblingKey {
    fn from(value: String) -> Self {
        Self::Index(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeKind {
    Square,
    Ellipse,
    RoundedRectangle,
    Diamond,
    TriangleUp,
    TriangleDown,
    ParallelogramRight,
    ParallelogramLeft,
    EngDatabase,
    EngQueue,
    EngFile,
    EngFolder,
    Trapezoid,
    PredefinedProcess,
    Shield,
    DocumentSingle,
    DocumentMultiple,
    ManualInput,
    Hexagon,
    Chevron,
    Pentagon,
    Octagon,
    Star,
    Plus,
    ArrowLeft,
    ArrowRight,
    SummingJunction,
    Or,
    SpeechBubble,
    InternalStorage,
    Unknown,
}

impl ShapeKind {
    pub fn from_schema_name(name: &str) -> Self {
        match name {
            "SQUARE" => Self::Square,
            "ELLIPSE" => Self::Ellipse,
            "ROUNDED_RECTANGLE" => Self::RoundedRectangle,
            "DIAMOND" => Self::Diamond,
            "TRIANGLE_UP" => Self::TriangleUp,
            "TRIANGLE_DOWN" => Self::TriangleDown,
            "PARALLELOGRAM_RIGHT" => Self::ParallelogramRight,
            "PARALLELOGRAM_LEFT" => Self::ParallelogramLeft,
            "ENG_DATABASE" => Self::EngDatabase,
            "ENG_QUEUE" => Self::EngQueue,
            "ENG_FILE" => Self::EngFile,
            "ENG_FOLDER" => Self::EngFolder,
            "TRAPEZOID" => Self::Trapezoid,
            "PREDEFINED_PROCESS" => Self::PredefinedProcess,
            "SHIELD" => Self::Shield,
            "DOCUMENT_SINGLE" => Self::DocumentSingle,
            "DOCUMENT_MULTIPLE" => Self::DocumentMultiple,
            "MANUAL_INPUT" => Self::ManualInput,
            "HEXAGON" => Self::Hexagon,
            "CHEVRON" => Self::Chevron,
            "PENTAGON" => Self::Pentagon,
            "OCTAGON" => Self::Octagon,
            "STAR" => Self::Star,
            "PLUS" => Self::Plus,
            "ARROW_LEFT" => Self::ArrowLeft,
            "ARROW_RIGHT" => Self::ArrowRight,
            "SUMMING_JUNCTION" => Self::SummingJunction,
            "OR" => Self::Or,
            "SPEECH_BUBBLE" => Self::SpeechBubble,
            "INTERNAL_STORAGE" => Self::InternalStorage,
            _ => Self::Unknown,
        }
    }
}

/// The side (or center) of a node's box a connector endpoint attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Magnet {
    #[default]
    None,
    Auto,
    AutoHorizontal,
    Center,
    Top,
    Left,
    Bottom,
    Right,
    Unknown,
}

impl Magnet {
    pub fn from_schema_name(name: &str) -> Self {
        match name {
            "NONE" => Self::None,
            "AUTO" => Self::Auto,
            "AUTO_HORIZONTAL" => Self::AutoHorizontal,
            "CENTER" => Self::Center,
            "TOP" => Self::Top,
            "LEFT" => Self::Left,
            "BOTTOM" => Self::Bottom,
            "RIGHT" => Self::Right,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConnectorEndpoint {
    pub node: Option<Identifier>,
    /// Free-floating position in source units, used when `node` cannot be resolved.
    pub position: Option<Point>,
    pub magnet: Magnet,
}

/// Which running coordinate a control point keeps while the path moves along the other axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapAxis {
    /// Keep the running X; the point contributes its Y.
    KeepX,
    /// Keep the running Y; the point contributes its X.
    KeepY,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPoint {
    /// Position in source units (unscaled).
    pub position: Point,
    pub axis: SnapAxis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextSection {
    #[default]
    StartToMiddle,
    MiddleToEnd,
}

impl FromStr for TextSection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START_TO_MIDDLE" => Ok(Self::StartToMiddle),
            "MIDDLE_TO_END" => Ok(Self::MiddleToEnd),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextMidpoint {
    pub section: TextSection,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Connector {
    pub start: ConnectorEndpoint,
    pub end: ConnectorEndpoint,
    pub control_points: Vec<ControlPoint>,
    pub text_midpoint: Option<TextMidpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    Text,
    ShapeWithText { shape: ShapeKind },
    Connector(Connector),
    /// Any kind the compiler ignores (documents, canvases, stickies, ...). Holds the schema name.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: Identifier,
    pub kind: NodeKind,
    pub name: String,
    pub transform: AffineMatrix,
    pub size: Size,
}

impl NodeRecord {
    pub fn new(id: Identifier, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            transform: AffineMatrix::identity(),
            size: Size::zero(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transform(mut self, transform: AffineMatrix) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn connector(&self) -> Option<&Connector> {
        match &self.kind {
            NodeKind::Connector(c) => Some(c),
            _ => None,
        }
    }
}

/// Opaque binary payload carried after the scene graph. Never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Blob {
    #[serde(serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine as _;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNode {
    pub record: NodeRecord,
    pub parent: Option<ParentLink>,
}

impl DecodedNode {
    pub fn root(record: NodeRecord) -> Self {
        Self {
            record,
            parent: None,
        }
    }

    pub fn child_of(
        record: NodeRecord,
        parent: Identifier,
        position: impl Into<SiblingKey>,
    ) -> Self {
        Self {
            record,
            parent: Some(ParentLink {
                parent,
                position: position.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedMessage {
    pub nodes: Vec<DecodedNode>,
    pub blobs: Vec<Blob>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error decoding message chunk: {message}")]
pub struct RecordDecodeError {
    pub message: String,
}

impl RecordDecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns the inflated scene payload into flat records and blobs.
pub trait RecordDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedMessage, RecordDecodeError>;
}

impl<F> RecordDecoder for F
where
    F: Fn(&[u8]) -> Result<DecodedMessage, RecordDecodeError>,
{
    fn decode(&self, payload: &[u8]) -> Result<DecodedMessage, RecordDecodeError> {
        self(payload)
    }
}
