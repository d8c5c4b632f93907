#![forbid(unsafe_code)]

//! FigJam container decoder + scene graph (headless).
//!
//! Pipeline: raw bytes -> [`container::Container`] (archive or tagged stream, length-prefixed
//! chunks) -> inflated scene payload -> [`record::RecordDecoder`] -> [`scene::SceneGraph`].

pub mod container;
pub mod error;
pub mod geom;
pub mod kiwi;
pub mod record;
pub mod scene;

pub use container::Container;
pub use error::{Error, Result};
pub use kiwi::KiwiRecordDecoder;
pub use record::{
    Blob, Connector, ConnectorEndpoint, ControlPoint, DecodedMessage, DecodedNode, Identifier,
    Magnet, NodeKind, NodeRecord, ParentLink, RecordDecodeError, RecordDecoder, ShapeKind,
    SiblingKey, SnapAxis, TextMidpoint, TextSection,
};
pub use scene::{Document, SceneGraph, SceneNode};

/// Decodes a document with a caller-supplied record decoder.
pub fn decode_container_with(bytes: &[u8], decoder: &dyn RecordDecoder) -> Result<Document> {
    let container = Container::read(bytes)?;
    decode_payload(&container, decoder)
}

/// Decodes a document using the schema shipped inside the container.
pub fn decode_document(bytes: &[u8]) -> Result<Document> {
    let container = Container::read(bytes)?;
    let decoder = KiwiRecordDecoder::from_container(&container)?;
    decode_payload(&container, &decoder)
}

fn decode_payload(container: &Container, decoder: &dyn RecordDecoder) -> Result<Document> {
    let payload = container.scene_payload()?;
    let message = decoder.decode(&payload)?;
    build_document(container.version, message)
}

/// Builds the scene graph from already-decoded records.
pub fn build_document(version: u32, message: DecodedMessage) -> Result<Document> {
    let DecodedMessage { nodes, blobs } = message;
    let graph = SceneGraph::build(nodes)?;
    tracing::debug!(
        version,
        records = graph.len(),
        blobs = blobs.len(),
        "built scene graph"
    );
    Ok(Document {
        version,
        graph,
        blobs,
    })
}

#[cfg(test)]
mod tests;
