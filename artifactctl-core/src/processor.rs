use tracing::debug;

use crate::archive::ArchiveSink;
use crate::artifacts::extract;
use crate::conversation::{normalize, ConversationFull};
use crate::error::Result;
use crate::paths::{namespace_for, PathRegistry};

/// Write every artifact found in the assistant messages of `conv` into
/// `archive`, returning how many were written.
///
/// Paths are allocated under the conversation's sanitized name. User
/// messages are never scanned. A conversation without a message list is a
/// no-op.
pub fn process_conversation<A: ArchiveSink>(
    conv: &ConversationFull,
    archive: &mut A,
    registry: &mut PathRegistry,
) -> Result<usize> {
    let Some(messages) = conv.messages.as_ref() else {
        return Ok(0);
    };

    let namespace = namespace_for(conv.display_name.as_deref());
    let mut written = 0;

    for message in messages.iter().filter(|m| m.is_assistant()) {
        let text = normalize(message);
        for artifact in extract(&text) {
            let path = registry.allocate(&artifact.title, &artifact.language, &namespace);
            debug!(conv_id = %conv.id, %path, bytes = artifact.content.len(), "adding artifact");
            archive.put(&path, artifact.content.as_bytes())?;
            written += 1;
        }
    }

    Ok(written)
}
