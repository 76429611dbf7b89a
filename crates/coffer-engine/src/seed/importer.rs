//! Seed importer
//!
//! Parses a seed file and replays it through the session: create,
//! populate, save - one object at a time, in file order.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use coffer_core::collection::{AddOptions, GroupAddOptions};
use coffer_core::errors::{CofferError, Result};
use coffer_core::model::{Datastream, DatastreamKind, ObjectState, Predicate, RelTarget};
use coffer_core::registry::ObjectType;
use coffer_core_types::Pid;

use crate::seed::format::{SeedDatastream, SeedObject, SeedV1};
use crate::session::Session;

fn invalid(reason: impl Into<String>) -> CofferError {
    CofferError::InvalidInput {
        reason: reason.into(),
    }
}

/// Import a seed file, returning the pids of the imported objects
pub fn import_seed(session: &Session, path: &Path) -> Result<Vec<Pid>> {
    let raw = std::fs::read_to_string(path)?;
    let seed: SeedV1 =
        serde_yaml::from_str(&raw).map_err(|err| invalid(format!("seed parse: {err}")))?;

    if seed.schema_version != 1 {
        return Err(invalid(format!(
            "unsupported seed schema version {}",
            seed.schema_version
        )));
    }

    let mut imported = Vec::with_capacity(seed.objects.len());
    for object in seed.objects {
        let pid = import_object(session, object)?;
        tracing::info!(pid = %pid, "imported seed object");
        imported.push(pid);
    }
    Ok(imported)
}

fn import_object(session: &Session, seed: SeedObject) -> Result<Pid> {
    let object_type = match &seed.model {
        Some(model) => ObjectType::builder(model.clone()).build(),
        None => ObjectType::generic(),
    };

    let mut handle = match &seed.pid {
        Some(raw) => {
            let pid = Pid::parse(raw)?;
            session.create_with_pid(&object_type, pid)?
        }
        None => session.create(&object_type)?,
    };

    handle.object_mut().label = seed.label;
    handle.object_mut().owner_id = seed.owner;
    if let Some(code) = &seed.state {
        handle.object_mut().state = ObjectState::from_code(code);
    }

    for ds in seed.datastreams {
        import_datastream(&mut handle, ds)?;
    }

    for rel in seed.relationships {
        let predicate = Predicate::from(rel.predicate.clone());
        handle.add_relationship(predicate, parse_target(&rel.target))?;
    }

    handle.save()?;
    Ok(handle.pid().clone())
}

fn import_datastream(
    handle: &mut crate::handle::ObjectHandle,
    seed: SeedDatastream,
) -> Result<()> {
    let content = decode_content(&seed)?;

    if let Some(group) = &seed.group {
        handle.add_group_member(
            group,
            GroupAddOptions {
                dsid: seed.dsid,
                content,
                content_type: seed.mime_type,
                label: seed.label,
                filename: seed.filename,
            },
        )?;
        return Ok(());
    }

    let kind = match seed.kind.as_deref() {
        None | Some("content") => DatastreamKind::Content,
        Some("metadata") => DatastreamKind::Metadata,
        Some(other) => return Err(invalid(format!("unknown datastream kind {other:?}"))),
    };

    let mut ds = Datastream::new(seed.dsid.unwrap_or_default(), kind);
    if let Some(label) = seed.label.or(seed.filename) {
        ds.label = label;
    }
    if seed.mime_type.is_some() {
        ds.mime_type = seed.mime_type;
    }
    for (name, values) in seed.fields {
        ds.set_field(name, values);
    }
    if let Some(bytes) = content {
        ds.set_content(bytes);
    }

    handle.add_datastream(ds, AddOptions::default())?;
    Ok(())
}

fn decode_content(seed: &SeedDatastream) -> Result<Option<Vec<u8>>> {
    match (&seed.content, &seed.content_base64) {
        (Some(_), Some(_)) => Err(invalid("datastream has both content and content_base64")),
        (Some(text), None) => Ok(Some(text.clone().into_bytes())),
        (None, Some(encoded)) => BASE64
            .decode(encoded.trim())
            .map(Some)
            .map_err(|err| invalid(format!("content_base64: {err}"))),
        (None, None) => Ok(None),
    }
}

/// A relationship target in a seed is a pid (`demo:2`) or a full URI
fn parse_target(raw: &str) -> RelTarget {
    if let Ok(pid) = Pid::parse(raw) {
        if !raw.contains('/') {
            return RelTarget::Object(pid);
        }
    }
    RelTarget::from_uri_string(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_classifies() {
        assert!(matches!(parse_target("demo:2"), RelTarget::Object(_)));
        assert!(matches!(
            parse_target("info:fedora/demo:2"),
            RelTarget::Object(_)
        ));
        assert!(matches!(
            parse_target("http://example.org/x"),
            RelTarget::Uri(_)
        ));
    }

    #[test]
    fn test_decode_content_rejects_both_forms() {
        let seed = SeedDatastream {
            content: Some("text".to_string()),
            content_base64: Some("dGV4dA==".to_string()),
            ..Default::default()
        };
        assert!(decode_content(&seed).is_err());
    }

    #[test]
    fn test_decode_content_base64() {
        let seed = SeedDatastream {
            content_base64: Some("aGVsbG8=".to_string()),
            ..Default::default()
        };
        assert_eq!(decode_content(&seed).unwrap().as_deref(), Some(b"hello".as_ref()));
    }
}
