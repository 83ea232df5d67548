use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

use crate::services::mpris::{MetadataValue, PlaybackState, PropertyDelta, RawMetadata};

const PLAYBACK_STATUS_PROPERTY: &str = "PlaybackStatus";
const METADATA_PROPERTY: &str = "Metadata";

impl From<&Value<'_>> for MetadataValue {
    fn from(value: &Value<'_>) -> Self {
        match value {
            Value::Str(text) => Self::Text(text.as_str().to_string()),
            Value::ObjectPath(path) => Self::Text(path.as_str().to_string()),
            Value::Bool(flag) => Self::Boolean(*flag),
            Value::U8(number) => Self::Integer(i64::from(*number)),
            Value::I16(number) => Self::Integer(i64::from(*number)),
            Value::U16(number) => Self::Integer(i64::from(*number)),
            Value::I32(number) => Self::Integer(i64::from(*number)),
            Value::U32(number) => Self::Integer(i64::from(*number)),
            Value::I64(number) => Self::Integer(*number),
            Value::U64(number) => {
                i64::try_from(*number).map_or_else(|_| Self::Text(number.to_string()), Self::Integer)
            }
            Value::F64(number) => Self::Float(*number),
            Value::Value(inner) => Self::from(inner.as_ref()),
            Value::Array(array) => Self::List(array.iter().map(Self::from).collect()),
            _ => Self::Unsupported,
        }
    }
}

/// Pick the display keys out of a player's `Metadata` map.
pub(crate) fn raw_metadata(map: &HashMap<String, OwnedValue>) -> RawMetadata {
    RawMetadata::from_entries(
        map.iter()
            .map(|(key, value)| (key.as_str(), MetadataValue::from(&**value))),
    )
}

/// Decode the players' `PropertiesChanged` payload into a delta.
///
/// Properties with an unexpected type are treated as not carried.
pub(crate) fn property_delta(changed: &HashMap<&str, Value<'_>>) -> PropertyDelta {
    PropertyDelta {
        state: changed
            .get(PLAYBACK_STATUS_PROPERTY)
            .and_then(playback_state),
        metadata: changed.get(METADATA_PROPERTY).and_then(metadata_map),
    }
}

/// Surfaced properties a change notification did not carry a value for.
///
/// Covers properties that were only invalidated as well as notifications
/// about unrelated properties; both have to be read back from the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MissingProperties {
    pub state: bool,
    pub metadata: bool,
}

impl MissingProperties {
    pub fn of(delta: &PropertyDelta) -> Self {
        Self {
            state: delta.state.is_none(),
            metadata: delta.metadata.is_none(),
        }
    }
}

fn playback_state(value: &Value<'_>) -> Option<PlaybackState> {
    match value {
        Value::Str(status) => Some(PlaybackState::from(status.as_str())),
        Value::Value(inner) => playback_state(inner),
        _ => None,
    }
}

fn metadata_map(value: &Value<'_>) -> Option<RawMetadata> {
    let owned = value.try_to_owned().ok()?;
    let map = HashMap::<String, OwnedValue>::try_from(owned).ok()?;
    Some(raw_metadata(&map))
}
