/// Unwraps a DBus property read, logging the failure and using a fallback.
///
/// The optional middle argument names the object the property was read
/// from so the warning can be traced back to a player.
#[macro_export]
macro_rules! unwrap_or_warn {
    ($result:expr, $default:expr) => {
        $result.unwrap_or_else(|err| {
            ::tracing::warn!("Failed to fetch property: {}", err);
            $default
        })
    };
    ($result:expr, $source:expr, $default:expr) => {
        $result.unwrap_or_else(|err| {
            ::tracing::warn!("Failed to fetch property for {}: {}", $source, err);
            $default
        })
    };
}
