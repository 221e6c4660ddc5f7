//! Fixed reset masks for well-known composite types.
//!
//! These types are written as a whole, so a full update always resets all of
//! their parts no matter the current value.

use crate::fieldmask::Mask;

/// Returns the reset mask of a timestamp: `nanos,seconds`.
pub fn timestamp_mask() -> Mask {
    seconds_and_nanos()
}

/// Returns the reset mask of a duration: `nanos,seconds`.
pub fn duration_mask() -> Mask {
    seconds_and_nanos()
}

/// Returns the reset mask of an RPC status: its code, message and every
/// detail's type and payload.
pub fn status_mask() -> Mask {
    let detail = Mask::with_fields([("type_url", Mask::new()), ("value", Mask::new())]);
    Mask::with_fields([
        ("code", Mask::new()),
        ("message", Mask::new()),
        ("details", Mask::wildcard(detail)),
    ])
}

/// Returns the reset mask of a well-known type by its full name.
pub fn mask_for(type_name: &str) -> Option<Mask> {
    match type_name {
        "google.protobuf.Timestamp" | "Timestamp" => Some(timestamp_mask()),
        "google.protobuf.Duration" | "Duration" => Some(duration_mask()),
        "google.rpc.Status" | "Status" => Some(status_mask()),
        _ => None,
    }
}

fn seconds_and_nanos() -> Mask {
    Mask::with_fields([("seconds", Mask::new()), ("nanos", Mask::new())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_masks() {
        assert_eq!(timestamp_mask().marshal(), "nanos,seconds");
        assert_eq!(duration_mask(), timestamp_mask());
        assert_eq!(
            status_mask().marshal(),
            "code,details.*.(type_url,value),message"
        );
    }

    #[test]
    fn test_mask_for() {
        assert_eq!(mask_for("google.protobuf.Timestamp"), Some(timestamp_mask()));
        assert_eq!(mask_for("Duration"), Some(duration_mask()));
        assert_eq!(mask_for("google.rpc.Status"), Some(status_mask()));
        assert_eq!(mask_for("my.Type"), None);
    }
}
