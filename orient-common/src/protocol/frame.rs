use heapless::String;

use super::{COMMAND_END, COMMAND_START};
use crate::orientation::Orientation;

pub type OrientationFrame = String<16>;

/// `<X_POS>` style frame announcing a new orientation. `Start` has no frame.
pub fn encode_orientation_frame(orientation: Orientation) -> Option<OrientationFrame> {
    let name = orientation.wire_name()?;
    let mut frame = OrientationFrame::new();
    frame.push(COMMAND_START).ok()?;
    frame.push_str(name).ok()?;
    frame.push(COMMAND_END).ok()?;
    Some(frame)
}

/// Frames are only recognized when the start delimiter is the first character
/// of the line.
pub fn decode_orientation_frame(line: &str) -> Option<Orientation> {
    let body = line.strip_prefix(COMMAND_START)?;
    let end = body.find(COMMAND_END)?;
    Orientation::from_wire_name(&body[..end])
}
