use crate::walker::FileRecord;

/// Delimiter literal wrapping each relative path in a pack stream.
///
/// The format has no escaping: content that itself contains the marker
/// cannot round-trip, and the encoder does not detect the collision.
pub const FILE_MARKER: &str = "__FILEPATH__";

/// Serializes records, in input order, as repeated
/// `MARKER path MARKER content` units with no separator and no trailing
/// delimiter.
pub fn encode_pack(records: &[FileRecord]) -> String {
    let mut stream = String::new();
    for record in records {
        stream.push_str(FILE_MARKER);
        stream.push_str(&record.relative_path);
        stream.push_str(FILE_MARKER);
        stream.push_str(&record.content);
    }
    stream
}
