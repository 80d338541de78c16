/// Bytes of a fixed-width text field up to the first NUL, or all of them
/// when the field is full.
pub(crate) fn trim_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
