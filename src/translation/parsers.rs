pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Closing delimiter of a quoted span, doubled to escape it (`''`, `""`, `]]`).
pub(super) fn closes_quote(bytes: &[u8], idx: usize, close: u8) -> (bool, usize) {
    if bytes.get(idx) != Some(&close) {
        return (false, idx);
    }
    if bytes.get(idx + 1) == Some(&close) {
        (false, idx + 1)
    } else {
        (true, idx)
    }
}
