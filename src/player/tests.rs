use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use super::sink::TrackBuffer;

#[test]
fn track_buffer_reads_and_seeks_through_cursor() {
    let buffer = TrackBuffer::from_vec(vec![1, 2, 3, 4, 5]);
    let mut cursor = std::io::Cursor::new(buffer.clone());

    let mut out = [0u8; 2];
    cursor.read_exact(&mut out).unwrap();
    assert_eq!(out, [1, 2]);

    cursor.seek(SeekFrom::Start(3)).unwrap();
    cursor.read_exact(&mut out).unwrap();
    assert_eq!(out, [4, 5]);

    // Clones share the same backing allocation.
    let other = buffer.clone();
    assert!(Arc::ptr_eq(buffer.backing(), other.backing()));
}
