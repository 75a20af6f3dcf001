pub fn round_size_up_to_alignment_u32(
    size: u32,
    required_alignment: u32,
) -> u32 {
    assert!(required_alignment > 0);
    ((size + required_alignment - 1) / required_alignment) * required_alignment
}

pub fn round_size_up_to_alignment_u64(
    size: u64,
    required_alignment: u64,
) -> u64 {
    assert!(required_alignment > 0);
    ((size + required_alignment - 1) / required_alignment) * required_alignment
}

/// View a plain-old-data value as its raw bytes. Intended for uploading vertex/uniform data.
pub fn any_as_bytes<T: Copy>(data: &T) -> &[u8] {
    let ptr: *const T = data;
    let ptr = ptr as *const u8;
    unsafe { std::slice::from_raw_parts(ptr, std::mem::size_of::<T>()) }
}

/// View a slice of plain-old-data values as its raw bytes
pub fn slice_as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    let ptr = data.as_ptr() as *const u8;
    unsafe { std::slice::from_raw_parts(ptr, slice_size_in_bytes(data)) }
}

pub fn slice_size_in_bytes<T>(slice: &[T]) -> usize {
    let range = slice.as_ptr_range();
    (range.end as *const u8 as usize) - (range.start as *const u8 as usize)
}

/// Copy `rows` rows of `row_size` bytes from `src` to `dst`, reversing their order. Used when
/// converting between bottom-up and top-down image storage.
pub fn copy_rows_flipped(
    src: &[u8],
    dst: &mut [u8],
    row_size: usize,
    rows: usize,
) {
    assert!(src.len() >= row_size * rows);
    assert!(dst.len() >= row_size * rows);
    for row in 0..rows {
        let src_begin = row * row_size;
        let dst_begin = (rows - row - 1) * row_size;
        dst[dst_begin..dst_begin + row_size].copy_from_slice(&src[src_begin..src_begin + row_size]);
    }
}
