/// Splits `items` into contiguous chunks of at most `size` elements.
///
/// Order is preserved and nothing is dropped; callers correlate responses to
/// inputs by position, so the chunk boundaries are the only thing that changes.
/// A `size` of zero is treated as one.
pub fn chunk_contiguous<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(size.max(1))
}
