//! One-shot reads from streams

use crate::error::FirstValueError;
use futures::stream::{Stream, StreamExt};

/// Await the first item of a stream, then stop observing it
///
/// The stream is dropped as soon as the first item arrives, so a source that
/// keeps publishing (a [`SharedValue`](crate::SharedValue) subscription, for
/// instance) is not held open.
///
/// # Errors
/// - `FirstValueError::Empty` if the stream completes without an item
pub async fn first_value<S>(stream: S) -> Result<S::Item, FirstValueError>
where
    S: Stream,
{
    let mut stream = std::pin::pin!(stream);
    stream.next().await.ok_or(FirstValueError::Empty)
}
