use std::future::Future;

use crate::error::Result;

/// Number of flushes needed to push `len` items through groups of `capacity`.
pub fn batch_count(len: usize, capacity: usize) -> usize {
    len.div_ceil(capacity.max(1))
}

/// Hands `items` to `flush` in consecutive groups of at most `capacity`, in order.
///
/// `flush` receives the zero-based batch index and the batch. The first error
/// stops the loop and is returned; otherwise the per-batch results are returned
/// in order, one per flush.
pub async fn flush_in_batches<'a, T, R, F, Fut>(
    items: &'a [T],
    capacity: usize,
    mut flush: F,
) -> Result<Vec<R>>
where
    F: FnMut(usize, &'a [T]) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut results = Vec::with_capacity(batch_count(items.len(), capacity));

    for (index, batch) in items.chunks(capacity.max(1)).enumerate() {
        results.push(flush(index, batch).await?);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_batch_count() {
        assert_eq!(batch_count(0, 100), 0);
        assert_eq!(batch_count(1, 100), 1);
        assert_eq!(batch_count(100, 100), 1);
        assert_eq!(batch_count(101, 100), 2);
        assert_eq!(batch_count(120, 100), 2);
        assert_eq!(batch_count(250, 200), 2);
    }

    #[tokio::test]
    async fn test_batches_preserve_order_and_cover_all_items() {
        let items: Vec<u32> = (0..257).collect();

        let batches = flush_in_batches(&items, 100, |_, batch| async move { Ok(batch.to_vec()) })
            .await
            .unwrap();

        assert_eq!(batches.len(), batch_count(items.len(), 100));
        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![100, 100, 57]
        );
        assert_eq!(batches.concat(), items);
    }

    #[tokio::test]
    async fn test_empty_input_never_flushes() {
        let items: Vec<u32> = Vec::new();
        let mut calls = 0;

        let results = flush_in_batches(&items, 10, |_, _| {
            calls += 1;
            async { Ok(()) }
        })
        .await
        .unwrap();

        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_first_error_stops_flushing() {
        let items: Vec<u32> = (0..30).collect();
        let mut seen = Vec::new();

        let result = flush_in_batches(&items, 10, |index, _| {
            seen.push(index);
            async move {
                if index == 1 {
                    Err(AppError::YouTubeApi("rejected".into()))
                } else {
                    Ok(index)
                }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(seen, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_zero_capacity_treated_as_one() {
        let items = vec!['a', 'b'];
        let results = flush_in_batches(&items, 0, |index, batch| async move {
            Ok((index, batch.len()))
        })
        .await
        .unwrap();

        assert_eq!(results, vec![(0, 1), (1, 1)]);
    }
}
