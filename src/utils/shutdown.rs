use std::future::Future;

/// Runs `work` until it finishes or `signal` fires, whichever comes first.
///
/// Returns `None` when interrupted; `work` is dropped at that point, which
/// cancels everything it owns. A signal future that resolves to `Err` (no
/// handler could be installed) disables the race instead of interrupting.
pub async fn until_interrupted<W, S>(work: W, signal: S) -> Option<W::Output>
where
    W: Future,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        output = work => Some(output),
        Ok(()) = signal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_work_finishes_first() {
        let signal = std::future::pending::<std::io::Result<()>>();

        assert_eq!(until_interrupted(async { 7 }, signal).await, Some(7));
    }

    #[tokio::test]
    async fn test_signal_cancels_and_drops_work() {
        let dropped = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(Arc::clone(&dropped));
        let work = async move {
            let _guard = guard;
            tokio::time::sleep(Duration::from_secs(60)).await;
            1
        };

        let result = until_interrupted(work, async { Ok::<(), std::io::Error>(()) }).await;

        assert_eq!(result, None);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_signal_handler_does_not_interrupt() {
        let signal = async { Err::<(), _>(std::io::Error::other("signal handler unavailable")) };
        let work = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "done"
        };

        assert_eq!(until_interrupted(work, signal).await, Some("done"));
    }
}
