//! In-place progress spinner shown while a controller call is in flight.
//!
//! A background task writes a four-frame rotating ellipsis followed by
//! three backspaces every 400 ms. Stopping is synchronous: the caller's
//! `stop().await` returns only after the final clear sequence has been
//! flushed, so no progress characters bleed into subsequent output.

use std::io::Write;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

const FRAMES: [&str; 4] = ["...", "o..", ".o.", "..o"];
const BACKSPACES: &str = "\u{8}\u{8}\u{8}";
const TICK: Duration = Duration::from_millis(400);

/// Handle on a running spinner. Stop-once; dropping without `stop` aborts
/// the worker without clearing the line.
#[derive(Debug)]
pub struct Spinner {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Start a spinner writing to `writer`.
    #[must_use]
    pub fn start<W: Write + Send + 'static>(mut writer: W) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut frame = 0usize;
            loop {
                let glyph = FRAMES[frame % FRAMES.len()];
                frame += 1;
                if write!(writer, "{glyph}{BACKSPACES}").and_then(|()| writer.flush()).is_err() {
                    break;
                }
                tokio::select! {
                    _ = &mut stop_rx => break,
                    () = tokio::time::sleep(TICK) => {}
                }
            }
            // Overwrite the last frame so nothing remains on the line.
            let _ = write!(writer, "   {BACKSPACES}");
            let _ = writer.flush();
            trace!("spinner cleared");
        });
        Self { stop_tx, handle }
    }

    /// Signal the worker and wait for the final clear sequence.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory sink for inspecting spinner output.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().expect("lock").clone()
        }
    }

    /// Apply terminal backspace semantics and return what remains visible.
    fn visible(bytes: &[u8]) -> String {
        let mut line: Vec<char> = Vec::new();
        for &b in bytes {
            if b == 0x08 {
                line.pop();
            } else {
                line.push(b as char);
            }
        }
        line.into_iter().collect::<String>().trim_end().to_string()
    }

    #[tokio::test]
    async fn stopped_spinner_leaves_no_residue() {
        let buf = SharedBuf::default();
        let spinner = Spinner::start(buf.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        spinner.stop().await;
        assert_eq!(visible(&buf.contents()), "");
    }

    /// Yield to the worker until it has written past `last` bytes.
    async fn written_beyond(buf: &SharedBuf, last: usize) -> usize {
        loop {
            let len = buf.contents().len();
            if len > last {
                return len;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn spinner_rotates_through_frames() {
        tokio::time::pause();
        let buf = SharedBuf::default();
        let spinner = Spinner::start(buf.clone());
        // First frame is written before the first tick.
        let mut seen = written_beyond(&buf, 0).await;
        for _ in 0..4 {
            tokio::time::advance(TICK).await;
            seen = written_beyond(&buf, seen).await;
        }
        spinner.stop().await;
        let text = String::from_utf8(buf.contents()).expect("utf8");
        for frame in FRAMES {
            assert!(text.contains(frame), "missing frame {frame}");
        }
        assert_eq!(visible(text.as_bytes()), "");
    }

    #[tokio::test]
    async fn printed_after_stop_follows_cleanly() {
        let buf = SharedBuf::default();
        let spinner = Spinner::start(buf.clone());
        spinner.stop().await;
        let mut after = buf.clone();
        write!(after, "done").expect("write");
        assert_eq!(visible(&buf.contents()), "done");
    }
}
