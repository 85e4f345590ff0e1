use crate::{Sink, SinkOutcome, StoreError};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

enum Target {
    Stdout,
    File(PathBuf),
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Writes the generated markup exactly as received.
///
/// The text is trusted: no sanitization, no wrapping document. Whoever opens
/// the output renders whatever the model produced.
pub struct DisplaySink {
    target: Target,
}

impl DisplaySink {
    pub fn stdout() -> Self {
        Self {
            target: Target::Stdout,
        }
    }

    /// Create (or truncate) `path` on publish.
    pub fn to_file(path: impl AsRef<Path>) -> Self {
        Self {
            target: Target::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            target: Target::Writer(Mutex::new(Box::new(writer))),
        }
    }
}

#[async_trait]
impl Sink for DisplaySink {
    fn name(&self) -> &'static str {
        "display"
    }

    async fn publish(&self, title: &str, content: &str) -> Result<SinkOutcome, StoreError> {
        match &self.target {
            Target::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                out.flush()?;
            }
            Target::File(path) => {
                std::fs::write(path, content)?;
                tracing::info!(path=%path.display(), "sink.display.file_written");
            }
            Target::Writer(w) => {
                let mut w = w
                    .lock()
                    .map_err(|_| std::io::Error::other("display writer lock poisoned"))?;
                w.write_all(content.as_bytes())?;
                w.flush()?;
            }
        }
        tracing::info!(title=%title, bytes=content.len(), "sink.display.done");
        Ok(SinkOutcome::Displayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_markup_unmodified() {
        let buf = Shared::default();
        let sink = DisplaySink::to_writer(buf.clone());
        let html = "<h2>Widget</h2><script>alert(1)</script>";

        let outcome = sink.publish("Widget", html).await.unwrap();

        assert_eq!(outcome, SinkOutcome::Displayed);
        assert_eq!(buf.0.lock().unwrap().as_slice(), html.as_bytes());
    }

    #[tokio::test]
    async fn file_target_holds_exactly_the_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("post.html");
        let sink = DisplaySink::to_file(&path);

        sink.publish("Widget", "<p>hi</p>").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn unwritable_path_is_a_store_error() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DisplaySink::to_file(tmp.path().join("missing-dir").join("post.html"));
        let err = sink.publish("Widget", "<p>hi</p>").await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
