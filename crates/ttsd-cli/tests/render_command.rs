//! Render handler tests with a fake model loader.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, stream};

use ttsd_cli::exit_code_for;
use ttsd_cli::handlers::render::render_to_file;
use ttsd_core::{AudioChunk, AudioStream, ModelError, ModelLoader, SpeechModel, encode_pcm16};

struct ToneModel {
    fail_after: Option<usize>,
}

impl SpeechModel for ToneModel {
    fn sample_rate(&self) -> u32 {
        4
    }

    fn generate(&self, _text: &str, _voice: &str) -> Result<AudioStream, ModelError> {
        let fail_after = self.fail_after;
        let items = (0..3usize).map(move |i| {
            if fail_after == Some(i) {
                Err(ModelError::Synthesis("tone generator broke".to_string()))
            } else {
                Ok(AudioChunk::new(vec![0.5, -0.5]))
            }
        });
        Ok(stream::iter(items).boxed())
    }
}

struct ToneLoader {
    fail_after: Option<usize>,
}

#[async_trait::async_trait]
impl ModelLoader for ToneLoader {
    async fn load(&self, _model_id: &str) -> Result<Arc<dyn SpeechModel>, ModelError> {
        Ok(Arc::new(ToneModel {
            fail_after: self.fail_after,
        }))
    }
}

struct MissingLoader;

#[async_trait::async_trait]
impl ModelLoader for MissingLoader {
    async fn load(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ModelError> {
        Err(ModelError::NotFound(model_id.into()))
    }
}

#[test]
fn render_writes_concatenated_pcm() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("greeting.pcm");

    let summary = tokio_test::block_on(render_to_file(
        &ToneLoader { fail_after: None },
        "kokoro",
        "af_sarah",
        "Hello there.",
        &output,
    ))
    .unwrap();

    let expected = encode_pcm16(&[0.5, -0.5, 0.5, -0.5, 0.5, -0.5]);
    assert_eq!(std::fs::read(&output).unwrap(), expected);
    assert_eq!(summary.bytes, 12);
    assert_eq!(summary.sample_rate, 4);
    assert_eq!(summary.duration, Duration::from_millis(1500));
}

#[test]
fn render_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("blank.pcm");

    let err = tokio_test::block_on(render_to_file(
        &ToneLoader { fail_after: None },
        "kokoro",
        "af_sarah",
        "   ",
        &output,
    ))
    .unwrap_err();

    assert_eq!(exit_code_for(&err), 2);
    assert!(!output.exists());
}

#[test]
fn render_load_failure_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing.pcm");

    let err = tokio_test::block_on(render_to_file(
        &MissingLoader,
        "no-such-model",
        "af_sarah",
        "Hello.",
        &output,
    ))
    .unwrap_err();

    assert_eq!(exit_code_for(&err), 1);
    assert!(err.to_string().starts_with("Failed to load model:"));
    assert!(!output.exists());
}

#[test]
fn render_stream_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("broken.pcm");

    let err = tokio_test::block_on(render_to_file(
        &ToneLoader {
            fail_after: Some(1),
        },
        "kokoro",
        "af_sarah",
        "Hello.",
        &output,
    ))
    .unwrap_err();

    assert!(err.to_string().contains("tone generator broke"));
    assert!(!output.exists());
}

#[test]
fn render_creates_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("prompts/greetings/hello.pcm");

    let summary = tokio_test::block_on(render_to_file(
        &ToneLoader { fail_after: None },
        "kokoro",
        "af_sarah",
        "Hello.",
        &output,
    ))
    .unwrap();

    assert_eq!(std::fs::read(&output).unwrap().len(), summary.bytes);
    assert_eq!(summary.path, output);
}
