use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::{json, Map, Value};
use teeshot_contracts::events::{EventKind, EventWriter};
use teeshot_contracts::shell::DownloadTarget;
use teeshot_contracts::{DataUrl, ImageSource, InputError, ShirtColor};

use crate::bulk::{generate_bulk, BulkObserver};
use crate::collage::{compose_collage, COLLAGE_IMAGE_COUNT};
use crate::error::{GenerationError, RunError};
use crate::executor::SerialExecutor;
use crate::export::{
    collage_file_name, download_all, original_file_name, resize_and_save, variation_file_name,
    DownloadSink, ExportFormat, ExportOutcome, DOWNLOAD_ALL_PAUSE,
};
use crate::provider::MockupGenerator;
use crate::state::{AppState, GeneratedMockups, GenerationOutput, GenerationTicket};

/// Drives generation runs and downloads against one [`AppState`].
///
/// Event write failures are logged and never abort a run, so the state always
/// leaves the in-flight phase.
pub struct Session<'a> {
    generator: &'a dyn MockupGenerator,
    executor: SerialExecutor,
    events: EventWriter,
    download_pause: Duration,
}

impl<'a> Session<'a> {
    pub fn new(generator: &'a dyn MockupGenerator, events: EventWriter) -> Self {
        Self {
            generator,
            executor: SerialExecutor,
            events,
            download_pause: DOWNLOAD_ALL_PAUSE,
        }
    }

    pub fn with_download_pause(mut self, pause: Duration) -> Self {
        self.download_pause = pause;
        self
    }

    pub fn generator(&self) -> &dyn MockupGenerator {
        self.generator
    }

    pub fn events(&self) -> &EventWriter {
        &self.events
    }

    /// One click of "generate": validate, call the model per color, compose.
    ///
    /// Only a refused start is returned as an error; run failures end up in
    /// `state.error()`.
    pub fn generate(
        &self,
        state: &mut AppState,
        observer: &mut dyn BulkObserver,
    ) -> Result<(), InputError> {
        let ticket = state.begin_generation()?;
        tracing::info!(
            provider = self.generator.name(),
            colors = ticket.colors.len(),
            shot = %ticket.shot,
            "generation started"
        );
        self.emit(
            EventKind::GenerationStarted,
            json!({
                "provider": self.generator.name(),
                "model": self.generator.model(),
                "colors": color_names(&ticket.colors),
                "shot": ticket.shot.id(),
            }),
        );

        let outcome = self.run(&ticket, observer);
        match &outcome {
            Ok(output) => tracing::info!(
                mockups = output.images.len(),
                collage = output.collage.is_some(),
                "generation finished"
            ),
            Err(err) => tracing::error!(error = %err, "generation failed"),
        }
        state.complete_generation(ticket, outcome);
        Ok(())
    }

    fn run(
        &self,
        ticket: &GenerationTicket,
        observer: &mut dyn BulkObserver,
    ) -> Result<GenerationOutput, RunError> {
        let mut recording = RecordingObserver {
            session: self,
            inner: observer,
        };
        let images = generate_bulk(
            self.generator,
            &self.executor,
            &ticket.source,
            &ticket.colors,
            ticket.shot,
            &mut recording,
        )?;

        let collage = if images.len() >= COLLAGE_IMAGE_COUNT {
            let sources: Vec<ImageSource> = images.iter().cloned().map(ImageSource::from).collect();
            match compose_collage(&sources) {
                Ok(collage) => {
                    self.emit(
                        EventKind::CollageCreated,
                        json!({ "mime_type": collage.mime_type, "inputs": COLLAGE_IMAGE_COUNT }),
                    );
                    Some(collage)
                }
                Err(err) => {
                    tracing::error!(error = %err, "error creating collage");
                    self.emit(EventKind::CollageFailed, json!({ "error": err.to_string() }));
                    return Err(err.into());
                }
            }
        } else {
            None
        };
        Ok(GenerationOutput { images, collage })
    }

    /// Exports what `target` names at the state's download size.
    pub fn download(
        &self,
        state: &AppState,
        target: DownloadTarget,
        sink: &dyn DownloadSink,
    ) -> Result<Vec<ExportOutcome>> {
        let size = state.download_size().pixels();
        let outcomes = match target {
            DownloadTarget::Original => {
                let source = state
                    .source()
                    .ok_or_else(|| anyhow!(InputError::MissingSource))?;
                let image = ImageSource::Data(source.preview().clone());
                vec![resize_and_save(
                    &image,
                    size,
                    &original_file_name(size),
                    ExportFormat::Png,
                    sink,
                )?]
            }
            DownloadTarget::Collage => {
                let collage = state.collage().ok_or_else(|| {
                    anyhow!("no collage available (needs at least {COLLAGE_IMAGE_COUNT} mockups)")
                })?;
                let image = ImageSource::Data(collage.clone());
                vec![resize_and_save(
                    &image,
                    size,
                    &collage_file_name(size),
                    ExportFormat::Jpeg,
                    sink,
                )?]
            }
            DownloadTarget::Variation(number) => {
                let results = generated(state)?;
                let index = number
                    .checked_sub(1)
                    .filter(|index| *index < results.len())
                    .ok_or_else(|| {
                        anyhow!("no mockup #{number} (have {})", results.len())
                    })?;
                let image = ImageSource::Data(results.images[index].clone());
                let file_name = variation_file_name(results.color_at(index), index, size);
                vec![resize_and_save(&image, size, &file_name, ExportFormat::Png, sink)?]
            }
            DownloadTarget::All => {
                let results = generated(state)?;
                download_all(&results.images, &results.colors, size, sink, self.download_pause)?
            }
        };
        for outcome in &outcomes {
            self.record_export(outcome);
        }
        Ok(outcomes)
    }

    fn record_export(&self, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Resized { path, size } => self.emit(
                EventKind::ExportCompleted,
                json!({ "path": path.to_string_lossy(), "size": size }),
            ),
            ExportOutcome::FellBackToOriginal { path, reason } => self.emit(
                EventKind::ExportFellBack,
                json!({ "path": path.to_string_lossy(), "reason": reason }),
            ),
        }
    }

    fn emit(&self, kind: EventKind, payload: Value) {
        if let Err(err) = self.events.emit(kind, map_object(payload)) {
            tracing::warn!(event = %kind, error = %format!("{err:#}"), "failed to write event");
        }
    }
}

struct RecordingObserver<'s, 'a> {
    session: &'s Session<'a>,
    inner: &'s mut dyn BulkObserver,
}

impl BulkObserver for RecordingObserver<'_, '_> {
    fn mockup_started(&mut self, index: usize, total: usize, color: ShirtColor) {
        self.session.emit(
            EventKind::MockupStarted,
            json!({ "index": index, "total": total, "color": color.name() }),
        );
        self.inner.mockup_started(index, total, color);
    }

    fn mockup_finished(&mut self, index: usize, total: usize, color: ShirtColor, image: &DataUrl) {
        self.session.emit(
            EventKind::MockupCreated,
            json!({
                "index": index,
                "total": total,
                "color": color.name(),
                "mime_type": image.mime_type,
            }),
        );
        self.inner.mockup_finished(index, total, color, image);
    }

    fn mockup_failed(&mut self, index: usize, color: ShirtColor, error: &GenerationError) {
        self.session.emit(
            EventKind::GenerationFailed,
            json!({ "index": index, "color": color.name(), "error": error.to_string() }),
        );
        self.inner.mockup_failed(index, color, error);
    }
}

fn generated(state: &AppState) -> Result<&GeneratedMockups> {
    state
        .results()
        .filter(|results| !results.is_empty())
        .ok_or_else(|| anyhow!("nothing to download yet; run /generate first"))
}

fn color_names(colors: &[ShirtColor]) -> Vec<&'static str> {
    colors.iter().map(|color| color.name()).collect()
}

pub(crate) fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use serde_json::Value;
    use teeshot_contracts::events::EventWriter;
    use teeshot_contracts::shell::DownloadTarget;
    use teeshot_contracts::{InputError, ShirtColor, ShotType, CATALOG};

    use super::Session;
    use crate::bulk::testing::ScriptedGenerator;
    use crate::bulk::NoopObserver;
    use crate::dryrun::DryrunGenerator;
    use crate::export::{DirectorySink, ExportOutcome};
    use crate::state::{AppState, Phase, UploadedImage};

    fn uploaded_state(colors: &[ShirtColor]) -> AppState {
        let mut state = AppState::new();
        state.upload(
            UploadedImage::from_bytes("design.png", b"graphic", Some("image/png")).expect("upload"),
        );
        for color in colors {
            state.toggle_color(*color);
        }
        state
    }

    fn event_types(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
        Ok(fs::read_to_string(path)?
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row["type"].as_str().map(str::to_string))
            .collect())
    }

    #[test]
    fn five_or_more_results_produce_collage() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let generator = DryrunGenerator::with_side(16);
        let session = Session::new(&generator, EventWriter::new(&events_path, "run-1"));
        let mut state = uploaded_state(&CATALOG[..6]);

        session.generate(&mut state, &mut NoopObserver)?;

        assert_eq!(state.phase(), Phase::ShowingResults);
        let results = state.results().expect("results");
        assert_eq!(results.len(), 6);
        assert_eq!(results.colors, CATALOG[..6].to_vec());
        let collage = state.collage().expect("collage");
        assert_eq!(collage.mime_type, "image/jpeg");

        let types = event_types(&events_path)?;
        assert_eq!(types.first().map(String::as_str), Some("generation_started"));
        assert_eq!(types.iter().filter(|kind| *kind == "mockup_created").count(), 6);
        assert_eq!(types.last().map(String::as_str), Some("collage_created"));
        Ok(())
    }

    #[test]
    fn fewer_than_five_results_skip_collage() -> anyhow::Result<()> {
        let generator = DryrunGenerator::with_side(8);
        let session = Session::new(&generator, EventWriter::discard("test"));
        let mut state = uploaded_state(&[ShirtColor::White, ShirtColor::Black]);
        state.set_shot(ShotType::CloseUp);

        session.generate(&mut state, &mut NoopObserver)?;

        let results = state.results().expect("results");
        assert_eq!(results.colors, vec![ShirtColor::Black, ShirtColor::White]);
        assert_eq!(results.shot, ShotType::CloseUp);
        assert!(state.collage().is_none());
        assert!(state.error().is_none());
        Ok(())
    }

    #[test]
    fn failure_sets_error_and_clears_in_flight() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let generator = ScriptedGenerator::failing_at(1);
        let session = Session::new(&generator, EventWriter::new(&events_path, "run-2"));
        let mut state = uploaded_state(&[ShirtColor::Moss, ShirtColor::Black, ShirtColor::Yam]);

        session.generate(&mut state, &mut NoopObserver)?;

        assert_eq!(
            state.error(),
            Some("Failed to generate image for Yam: quota exhausted")
        );
        assert!(state.results().is_none());
        assert!(!state.is_generating());
        assert_eq!(generator.calls().len(), 2);
        assert!(event_types(&events_path)?.contains(&"generation_failed".to_string()));
        Ok(())
    }

    #[test]
    fn invalid_input_makes_no_calls() {
        let generator = ScriptedGenerator::default();
        let session = Session::new(&generator, EventWriter::discard("test"));
        let mut state = AppState::new();
        state.toggle_color(ShirtColor::Black);

        let result = session.generate(&mut state, &mut NoopObserver);
        assert!(matches!(result, Err(InputError::MissingSource)));
        assert!(generator.calls().is_empty());
        assert_eq!(state.error(), Some("Please upload a mockup image first."));
    }

    #[test]
    fn collage_decode_failure_fails_the_run() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        // Scripted images are not decodable, so composing five of them fails.
        let generator = ScriptedGenerator::default();
        let session = Session::new(&generator, EventWriter::new(&events_path, "run-3"));
        let mut state = uploaded_state(&CATALOG[..5]);

        session.generate(&mut state, &mut NoopObserver)?;

        assert!(state.results().is_none());
        assert!(state
            .error()
            .is_some_and(|message| message.starts_with("failed to decode image 0")));
        assert_eq!(
            event_types(&events_path)?.last().map(String::as_str),
            Some("collage_failed")
        );
        Ok(())
    }

    #[test]
    fn download_targets_write_expected_files() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let generator = DryrunGenerator::with_side(8);
        let session = Session::new(&generator, EventWriter::new(&events_path, "run-4"))
            .with_download_pause(Duration::ZERO);
        let sink = DirectorySink::new(temp.path().join("downloads"));
        let mut state = uploaded_state(&CATALOG[..5]);
        session.generate(&mut state, &mut NoopObserver)?;

        let all = session.download(&state, DownloadTarget::All, &sink)?;
        assert_eq!(all.len(), 5);
        assert!(all[0].path().ends_with("ai-variation-black-2048px.png"));

        let single = session.download(&state, DownloadTarget::Variation(2), &sink)?;
        assert!(single[0].path().ends_with("ai-variation-pepper-2048px.png"));

        let collage = session.download(&state, DownloadTarget::Collage, &sink)?;
        assert!(collage[0].path().ends_with("ai-collage-2048px.jpg"));

        // The uploaded bytes are not an image, so the original falls back.
        let original = session.download(&state, DownloadTarget::Original, &sink)?;
        assert!(matches!(&original[0], ExportOutcome::FellBackToOriginal { .. }));
        assert!(original[0].path().ends_with("original-mockup-original.png"));

        let types = event_types(&events_path)?;
        assert_eq!(types.iter().filter(|kind| *kind == "export_completed").count(), 7);
        assert_eq!(types.last().map(String::as_str), Some("export_fell_back"));
        Ok(())
    }

    #[test]
    fn download_without_results_is_an_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let generator = DryrunGenerator::with_side(8);
        let session = Session::new(&generator, EventWriter::discard("test"));
        let sink = DirectorySink::new(temp.path());
        let state = AppState::new();
        assert!(session.download(&state, DownloadTarget::All, &sink).is_err());
        assert!(session.download(&state, DownloadTarget::Collage, &sink).is_err());
        assert!(session.download(&state, DownloadTarget::Original, &sink).is_err());

        let mut generated = uploaded_state(&[ShirtColor::Ivory]);
        session.generate(&mut generated, &mut NoopObserver)?;
        assert!(session.download(&generated, DownloadTarget::Variation(2), &sink).is_err());
        assert!(session.download(&generated, DownloadTarget::Variation(0), &sink).is_err());
        assert!(session.download(&generated, DownloadTarget::Collage, &sink).is_err());
        Ok(())
    }
}
