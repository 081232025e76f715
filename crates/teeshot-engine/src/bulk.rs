use teeshot_contracts::{DataUrl, EncodedImage, ShirtColor, ShotType};

use crate::error::GenerationError;
use crate::executor::BatchExecutor;
use crate::provider::MockupGenerator;

/// Progress hooks for a bulk run. All methods default to no-ops.
pub trait BulkObserver {
    fn mockup_started(&mut self, _index: usize, _total: usize, _color: ShirtColor) {}

    fn mockup_finished(&mut self, _index: usize, _total: usize, _color: ShirtColor, _image: &DataUrl) {}

    fn mockup_failed(&mut self, _index: usize, _color: ShirtColor, _error: &GenerationError) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl BulkObserver for NoopObserver {}

/// Generates one mockup per color, strictly one request at a time.
///
/// The result is index-aligned with `colors`. Any failure aborts the whole
/// batch and earlier images are discarded.
pub fn generate_bulk<G, X>(
    generator: &G,
    executor: &X,
    source: &EncodedImage,
    colors: &[ShirtColor],
    shot: ShotType,
    observer: &mut dyn BulkObserver,
) -> Result<Vec<DataUrl>, GenerationError>
where
    G: MockupGenerator + ?Sized,
    X: BatchExecutor,
{
    if colors.is_empty() {
        return Ok(Vec::new());
    }
    let total = colors.len();
    executor.execute(colors.to_vec(), |index, color| {
        observer.mockup_started(index, total, color);
        match generator.generate(source, color, shot) {
            Ok(image) => {
                observer.mockup_finished(index, total, color, &image);
                Ok(image)
            }
            Err(err) => {
                observer.mockup_failed(index, color, &err);
                Err(err)
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use teeshot_contracts::{DataUrl, EncodedImage, ShirtColor, ShotType};

    use crate::error::GenerationError;
    use crate::provider::MockupGenerator;

    /// Records every call and fails on the configured call index.
    #[derive(Default)]
    pub(crate) struct ScriptedGenerator {
        pub calls: Mutex<Vec<(ShirtColor, ShotType)>>,
        pub fail_at: Option<usize>,
    }

    impl ScriptedGenerator {
        pub(crate) fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<(ShirtColor, ShotType)> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    impl MockupGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate(
            &self,
            _source: &EncodedImage,
            color: ShirtColor,
            shot: ShotType,
        ) -> Result<DataUrl, GenerationError> {
            let mut calls = self.calls.lock().expect("calls lock");
            let index = calls.len();
            calls.push((color, shot));
            if self.fail_at == Some(index) {
                return Err(GenerationError::Request {
                    color,
                    detail: "quota exhausted".to_string(),
                });
            }
            Ok(DataUrl::from_bytes("image/png", color.slug().as_bytes()))
        }
    }
}
