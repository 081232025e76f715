use std::collections::BTreeMap;

use teeshot_contracts::{DataUrl, EncodedImage, ShirtColor, ShotType};

use crate::config::GeneratorConfig;
use crate::dryrun::DryrunGenerator;
use crate::error::GenerationError;
use crate::gemini::GeminiGenerator;

/// Produces one mockup photo of the source graphic on a shirt of `color`.
///
/// Every failure is terminal for that request; implementations do not retry.
pub trait MockupGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> Option<&str> {
        None
    }

    fn generate(
        &self,
        source: &EncodedImage,
        color: ShirtColor,
        shot: ShotType,
    ) -> Result<DataUrl, GenerationError>;
}

#[derive(Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Box<dyn MockupGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<G: MockupGenerator + 'static>(&mut self, generator: G) {
        self.generators
            .insert(generator.name().to_string(), Box::new(generator));
    }

    pub fn get(&self, name: &str) -> Option<&dyn MockupGenerator> {
        self.generators.get(name).map(|generator| generator.as_ref())
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn MockupGenerator, GenerationError> {
        self.get(name.trim())
            .ok_or_else(|| GenerationError::UnknownProvider(name.trim().to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.generators.keys().cloned().collect()
    }
}

pub fn default_generator_registry(config: &GeneratorConfig) -> GeneratorRegistry {
    let mut generators = GeneratorRegistry::new();
    generators.register(GeminiGenerator::new(config.clone()));
    generators.register(DryrunGenerator::default());
    generators
}

#[cfg(test)]
mod tests {
    use crate::config::GeneratorConfig;
    use crate::error::GenerationError;

    use super::default_generator_registry;

    #[test]
    fn default_registry_lists_gemini_and_dryrun() {
        let registry = default_generator_registry(&GeneratorConfig::default());
        assert_eq!(registry.names(), vec!["dryrun", "gemini"]);
        let gemini = registry.get("gemini").map(|generator| generator.model().map(str::to_string));
        assert_eq!(gemini, Some(Some("gemini-2.5-flash-image".to_string())));
    }

    #[test]
    fn resolve_reports_unknown_provider() {
        let registry = default_generator_registry(&GeneratorConfig::default());
        assert!(registry.resolve(" dryrun ").is_ok());
        assert!(matches!(
            registry.resolve("replicate"),
            Err(GenerationError::UnknownProvider(name)) if name == "replicate"
        ));
    }
}
