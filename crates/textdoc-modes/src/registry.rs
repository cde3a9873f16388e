use crate::definition::ModeDefinition;
use crate::error::SyntaxModeError;
use crate::provider::{BundledModeProvider, SyntaxMode, SyntaxModeProvider};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use textdoc_core::{DEFAULT_STRATEGY_NAME, Document, HighlightingStrategy};
use tracing::{debug, warn};

/// Grammars by name and extension, loaded on first use and shared as `Arc`s.
///
/// There is no process-wide instance: hosts construct a registry, add providers, and hand the
/// strategies it returns to their documents.
#[derive(Debug)]
pub struct SyntaxModeRegistry {
    providers: Vec<Box<dyn SyntaxModeProvider>>,
    // mode name -> (provider index, index entry)
    modes: HashMap<String, (usize, SyntaxMode)>,
    // lowercase extension -> mode name
    extensions: HashMap<String, String>,
    loaded: HashMap<String, Arc<HighlightingStrategy>>,
    added: Vec<Arc<HighlightingStrategy>>,
    default: Arc<HighlightingStrategy>,
}

impl Default for SyntaxModeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxModeRegistry {
    /// A registry that only knows the built-in `Default` strategy.
    pub fn new() -> Self {
        let default = Arc::new(HighlightingStrategy::default_strategy());
        let mut loaded = HashMap::new();
        loaded.insert(DEFAULT_STRATEGY_NAME.to_string(), default.clone());
        Self {
            providers: Vec::new(),
            modes: HashMap::new(),
            extensions: HashMap::new(),
            loaded,
            added: Vec::new(),
            default,
        }
    }

    /// A registry with the bundled XML, HTML, JavaScript and C# modes.
    pub fn with_bundled_modes() -> Result<Self, SyntaxModeError> {
        let mut registry = Self::new();
        registry.add_provider(Box::new(BundledModeProvider::new()?));
        Ok(registry)
    }

    /// Register a provider's modes. Later registrations win on name or extension clashes.
    pub fn add_provider(&mut self, provider: Box<dyn SyntaxModeProvider>) {
        let index = self.providers.len();
        self.register_provider_modes(index, provider.as_ref());
        self.providers.push(provider);
    }

    fn register_provider_modes(&mut self, index: usize, provider: &dyn SyntaxModeProvider) {
        for mode in provider.syntax_modes() {
            for extension in &mode.extensions {
                self.extensions
                    .insert(extension.to_lowercase(), mode.name.clone());
            }
            self.modes.insert(mode.name.clone(), (index, mode.clone()));
        }
    }

    /// Register an already built strategy under its name and extensions.
    pub fn add_strategy(&mut self, strategy: Arc<HighlightingStrategy>) {
        self.register_strategy(strategy.clone());
        self.added.push(strategy);
    }

    fn register_strategy(&mut self, strategy: Arc<HighlightingStrategy>) {
        for extension in strategy.extensions() {
            self.extensions
                .insert(extension.to_lowercase(), strategy.name().to_string());
        }
        self.loaded.insert(strategy.name().to_string(), strategy);
    }

    /// The built-in `Default` strategy.
    pub fn default_strategy(&self) -> Arc<HighlightingStrategy> {
        self.default.clone()
    }

    /// Names of every known mode, sorted.
    pub fn mode_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .modes
            .keys()
            .chain(self.loaded.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether a strategy is already built and cached.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Name of the mode claiming `file_name`, matching extensions case-insensitively and
    /// preferring the longest (`.vcxproj.filters` over `.filters`).
    pub fn mode_for_file(&self, file_name: &str) -> Option<&str> {
        let base = Path::new(file_name)
            .file_name()
            .map_or_else(|| file_name.to_string(), |name| name.to_string_lossy().to_string())
            .to_lowercase();
        base.char_indices()
            .filter(|(_, ch)| *ch == '.')
            .find_map(|(index, _)| self.extensions.get(&base[index..]))
            .map(String::as_str)
    }

    /// Build (or return the cached) strategy of a mode.
    pub fn load(&mut self, name: &str) -> Result<Arc<HighlightingStrategy>, SyntaxModeError> {
        if let Some(strategy) = self.loaded.get(name) {
            return Ok(strategy.clone());
        }
        let definition = self.resolve_definition(name, &mut Vec::new())?;
        let strategy = Arc::new(definition.into_strategy()?);
        debug!(
            mode = name,
            rule_sets = strategy.rule_sets().len(),
            "loaded syntax mode"
        );
        self.loaded.insert(name.to_string(), strategy.clone());
        Ok(strategy)
    }

    /// Read a mode's definition and flatten the modes it references into it.
    fn resolve_definition(
        &self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<ModeDefinition, SyntaxModeError> {
        if stack.iter().any(|open| open == name) {
            return Err(SyntaxModeError::ReferenceCycle(name.to_string()));
        }
        let (provider, mode) = self
            .modes
            .get(name)
            .ok_or_else(|| SyntaxModeError::UnknownMode(name.to_string()))?;
        let text = self.providers[*provider].read_definition(mode)?;
        let mut definition = ModeDefinition::from_yaml(&text)?;
        if definition.name != name {
            return Err(SyntaxModeError::NameMismatch {
                expected: name.to_string(),
                found: definition.name,
            });
        }

        let mut references: Vec<String> = definition.references().map(str::to_string).collect();
        references.dedup();
        if !references.is_empty() {
            stack.push(name.to_string());
            for reference in &references {
                let referenced = self.resolve_definition(reference, stack)?;
                definition.import_reference(&referenced);
            }
            stack.pop();
        }
        Ok(definition)
    }

    /// The strategy named `name`, or `Default` if it is unknown or fails to load.
    pub fn find_highlighter(&mut self, name: &str) -> Arc<HighlightingStrategy> {
        match self.load(name) {
            Ok(strategy) => strategy,
            Err(err) => {
                warn!(mode = name, error = %err, "falling back to default highlighting");
                self.default.clone()
            }
        }
    }

    /// The strategy for a file name, or `Default` if no mode claims its extension.
    pub fn find_highlighter_for_file(&mut self, file_name: &str) -> Arc<HighlightingStrategy> {
        match self.mode_for_file(file_name).map(str::to_string) {
            Some(name) => self.find_highlighter(&name),
            None => {
                debug!(file_name, "no syntax mode for file");
                self.default.clone()
            }
        }
    }

    /// Drop every built strategy and re-read all providers' mode lists.
    ///
    /// Strategies added with [`add_strategy`](Self::add_strategy) stay registered.
    pub fn reload(&mut self) -> Result<(), SyntaxModeError> {
        self.modes.clear();
        self.extensions.clear();
        self.loaded.clear();
        self.loaded
            .insert(DEFAULT_STRATEGY_NAME.to_string(), self.default.clone());

        let mut providers = std::mem::take(&mut self.providers);
        let mut result = Ok(());
        for (index, provider) in providers.iter_mut().enumerate() {
            if let Err(err) = provider.update_syntax_mode_list() {
                warn!(error = %err, "failed to refresh syntax mode provider");
                result = Err(err);
            }
            self.register_provider_modes(index, provider.as_ref());
        }
        self.providers = providers;

        for strategy in self.added.clone() {
            self.register_strategy(strategy);
        }
        debug!(modes = self.modes.len(), "reloaded syntax modes");
        result
    }

    /// Load `name` and attach it to `document`. On failure the document keeps its strategy.
    pub fn attach(&mut self, document: &mut Document, name: &str) -> Result<(), SyntaxModeError> {
        let strategy = self.load(name)?;
        document.set_highlighting_strategy(strategy);
        Ok(())
    }

    /// Attach the strategy for `file_name` (falling back to `Default`).
    pub fn attach_for_file(&mut self, document: &mut Document, file_name: &str) {
        let strategy = self.find_highlighter_for_file(file_name);
        document.set_highlighting_strategy(strategy);
    }
}
