//! # Preview Pipeline
//!
//! Coordinates the editing loop: Gesture / Mutation → Store → Render
//!
//! The Pipeline manages:
//! - Routing drag gestures and mutations into the store
//! - Rendering the current document to HTML
//! - Caching the last render until the document changes

use crate::config::EditorConfig;
use crate::drag::{DragSource, DropResolver, DropTarget};
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::store::{Action, EditorStore};
use mailcraft_compiler_html::{render_with_options, CompileOptions};
use tracing::{debug, instrument};

/// Owns the store and keeps a rendered preview in sync with it
#[derive(Debug)]
pub struct Pipeline {
    store: EditorStore,
    resolver: DropResolver,
    options: CompileOptions,

    /// Last rendered HTML and the store version it was rendered from
    cache: Option<(u64, String)>,
}

impl Pipeline {
    pub fn new(store: EditorStore, resolver: DropResolver, options: CompileOptions) -> Self {
        Self {
            store,
            resolver,
            options,
            cache: None,
        }
    }

    /// Empty document styled and seeded from `config`
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            EditorStore::new(config.new_document()),
            DropResolver::new(config.registry()),
            config.compile_options(),
        )
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EditorStore {
        &mut self.store
    }

    pub fn resolver(&self) -> &DropResolver {
        &self.resolver
    }

    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
    }

    /// Validate and apply a structural mutation. Returns the new store
    /// version.
    #[instrument(skip(self))]
    pub fn apply_mutation(&mut self, mutation: Mutation) -> Result<u64, EditorError> {
        mutation.validate(self.store.document())?;

        let registry = self.resolver.registry_mut();
        registry.reserve_ids(self.store.document());
        let next = mutation.apply(self.store.document(), registry);

        self.store.dispatch(Action::SetDocument(next));
        Ok(self.store.version())
    }

    pub fn begin_drag(&mut self, source: DragSource) -> Result<(), EditorError> {
        self.resolver.begin(&mut self.store, source)?;
        Ok(())
    }

    pub fn hover(&mut self, target: Option<DropTarget>) {
        self.resolver.hover(target);
    }

    /// Finish the current gesture; see [`DropResolver::end`]
    pub fn end_drag(&mut self, target: Option<DropTarget>) -> Result<bool, EditorError> {
        Ok(self.resolver.end(&mut self.store, target)?)
    }

    pub fn cancel_drag(&mut self) {
        self.resolver.cancel(&mut self.store);
    }

    /// HTML for the current document, rendered at most once per version
    pub fn html(&mut self) -> &str {
        let version = self.store.version();
        let fresh = matches!(&self.cache, Some((cached, _)) if *cached == version);

        if !fresh {
            debug!(version, "Rendering preview");
            let html = render_with_options(self.store.document(), &self.options);
            self.cache = Some((version, html));
        }

        self.cache.as_ref().map(|(_, html)| html.as_str()).unwrap_or_default()
    }

    /// Version the cached HTML was rendered from
    pub fn cached_version(&self) -> Option<u64> {
        self.cache.as_ref().map(|(version, _)| *version)
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Replace the render options; the next `html()` re-renders
    pub fn set_options(&mut self, options: CompileOptions) {
        self.options = options;
        self.clear_cache();
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }
}
