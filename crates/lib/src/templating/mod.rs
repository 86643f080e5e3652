//! # Prompt Set Resolution
//!
//! Turns a named prompt set into a single flattened prompt string. The main
//! document is located under `{base_dir}/{safe_name}/{safe_name}.txt`,
//! `{{include:path}}` directives are spliced in relative to the main
//! document's directory, and `{{macro}}` placeholders are substituted with
//! caller-supplied [`MacroValue`]s. Any placeholder left without a binding
//! fails the whole resolution.

pub mod inline;
mod values;

pub use values::{MacroBindings, MacroValue};

use crate::constants::{MAX_INCLUDE_PASSES, PROMPT_FILE_EXT};
use crate::store::DocumentStore;
use regex::{NoExpand, Regex};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors terminal to a single resolution call. There is no retry and no
/// partial result; a failed resolution yields no usable prompt.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The main prompt document is missing or unreadable.
    #[error("main prompt document not found or could not be read: {0}")]
    DocumentNotFound(String),
    /// An include target is missing or unreadable.
    #[error("include file not found or could not be read: {0}")]
    IncludeNotFound(String),
    /// Placeholders remained without a bound value. The list is sorted and
    /// deduplicated so every gap can be fixed in one iteration.
    #[error("prompt construction error: missing macros not substituted: {0:?}")]
    MissingMacros(Vec<String>),
    /// Include expansion exhausted its pass budget, almost certainly a cycle.
    #[error("include expansion exceeded {limit} passes while expanding '{directive}', likely an include cycle", limit = MAX_INCLUDE_PASSES, directive = .0)]
    IncludeCycle(String),
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Diagnostic events emitted while a prompt set is being resolved.
///
/// Observers are advisory only and never alter the resolution outcome.
#[derive(Debug)]
pub enum ResolveEvent<'a> {
    /// The main document was read successfully.
    MainDocumentLoaded { path: &'a Path },
    /// An include directive was replaced with the named file's content.
    IncludeExpanded { path: &'a Path },
    /// Every occurrence of a macro was replaced with its bound value.
    MacroSubstituted { name: &'a str },
    /// Resolution finished with the final flattened text.
    Resolved { text: &'a str },
}

/// Observer callback invoked for each [`ResolveEvent`].
pub type ResolveObserver<'a> = dyn Fn(&ResolveEvent<'_>) + Send + Sync + 'a;

/// Maps a prompt set name to a filesystem-safe token.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`. Idempotent. Two
/// distinct names can sanitize to the same token; lookup stays keyed purely
/// by name, so such names alias the same storage location.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stateless resolver over a [`DocumentStore`].
///
/// Holds no mutable state; every call re-reads from the store, so
/// concurrent resolutions need no coordination.
pub struct PromptResolver<'a> {
    store: &'a dyn DocumentStore,
    observer: Option<&'a ResolveObserver<'a>>,
}

impl<'a> PromptResolver<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            observer: None,
        }
    }

    /// Attaches an observer notified of each include and substitution.
    pub fn with_observer(mut self, observer: &'a ResolveObserver<'a>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn emit(&self, event: ResolveEvent<'_>) {
        if let Some(observer) = self.observer {
            observer(&event);
        }
    }

    /// Locates the main document for `prompt_set_name` under `base_dir`.
    ///
    /// The sanitized name is used both as the subdirectory and, with a
    /// `.txt` suffix, as the filename.
    pub fn locate_main_document(
        &self,
        prompt_set_name: &str,
        base_dir: &Path,
    ) -> Result<PathBuf, TemplateError> {
        let safe = sanitize_name(prompt_set_name);
        let path = base_dir
            .join(&safe)
            .join(format!("{safe}.{PROMPT_FILE_EXT}"));
        if !self.store.exists(&path) {
            return Err(TemplateError::DocumentNotFound(format!(
                "{path}. Expected main file for prompt set '{prompt_set_name}'. \
                 Check that the file exists and the name is valid (spaces and \
                 special characters are replaced with underscores).",
                path = path.display()
            )));
        }
        Ok(path)
    }

    /// Resolves a prompt set by name: locate the main document, expand its
    /// includes, substitute macros. This is the operation external callers
    /// use; [`PromptResolver::resolve`] is the same minus the name lookup.
    pub fn resolve_by_name(
        &self,
        prompt_set_name: &str,
        base_dir: &Path,
        bindings: &MacroBindings,
    ) -> Result<String, TemplateError> {
        let main_path = self.locate_main_document(prompt_set_name, base_dir)?;
        self.resolve(&main_path, bindings)
    }

    /// Resolves the document at `main_path` against `bindings`.
    ///
    /// Includes are expanded first, left to right, each directive replaced
    /// by the referenced file's content. Then every distinct discovered
    /// macro is substituted exactly once; the text is not re-scanned
    /// afterwards, so a bound value that itself contains `{{...}}` syntax
    /// is only eligible for substitution by macros later in the discovered
    /// set, never in a fixed-point loop.
    pub fn resolve(
        &self,
        main_path: &Path,
        bindings: &MacroBindings,
    ) -> Result<String, TemplateError> {
        info!("loading main prompt document: {}", main_path.display());
        debug!(?bindings, "dynamic values supplied for macro substitution");

        let mut text = self.store.read_to_string(main_path).map_err(|e| {
            error!(
                "error reading main prompt document '{}': {e}",
                main_path.display()
            );
            TemplateError::DocumentNotFound(main_path.display().to_string())
        })?;
        self.emit(ResolveEvent::MainDocumentLoaded { path: main_path });

        // Includes resolve against the main document's directory, even when
        // the directive arrived through another include.
        let base_dir = main_path.parent().unwrap_or(Path::new("")).to_path_buf();

        let include_re = Regex::new(r"\{\{include:([^}]+)\}\}")?;
        let mut passes = 0usize;
        loop {
            let (range, target) = {
                let Some(caps) = include_re.captures(&text) else {
                    break;
                };
                let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                    break;
                };
                (whole.range(), target.as_str().trim().to_string())
            };
            if passes >= MAX_INCLUDE_PASSES {
                error!("include expansion pass budget exhausted at '{target}'");
                return Err(TemplateError::IncludeCycle(target));
            }
            passes += 1;

            let include_path = base_dir.join(&target);
            let included = self.store.read_to_string(&include_path).map_err(|e| {
                error!("error including file '{}': {e}", include_path.display());
                TemplateError::IncludeNotFound(include_path.display().to_string())
            })?;
            info!("including file: {}", include_path.display());
            self.emit(ResolveEvent::IncludeExpanded {
                path: &include_path,
            });
            text.replace_range(range, &included);
        }

        let macro_re = Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}")?;
        let discovered: BTreeSet<String> = macro_re
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
            .collect();

        let mut missing = Vec::new();
        for name in &discovered {
            let Some(value) = bindings.get(name) else {
                error!("macro '{{{{{name}}}}}' not found in dynamic values");
                missing.push(name.clone());
                continue;
            };
            // Name charset is [A-Za-z0-9_], so interpolating it into the
            // pattern cannot introduce metacharacters.
            let occurrence = Regex::new(&format!(r"\{{\{{\s*{name}\s*\}}\}}"))?;
            let rendered = value.to_string();
            text = occurrence.replace_all(&text, NoExpand(&rendered)).into_owned();
            self.emit(ResolveEvent::MacroSubstituted {
                name: name.as_str(),
            });
        }

        if !missing.is_empty() {
            error!("prompt construction error: missing macros not substituted: {missing:?}");
            return Err(TemplateError::MissingMacros(missing));
        }

        debug!("final constructed prompt:\n{text}");
        self.emit(ResolveEvent::Resolved { text: &text });
        Ok(text)
    }
}
