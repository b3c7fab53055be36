//! Grammar and query caching (the parser pool).
//!
//! Compiled queries are process-wide: `Query` is immutable after
//! construction and safe to share, so one `Arc<Query>` per language lives in
//! a global table for the process lifetime. Parsers are stateful and stay
//! per-thread: each worker thread lazily builds one `Parser` per language in
//! `thread_local!` storage, so the pool never contends on a lock in the hot
//! path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tree_sitter::{Language, Parser, Query};

use crate::error::{RepomapError, Result};
use crate::lang::LanguageSpec;

/// A loaded grammar with its compiled capture query.
pub struct CompiledLanguage {
    pub language: Language,
    pub query: Query,
}

/// `None` records a load failure so it is reported once, not per file.
type CacheEntry = Option<Arc<CompiledLanguage>>;

fn query_cache() -> &'static Mutex<HashMap<&'static str, CacheEntry>> {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, CacheEntry>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Load (or fetch from cache) the grammar and compiled query for a language.
pub fn compiled_language(spec: &'static LanguageSpec) -> Result<Arc<CompiledLanguage>> {
    let mut cache = query_cache().lock().expect("query cache poisoned");
    if let Some(entry) = cache.get(spec.name) {
        return entry
            .clone()
            .ok_or_else(|| RepomapError::GrammarLoadFailed(spec.name.to_string()));
    }

    let language = (spec.grammar)();
    let compiled = match Query::new(&language, spec.query) {
        Ok(query) => Some(Arc::new(CompiledLanguage { language, query })),
        Err(err) => {
            tracing::warn!(language = spec.name, %err, "capture query failed to compile");
            None
        }
    };
    cache.insert(spec.name, compiled.clone());
    compiled.ok_or_else(|| RepomapError::GrammarLoadFailed(spec.name.to_string()))
}

thread_local! {
    static PARSERS: RefCell<HashMap<&'static str, Parser>> = RefCell::new(HashMap::new());
}

/// Run `f` with this thread's parser for `spec` and the shared compiled
/// query. The parser is created (and its grammar set) on first use per
/// thread.
pub fn with_parser<R>(
    spec: &'static LanguageSpec,
    f: impl FnOnce(&mut Parser, &CompiledLanguage) -> R,
) -> Result<R> {
    let compiled = compiled_language(spec)?;
    PARSERS.with(|parsers| {
        let mut parsers = parsers.borrow_mut();
        let parser = match parsers.entry(spec.name) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let mut parser = Parser::new();
                parser
                    .set_language(&compiled.language)
                    .map_err(|_| RepomapError::GrammarLoadFailed(spec.name.to_string()))?;
                e.insert(parser)
            }
        };
        Ok(f(parser, &compiled))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::language_for_path;

    #[test]
    fn test_compiled_language_is_cached() {
        let spec = language_for_path("a.ts").unwrap();
        let first = compiled_language(spec).expect("typescript grammar must load");
        let second = compiled_language(spec).expect("cache hit must succeed");
        assert!(Arc::ptr_eq(&first, &second), "second load must hit the cache");
    }

    #[test]
    fn test_every_registered_query_compiles() {
        for spec in crate::lang::LANGUAGES {
            compiled_language(spec)
                .unwrap_or_else(|_| panic!("query for {} must compile", spec.name));
        }
    }

    #[test]
    fn test_with_parser_parses() {
        let spec = language_for_path("a.ts").unwrap();
        let root_kind = with_parser(spec, |parser, _| {
            let tree = parser.parse("const x = 1;", None).unwrap();
            tree.root_node().kind().to_string()
        })
        .unwrap();
        assert_eq!(root_kind, "program");
    }
}
