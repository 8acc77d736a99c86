//! View specifications.

use log::{debug, trace};

use crate::{
    erlang, javascript, results, Error, Language, QueryOptions, RowEnvelope, ViewOptions,
    ViewResult,
};

/// The document property holding the name of the class a document belongs
/// to. Documents are tagged with it when they are written.
pub const DISCRIMINATOR_FIELD: &str = "ruby_class";

/// A view specification describes a view over the documents of a single
/// class: which of them to index, what to emit for each, and how to query it.
///
/// A spec cannot be modified once constructed, and can be used to generate
/// its map function and process query results any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    owner_class_name: String,
    view_name: String,
    view_options: ViewOptions,
    query_options: QueryOptions,
}

impl ViewSpec {
    /// Constructor.
    pub fn new<C, N>(
        owner_class_name: C,
        view_name: N,
        view_options: ViewOptions,
        query_options: QueryOptions,
    ) -> Self
    where
        C: AsRef<str>,
        N: AsRef<str>,
    {
        Self {
            owner_class_name: owner_class_name.as_ref().to_string(),
            view_name: view_name.as_ref().to_string(),
            view_options,
            query_options,
        }
    }

    /// The class name documents must be tagged with to be indexed by this
    /// view.
    pub fn owner_class_name(&self) -> &str {
        &self.owner_class_name
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn view_options(&self) -> &ViewOptions {
        &self.view_options
    }

    pub fn query_options(&self) -> &QueryOptions {
        &self.query_options
    }

    pub fn language(&self) -> Language {
        self.view_options.language
    }

    /// A copy of this spec that generates its map function in the given
    /// language instead.
    pub fn with_language(&self, language: Language) -> Self {
        Self {
            view_options: self.view_options.clone().with_language(language),
            ..self.clone()
        }
    }

    /// Generate the source code of this view's map function in the configured
    /// language.
    ///
    /// Fails if the emit value cannot be encoded, or if the options request
    /// something the language has no encoding for.
    pub fn map_function(&self) -> Result<String, Error> {
        let language = self.language();
        let source = match language {
            Language::JavaScript => {
                javascript::map_function(&self.owner_class_name, &self.view_options)?
            }
            Language::Erlang => erlang::map_function(&self.owner_class_name, &self.view_options)?,
        };
        debug!(
            "Generated {} map function for view {} of {}",
            language, self.view_name, self.owner_class_name
        );
        trace!("Map function for view {}:\n{}", self.view_name, source);
        Ok(source)
    }

    /// Extract the results of a query against this view from the given rows.
    ///
    /// Produces the rows' documents if `include_docs` is set, skipping rows
    /// whose documents no longer exist, and the rows' IDs otherwise.
    pub fn process_results(&self, rows: RowEnvelope) -> Vec<ViewResult> {
        results::process(rows, self.query_options.include_docs())
    }
}
