//! Parsed content templates.
//!
//! A [`Template`] is literal text interleaved with named placeholders
//! written `{{ name }}`. Templates are produced by the parser crate; this
//! module renders them and recovers bound values from rendered output.

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use thiserror::Error;

/// One piece of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Text copied verbatim.
    Text(String),
    /// A named substitution point.
    Placeholder(String),
}

/// Errors raised while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no value bound for placeholder `{0}`")]
    MissingBinding(String),
}

/// A content template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Create a template from parts, dropping empty text.
    pub fn new(parts: impl IntoIterator<Item = TemplatePart>) -> Self {
        let parts = parts
            .into_iter()
            .filter(|part| !matches!(part, TemplatePart::Text(text) if text.is_empty()))
            .collect();
        Self { parts }
    }

    /// Returns the parts in order.
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Iterate over placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Placeholder(name) => Some(name.as_str()),
            TemplatePart::Text(_) => None,
        })
    }

    /// Substitute every placeholder with its binding.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingBinding`] for the first placeholder
    /// without a binding.
    pub fn render(&self, bindings: &HashMap<&str, String>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Placeholder(name) => out.push_str(
                    bindings
                        .get(name.as_str())
                        .ok_or_else(|| TemplateError::MissingBinding(name.clone()))?,
                ),
            }
        }
        Ok(out)
    }

    /// Match rendered output against this template and recover the value
    /// bound to each placeholder.
    ///
    /// Earlier placeholders take the longest value that still lets the rest
    /// of the template match. Returns `None` if the output does not match or
    /// a repeated placeholder was bound to different values.
    pub fn extract(&self, rendered: &str) -> Option<HashMap<String, String>> {
        let mut bindings = HashMap::new();
        match_parts(&self.parts, rendered, &mut bindings).then_some(bindings)
    }
}

fn match_parts(
    parts: &[TemplatePart],
    rendered: &str,
    bindings: &mut HashMap<String, String>,
) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return rendered.is_empty();
    };

    match part {
        TemplatePart::Text(text) => rendered
            .strip_prefix(text.as_str())
            .is_some_and(|tail| match_parts(rest, tail, bindings)),
        TemplatePart::Placeholder(name) => {
            if let Some(bound) = bindings.get(name) {
                return rendered
                    .strip_prefix(bound.as_str())
                    .is_some_and(|tail| match_parts(rest, tail, bindings));
            }

            let ends = rendered
                .char_indices()
                .map(|(index, _)| index)
                .chain([rendered.len()])
                .rev();
            for end in ends {
                let (value, tail) = rendered.split_at(end);
                bindings.insert(name.clone(), value.to_string());
                if match_parts(rest, tail, bindings) {
                    return true;
                }
                bindings.remove(name);
            }
            false
        }
    }
}

impl Display for Template {
    /// Writes the template back in its source syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => f.write_str(text)?,
                TemplatePart::Placeholder(name) => write!(f, "{{{{ {name} }}}}")?,
            }
        }
        Ok(())
    }
}
