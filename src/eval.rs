//! Represents command templates with embedded variable references, e.g.
//! `cat @in > $out`, and mechanisms for expanding those into plain strings.
//!
//! Two sigils introduce a variable: `$` for per-edge variables and `@` for
//! input-list variables.  The stored token keeps its sigil, so resolvers see
//! names like `@in` and `$out`.

use std::borrow::Cow;

/// An environment providing a mapping of variable name (sigil included) to
/// variable value.  A given Template may be expanded against multiple
/// environments; the core's concrete one is the edge environment in `graph`.
pub trait Env {
    fn get_var(&self, var: &str) -> Option<Cow<str>>;
}

/// One token within a Template, either literal text or a variable reference.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart<T: AsRef<str>> {
    Literal(T),
    VarRef(T),
}

/// A parse failure within a template.  The offset is a byte offset into the
/// template source; the manifest parser maps it back to a manifest position.
#[derive(Debug)]
pub struct TemplateError {
    pub msg: String,
    pub ofs: usize,
}

/// A parsed but unexpanded command template.  This is generic to support
/// Template<&str>, which borrows manifest text during parsing, and
/// Template<String>, which rules own.  The verbatim source is retained for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Template<T: AsRef<str>> {
    unparsed: T,
    parts: Vec<TemplatePart<T>>,
}

impl<'text> Template<&'text str> {
    pub fn parse(text: &'text str) -> Result<Template<&'text str>, TemplateError> {
        let bytes = text.as_bytes();
        let mut parts = Vec::new();
        let mut ofs = 0;
        while ofs < bytes.len() {
            let start = ofs;
            while ofs < bytes.len() && !matches!(bytes[ofs], b'$' | b'@') {
                ofs += 1;
            }
            if ofs > start {
                parts.push(TemplatePart::Literal(&text[start..ofs]));
            }
            if ofs == bytes.len() {
                break;
            }
            let sigil = ofs;
            ofs += 1;
            let name = ofs;
            while ofs < bytes.len() && bytes[ofs].is_ascii_lowercase() {
                ofs += 1;
            }
            if ofs == name {
                return Err(TemplateError {
                    msg: format!("expected variable name after {:?}", bytes[sigil] as char),
                    ofs: sigil,
                });
            }
            parts.push(TemplatePart::VarRef(&text[sigil..ofs]));
        }
        Ok(Template {
            unparsed: text,
            parts,
        })
    }

    pub fn into_owned(self) -> Template<String> {
        Template {
            unparsed: self.unparsed.to_owned(),
            parts: self
                .parts
                .into_iter()
                .map(|part| match part {
                    TemplatePart::Literal(s) => TemplatePart::Literal(s.to_owned()),
                    TemplatePart::VarRef(s) => TemplatePart::VarRef(s.to_owned()),
                })
                .collect(),
        }
    }
}

impl<T: AsRef<str>> Template<T> {
    /// The original template text, verbatim.
    pub fn unparsed(&self) -> &str {
        self.unparsed.as_ref()
    }

    pub fn parts(&self) -> &[TemplatePart<T>] {
        &self.parts
    }

    /// Expand the template: literals verbatim, variables via `env`.
    /// Variables the environment doesn't know expand to "".
    pub fn evaluate(&self, env: &dyn Env) -> String {
        let mut val = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(s) => val.push_str(s.as_ref()),
                TemplatePart::VarRef(v) => {
                    if let Some(v) = env.get_var(v.as_ref()) {
                        val.push_str(&v);
                    }
                }
            }
        }
        val
    }
}
