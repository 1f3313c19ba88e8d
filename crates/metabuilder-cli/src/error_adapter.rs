//! Error adapter for rendering [`MetabuilderError`] with miette.
//!
//! Scene errors carry the scene source and the byte range of the offending
//! text, so the report underlines it. Other errors are rendered as plain
//! messages with a diagnostic code.

use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceSpan};

use metabuilder::MetabuilderError;

/// A [`MetabuilderError`] that miette can render.
pub struct Reportable<'a>(&'a MetabuilderError);

impl<'a> Reportable<'a> {
    pub fn new(err: &'a MetabuilderError) -> Self {
        Self(err)
    }
}

impl fmt::Debug for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl Diagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            MetabuilderError::Io(_) => "metabuilder::io",
            MetabuilderError::Config(_) => "metabuilder::config",
            MetabuilderError::UnknownKind(_) => "metabuilder::scene::kind",
            MetabuilderError::UnknownReference(_) => "metabuilder::scene::reference",
            MetabuilderError::Rejected(_) => "metabuilder::rejected",
            MetabuilderError::Scene { .. } => "metabuilder::scene",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            MetabuilderError::UnknownKind(_) => {
                "element kinds: class, abstract-class, interface, package, data-type, enumeration, point; \
                 relationship kinds: association, generalization, composition"
            }
            MetabuilderError::UnknownReference(_) => {
                "relationships may only refer to elements declared before them"
            }
            MetabuilderError::Config(_) => {
                "canvas width and height must lie within 250..=4000; text char_width and line_height \
                 must be positive and padding must not be negative"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            MetabuilderError::Scene { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let MetabuilderError::Scene {
            message,
            span: Some(span),
            ..
        } = self.0
        else {
            return None;
        };
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            span,
        ))))
    }
}
