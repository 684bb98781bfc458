//! MODULE: ASSEMBLER (spec.md §4.6)
//!
//! Turns the ordered, cleaned-and-redacted file contents into a single
//! Markdown document: one fenced section per file, an empty or
//! whitespace-only body omitted entirely (the Reader/Line Filter stages
//! may have reduced a file to nothing), and an optional appendix set off
//! by a horizontal rule.

/// One file's worth of content, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

impl Section {
    #[must_use]
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self { heading: heading.into(), body: body.into() }
    }

    fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// The complete rendered unit: an optional title, the per-file sections
/// in enumeration order, and an optional appendix (e.g. a summary of
/// skipped files).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub title: Option<String>,
    pub sections: Vec<Section>,
    pub appendix: Option<String>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render to Markdown. Sections whose body is empty or
    /// whitespace-only are skipped rather than emitted as an empty
    /// fence — an all-whitespace file carries no information once
    /// cleaned and redacted.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            out.push_str("# ");
            out.push_str(title);
            out.push_str("\n\n");
        }

        for section in &self.sections {
            if section.is_empty() {
                continue;
            }
            out.push_str("## ");
            out.push_str(&section.heading);
            out.push_str("\n\n~~~\n");
            out.push_str(section.body.trim_end_matches('\n'));
            out.push_str("\n~~~\n\n");
        }

        if let Some(appendix) = &self.appendix {
            out.push_str("---\n\n## Appendix\n\n");
            out.push_str(appendix);
            out.push('\n');
        }

        out
    }
}
