use crate::errors::BindingError;
use miette::{GraphicalReportHandler, GraphicalTheme, Report};

/// Prints an error as a miette report. Template errors show the offending
/// source with a label under the span.
pub fn emit_error(error: BindingError) {
    eprintln!("{:?}", Report::new(error));
}

/// Renders without colors or unicode, for logs and tests.
pub fn render_plain(error: &BindingError) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::ascii());
    if handler.render_report(&mut out, error).is_err() {
        return error.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::SourceTemplate;

    #[test]
    fn plain_report_points_at_the_template_source() {
        let err = SourceTemplate::parse("bad.c.in", "PROTOTYPE ERROR_CLASS f(WIDGET w)\n{\n}\n")
            .unwrap_err();
        let text = render_plain(&err);
        assert!(text.contains("bad.c.in"), "{text}");
        assert!(text.contains("unknown parameter kind `WIDGET`"), "{text}");
        assert!(text.contains("PROTOTYPE ERROR_CLASS f(WIDGET w)"), "{text}");
    }
}
