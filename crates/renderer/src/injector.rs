//! Splicing rendered text between HTML comment markers.
//!
//! ```text
//! <!-- BEGIN: dock-docs -->
//! ...replaced on every run...
//! <!-- END: dock-docs -->
//! ```

use crate::errors::InjectError;

pub const DEFAULT_MARKER: &str = "dock-docs";

pub fn begin_marker(name: &str) -> String {
    format!("<!-- BEGIN: {} -->", marker_name(name))
}

pub fn end_marker(name: &str) -> String {
    format!("<!-- END: {} -->", marker_name(name))
}

fn marker_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() { DEFAULT_MARKER } else { name }
}

/// Replaces the region between the `marker` comments with `rendered`.
///
/// The markers themselves are kept and everything outside them is returned
/// unchanged. The rendered text sits on its own lines, so injecting the same
/// text twice yields the same document.
pub fn inject(content: &str, marker: &str, rendered: &str) -> Result<String, InjectError> {
    let begin = begin_marker(marker);
    let end = end_marker(marker);

    let begin_at = content
        .find(&begin)
        .ok_or_else(|| InjectError::MissingMarker {
            marker: begin.clone(),
        })?;
    let end_at = content
        .find(&end)
        .ok_or_else(|| InjectError::MissingMarker {
            marker: end.clone(),
        })?;
    if end_at < begin_at {
        return Err(InjectError::EndBeforeBegin {
            marker: marker_name(marker).to_string(),
        });
    }

    let body = rendered.trim_matches('\n');
    let mut out = String::with_capacity(content.len() + body.len());
    out.push_str(&content[..begin_at]);
    out.push_str(&begin);
    out.push('\n');
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(&content[end_at..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "# Title\n\nIntro text.\n\n<!-- BEGIN: dock-docs -->\nOLD CONTENT\n<!-- END: dock-docs -->\n\nFooter\n";

    #[test]
    fn test_inject_replaces_region() {
        let out = inject(README, "", "| a | b |").unwrap();
        assert_eq!(
            out,
            "# Title\n\nIntro text.\n\n<!-- BEGIN: dock-docs -->\n| a | b |\n<!-- END: dock-docs -->\n\nFooter\n"
        );
        assert!(!out.contains("OLD CONTENT"));
    }

    #[test]
    fn test_inject_is_idempotent() {
        let once = inject(README, "dock-docs", "\nnew\n\n").unwrap();
        let twice = inject(&once, "dock-docs", "\nnew\n\n").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inject_named_marker_leaves_others() {
        let content = "<!-- BEGIN: a -->\nx\n<!-- END: a -->\n<!-- BEGIN: b -->\ny\n<!-- END: b -->\n";
        let out = inject(content, "b", "z").unwrap();
        assert_eq!(
            out,
            "<!-- BEGIN: a -->\nx\n<!-- END: a -->\n<!-- BEGIN: b -->\nz\n<!-- END: b -->\n"
        );
    }

    #[test]
    fn test_inject_preserves_crlf_outside_region() {
        let content = "top\r\n<!-- BEGIN: dock-docs -->\r\nold\r\n<!-- END: dock-docs -->\r\nbottom\r\n";
        let out = inject(content, "", "new").unwrap();
        assert!(out.starts_with("top\r\n<!-- BEGIN: dock-docs -->\nnew\n<!-- END: dock-docs -->\r\nbottom\r\n"));
    }

    #[test]
    fn test_inject_missing_begin() {
        let err = inject("<!-- END: dock-docs -->", "", "x").unwrap_err();
        assert_eq!(
            err,
            InjectError::MissingMarker {
                marker: "<!-- BEGIN: dock-docs -->".to_string()
            }
        );
    }

    #[test]
    fn test_inject_missing_end() {
        let err = inject("<!-- BEGIN: main -->\n", "main", "x").unwrap_err();
        assert!(err.to_string().contains("<!-- END: main -->"));
    }

    #[test]
    fn test_inject_end_before_begin() {
        let content = "<!-- END: dock-docs -->\n<!-- BEGIN: dock-docs -->\n";
        let err = inject(content, "", "x").unwrap_err();
        assert!(matches!(err, InjectError::EndBeforeBegin { .. }));
    }
}
