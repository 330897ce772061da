//! HTML sanitization for proxied embed pages.
//!
//! Strips ad and popup scripts/iframes, retargets `_blank` links to the
//! current frame, and injects a popup blocker plus a style block hiding
//! common ad containers. Sanitization is fail-open: if the rewriter fails for
//! any reason the original document is returned untouched.

use std::cell::Cell;
use std::rc::Rc;

use bytes::Bytes;
use lol_html::errors::RewritingError;
use lol_html::html_content::ContentType;
use lol_html::{element, end, HtmlRewriter, MemorySettings, Settings};

/// Elements removed outright (case-sensitive substring match on `src`).
pub const AD_SELECTORS: [&str; 5] = [
    r#"script[src*="ads"]"#,
    r#"script[src*="pop"]"#,
    r#"script[src*="click"]"#,
    r#"iframe[src*="ads"]"#,
    r#"iframe[src*="pop"]"#,
];

/// Upper bound on rewriter parser memory.
pub const MAX_REWRITER_MEMORY: usize = 16 * 1024 * 1024;

/// Replaces `window.open` and cancels clicks on `target="_blank"` elements.
pub const POPUP_BLOCKER_SCRIPT: &str = r#"
<script>
  window.open = function() {
    console.log('Popup blocked by proxy');
    return null;
  };

  document.addEventListener('DOMContentLoaded', function() {
    const allElements = document.getElementsByTagName('*');
    for (let i = 0; i < allElements.length; i++) {
      allElements[i].onclick = function(e) {
        if (this.getAttribute('target') === '_blank') {
          e.preventDefault();
          return false;
        }
      };
    }
  });
</script>
"#;

/// Hides elements whose class or id marks them as an ad container or overlay.
pub const AD_HIDING_STYLE: &str = r#"
<style>
  [class*="ad-container"], [class*="ads-container"], [id*="ad-container"], [id*="ads-container"],
  [class*="popup"], [id*="popup"], [class*="overlay"], [id*="overlay"] {
    display: none !important;
  }
</style>
"#;

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("rewriter failed: {0}")]
    Rewrite(#[from] RewritingError),

    #[error("rewritten document is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Sanitize an HTML document, returning the input unchanged on failure.
pub fn sanitize(html: &str) -> String {
    fail_open(html, try_sanitize(html))
}

/// Sanitize a raw response body. Bodies that are not UTF-8 pass through.
pub fn sanitize_bytes(body: &[u8]) -> Bytes {
    match std::str::from_utf8(body) {
        Ok(html) => Bytes::from(sanitize(html)),
        Err(e) => {
            tracing::warn!("HTML body is not UTF-8, passing through unmodified: {}", e);
            Bytes::copy_from_slice(body)
        }
    }
}

fn fail_open(original: &str, result: Result<String, SanitizeError>) -> String {
    match result {
        Ok(rewritten) => rewritten,
        Err(e) => {
            tracing::warn!("HTML sanitization failed, passing through unmodified: {}", e);
            original.to_string()
        }
    }
}

/// Sanitize an HTML document, surfacing rewriter failures.
///
/// The blocker script and style are appended at the end of `<head>`. Without
/// an explicit `</head>` they land where the head is implicitly closed, after
/// `</body>` and before `</html>`. Documents with no `<head>` at all get them
/// at the very end.
pub fn try_sanitize(html: &str) -> Result<String, SanitizeError> {
    let mut output = Vec::with_capacity(html.len() + POPUP_BLOCKER_SCRIPT.len() + AD_HIDING_STYLE.len());

    // Set once a <head> received the injected blocks; otherwise they go at the end
    let injected = Rc::new(Cell::new(false));
    let injected_in_head = Rc::clone(&injected);

    let mut element_content_handlers = Vec::with_capacity(AD_SELECTORS.len() + 2);
    for selector in AD_SELECTORS {
        element_content_handlers.push(element!(selector, |el| {
            el.remove();
            Ok(())
        }));
    }
    element_content_handlers.push(element!(r#"a[target="_blank"]"#, |el| {
        el.set_attribute("target", "_self")?;
        Ok(())
    }));
    element_content_handlers.push(element!("head", move |el| {
        if !injected_in_head.get() {
            el.append(POPUP_BLOCKER_SCRIPT, ContentType::Html);
            el.append(AD_HIDING_STYLE, ContentType::Html);
            injected_in_head.set(true);
        }
        Ok(())
    }));

    let mut memory_settings = MemorySettings::default();
    memory_settings.max_allowed_memory_usage = MAX_REWRITER_MEMORY;

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers,
            document_content_handlers: vec![end!(move |end| {
                if !injected.get() {
                    end.append(POPUP_BLOCKER_SCRIPT, ContentType::Html);
                    end.append(AD_HIDING_STYLE, ContentType::Html);
                }
                Ok(())
            })],
            memory_settings,
            ..Settings::new()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    Ok(String::from_utf8(output)?)
}
