//! Inline scripts embedded in every page

use super::{Theme, THEME_ATTRIBUTE, THEME_STORAGE_KEY};

/// Script placed in `<head>` so the persisted theme is applied before the
/// body is painted.
pub fn bootstrap_script() -> String {
    format!(
        r#"(function() {{
  try {{
    var t = localStorage.getItem('{key}');
    if (t === 'dark' || t === 'light') document.documentElement.setAttribute('{attr}', t);
  }} catch (e) {{}}
}})();"#,
        key = THEME_STORAGE_KEY,
        attr = THEME_ATTRIBUTE,
    )
}

/// Script wiring the toolbar toggle button. `fallback` is the theme assumed
/// when the root element carries no attribute yet.
pub fn toggle_script(fallback: Theme) -> String {
    format!(
        r#"(function() {{
  var root = document.documentElement;
  var button = document.getElementById('theme-toggle');
  if (!button) return;
  function current() {{ return root.getAttribute('{attr}') || '{fallback}'; }}
  function label(t) {{ return t === 'dark' ? '{dark_label}' : '{light_label}'; }}
  button.setAttribute('aria-label', label(current()));
  button.addEventListener('click', function() {{
    var next = current() === 'dark' ? 'light' : 'dark';
    root.setAttribute('{attr}', next);
    button.setAttribute('aria-label', label(next));
    try {{ localStorage.setItem('{key}', next); }} catch (e) {{}}
  }});
}})();"#,
        attr = THEME_ATTRIBUTE,
        key = THEME_STORAGE_KEY,
        fallback = fallback.as_str(),
        dark_label = Theme::Dark.toggle_label(),
        light_label = Theme::Light.toggle_label(),
    )
}
