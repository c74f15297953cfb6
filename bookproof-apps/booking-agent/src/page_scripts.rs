//!  Bookproof Booking Agent
//!
//!  Copyright (C) 2026  The Bookproof Authors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # In-Page Heuristic Scripts
//!
//! Side-effect free assembly of the JavaScript evaluated inside the booking
//! page. Booking sites expose no stable selectors and switch language per
//! visitor, so every script works off fuzzy text matching instead of DOM ids.

/// Click the most plausible primary action on the page.
///
/// Tries the reserve/book pattern first, then falls back to continue/next.
/// Returns `'clicked'`, `'clicked-next'`, or `'not-found'`; the last one is
/// a normal outcome on page variants without an advance button.
pub const JS_CLICK_PRIMARY_ACTION: &str = r#"
(() => {
  const clickable = Array.from(document.querySelectorAll('button, a'));
  const primary = clickable.filter(el => /reserve|book|จอง/i.test(el.textContent||''));
  if (primary[0]) { primary[0].click(); return 'clicked'; }
  const advance = clickable.find(el => /continue|next|ถัดไป|ดำเนินการต่อ/i.test(el.textContent||''));
  if (advance) { advance.click(); return 'clicked-next'; }
  return 'not-found';
})()
"#;

/// Locate one input by label text and populate it.
///
/// Resolution order: `<label>` text match, then the `for` linkage or the
/// nearest descendant input, then a placeholder-text fallback. The synthetic
/// `input` event is required since frameworks ignore bare value assignment.
/// Returns `true` when a field was filled, `false` when nothing matched.
pub const JS_FILL_BY_LABEL: &str = r#"
(arg) => {
  const {labelRegex, value} = arg;
  const rx = new RegExp(labelRegex, 'i');
  const labels = Array.from(document.querySelectorAll('label'));
  for (const lb of labels) {
    if (rx.test(lb.textContent||'')) {
      const id = lb.getAttribute('for');
      let input = id ? document.getElementById(id) : lb.querySelector('input,textarea,select');
      if (input) { input.focus(); input.value = value; input.dispatchEvent(new Event('input', {bubbles:true})); return true; }
    }
  }
  const inputs = Array.from(document.querySelectorAll('input[placeholder],textarea[placeholder]'));
  for (const i of inputs) {
    if (rx.test(i.getAttribute('placeholder')||'')) { i.focus(); i.value = value; i.dispatchEvent(new Event('input',{bubbles:true})); return true; }
  }
  return false;
}
"#;

/// Snapshot every iframe as `{i, name, src}` JSON.
///
/// Descriptors are stale after any click or navigation, so callers must
/// re-run this right before targeting a frame.
pub const JS_SNAPSHOT_IFRAMES: &str = r#"
(() => Array.from(document.querySelectorAll('iframe')).map((f,i)=>({i, name:f.name||'', src:f.src||''})))()
"#;

/// Wrap the fill function so the automation server can invoke it with an
/// argument object.
pub fn fill_by_label_script() -> String {
    format!("({})", JS_FILL_BY_LABEL.trim())
}
