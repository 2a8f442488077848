//! Body templates: `{inventory}` and `{flag:NAME}` placeholders.

use crate::conversation::ConversationState;

/// Substitute placeholders from the conversation state.
///
/// Unknown placeholders and unset flags are left verbatim.
pub fn render_template(template: &str, state: &ConversationState) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match resolve(key, state) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn resolve(key: &str, state: &ConversationState) -> Option<String> {
    if key == "inventory" {
        return Some(state.inventory_summary());
    }
    let name = key.strip_prefix("flag:")?;
    state.flag(name).map(|v| v.to_string())
}
