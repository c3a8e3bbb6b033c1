use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::refs::RenameMap;

/// Replacement for names that sanitize down to nothing.
pub const FALLBACK_NAME: &str = "Unnamed";

/// How a generic-style name such as `Page[User]` is flattened into a name
/// that is legal in a pointer path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericNamingStrategy {
    /// `Page_User_`
    Underscore,
    /// `PageOfUser`, `PairOfAAndB`
    #[default]
    Of,
    /// `PageForUser`, `PairForAAndB`
    For,
    /// `PageUser`
    Flattened,
    /// `Page.User`
    Dot,
}

impl GenericNamingStrategy {
    fn join(self, base: &str, params: &[String]) -> String {
        match self {
            GenericNamingStrategy::Underscore => {
                let mut out = format!("{base}_");
                for param in params {
                    out.push_str(param);
                    out.push('_');
                }
                out
            }
            GenericNamingStrategy::Of => format!("{base}Of{}", params.join("And")),
            GenericNamingStrategy::For => format!("{base}For{}", params.join("And")),
            GenericNamingStrategy::Flattened => format!("{base}{}", params.concat()),
            GenericNamingStrategy::Dot => format!("{base}.{}", params.join(".")),
        }
    }
}

/// Naming options for generic-style schema names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericNaming {
    pub strategy: GenericNamingStrategy,
    /// Keep parameter casing as written instead of title-casing it.
    pub preserve_casing: bool,
}

/// A name of the form `Base[P1,P2]` or `Base<P1,P2>`, split apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericName {
    pub base: String,
    pub params: Vec<String>,
}

fn is_illegal_char(c: char) -> bool {
    matches!(
        c,
        '[' | ']' | '<' | '>' | ',' | '{' | '}' | '|' | '\\' | '^' | '`'
    ) || c.is_whitespace()
}

/// Whether `name` cannot be used as a pointer path segment as written.
pub fn is_invalid_name(name: &str) -> bool {
    name.trim().is_empty() || name.chars().any(is_illegal_char)
}

/// Split a generic-style name into base and parameters. Commas inside a
/// nested parameter do not split the outer list.
pub fn parse_generic_name(name: &str) -> Option<GenericName> {
    let name = name.trim();
    let open = name.find(['[', '<'])?;
    let close = match name.as_bytes()[open] {
        b'[' => ']',
        _ => '>',
    };
    if !name.ends_with(close) {
        return None;
    }

    let base = name[..open].trim();
    if base.is_empty() {
        return None;
    }

    let inner = &name[open + 1..name.len() - 1];
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '[' | '<' => depth += 1,
            ']' | '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                params.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    params.push(inner[start..].trim().to_string());

    if params.iter().any(String::is_empty) {
        return None;
    }
    Some(GenericName {
        base: base.to_string(),
        params,
    })
}

/// A namespace-qualified name such as `com.acme.User`. Passed through
/// untouched when it appears as a parameter.
fn is_qualified(name: &str) -> bool {
    name.contains('.') && !name.contains(['[', ']', '<', '>'])
}

/// Capitalize the first letter or digit of every run that starts the
/// string or follows `_`, `-`, `.`, `/` or a space. Other characters are kept.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if matches!(c, '_' | '-' | '.' | '/' | ' ') {
            at_start = true;
            out.push(c);
        } else if at_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
            at_start = false;
        } else {
            out.push(c);
            at_start = false;
        }
    }
    out
}

/// Replace illegal characters with `_`, collapse runs of `_`, and trim
/// them from both ends.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if is_illegal_char(c) { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn render_param(param: &str, naming: GenericNaming) -> String {
    if is_qualified(param) {
        return param.to_string();
    }
    if let Some(generic) = parse_generic_name(param) {
        return render_generic(&generic, naming);
    }
    let param = if is_invalid_name(param) {
        sanitize(param)
    } else {
        param.to_string()
    };
    if naming.preserve_casing {
        param
    } else {
        title_case(&param)
    }
}

fn render_generic(generic: &GenericName, naming: GenericNaming) -> String {
    let params: Vec<String> = generic
        .params
        .iter()
        .map(|p| render_param(p, naming))
        .collect();
    naming.strategy.join(&sanitize(&generic.base), &params)
}

/// The legal replacement for an invalid name, before collision handling.
pub fn render_name(name: &str, naming: GenericNaming) -> String {
    let rendered = match parse_generic_name(name) {
        Some(generic) => render_generic(&generic, naming),
        None => sanitize(name),
    };
    if is_invalid_name(&rendered) {
        sanitize(&rendered)
    } else {
        rendered
    }
}

/// Compute renames for every invalid name in `names`.
///
/// Invalid names are handled in sorted order. A candidate that is already
/// taken, by a name that stays or by an earlier rename, gets a numeric
/// suffix starting at 2.
pub fn plan_renames<'a>(
    names: impl IntoIterator<Item = &'a str>,
    naming: GenericNaming,
) -> RenameMap {
    let names: BTreeSet<&str> = names.into_iter().collect();
    let (invalid, valid): (Vec<&str>, Vec<&str>) =
        names.into_iter().partition(|n| is_invalid_name(n));

    let mut taken: BTreeSet<String> = valid.into_iter().map(str::to_string).collect();
    let mut renames = RenameMap::new();

    for old in invalid {
        let candidate = render_name(old, naming);
        let mut new = candidate.clone();
        let mut suffix = 2;
        while taken.contains(&new) {
            new = format!("{candidate}{suffix}");
            suffix += 1;
        }
        taken.insert(new.clone());
        renames.insert(old.to_string(), new);
    }
    renames
}
