//! Pure filename-to-module-identifier derivation (spec.md §4.5).
//!
//! `to_module_name` is deliberately side-effect-free: no filesystem access, no
//! `Path::canonicalize`. The CJS rewriter is the only caller that needs
//! filesystem truth (does `./c.js` exist?) and that's out of scope here —
//! this module only needs the string transform to be deterministic and
//! injective within a compilation unit, which a pure function gives for free.

/// Derive a stable module identifier from a filename, optionally resolved
/// relative to a referencing filename (the file containing the `require`).
///
/// - `path`: the raw specifier, e.g. `"./c"`, `"../lib/d.js"`, or (with no
///   `ref_path`) a project-relative source filename, e.g. `"a/b.js"`.
/// - `ref_path`: when given, `path` is resolved relative to it first (spec.md
///   §4.5 step 1); when `None`, `path` is already the final filename (used
///   for a script's own module identifier).
pub fn to_module_name(path: &str, ref_path: Option<&str>) -> String {
    let resolved = match ref_path {
        Some(ref_path) => resolve_relative(path, ref_path),
        None => path.to_string(),
    };
    identifier_from_filename(&resolved)
}

/// Resolve `path` against `ref_path` per spec.md §4.5 step 1:
/// strip trailing `.js` from both, count leading `./`/`../` segments in
/// `path`, drop that many trailing segments from `ref_path`, join what
/// remains with `/`, and append the residual `path`.
fn resolve_relative(path: &str, ref_path: &str) -> String {
    let ref_stripped = strip_js_suffix(ref_path);

    let mut rest = path;
    let mut strip_count = 0usize;
    loop {
        if let Some(after) = rest.strip_prefix("./") {
            rest = after;
            // A leading `./` strips no extra ref_path segment beyond the
            // file itself — it means "this directory".
            continue;
        }
        if let Some(after) = rest.strip_prefix("../") {
            rest = after;
            strip_count += 1;
            continue;
        }
        break;
    }
    let residual = strip_js_suffix(rest);

    if residual == rest && strip_count == 0 && !path.starts_with('.') {
        // Not actually a relative specifier — nothing to resolve against.
        return residual.to_string();
    }

    let mut ref_segments: Vec<&str> = ref_stripped.split('/').collect();
    // Drop the referencing file's own basename — references resolve against
    // its containing directory — plus one more trailing segment per `../`.
    if !ref_segments.is_empty() {
        ref_segments.pop();
    }
    for _ in 0..strip_count {
        if ref_segments.is_empty() {
            break;
        }
        ref_segments.pop();
    }

    if ref_segments.is_empty() {
        residual.to_string()
    } else {
        format!("{}/{}", ref_segments.join("/"), residual)
    }
}

fn strip_js_suffix(s: &str) -> &str {
    s.strip_suffix(".js").unwrap_or(s)
}

/// Transform a final filename into a `module$...` identifier (spec.md §4.5
/// step 2): strip leading `./`, replace `/` with `$`, strip trailing `.js`,
/// replace `-` with `_`, prefix with `module$`.
fn identifier_from_filename(filename: &str) -> String {
    let stripped_leading = filename.strip_prefix("./").unwrap_or(filename);
    let stripped_trailing = strip_js_suffix(stripped_leading);
    let mut id = String::with_capacity(stripped_trailing.len() + 7);
    id.push_str("module$");
    for ch in stripped_trailing.chars() {
        match ch {
            '/' => id.push('$'),
            '-' => id.push('_'),
            other => id.push(other),
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_filename_without_ref() {
        assert_eq!(to_module_name("a/b.js", None), "module$a$b");
    }

    #[test]
    fn strips_dash_and_extension() {
        assert_eq!(to_module_name("my-lib/foo-bar.js", None), "module$my_lib$foo_bar");
    }

    #[test]
    fn relative_same_directory() {
        assert_eq!(to_module_name("./c", Some("a/b.js")), "module$a$c");
    }

    #[test]
    fn relative_with_js_extension_on_both_sides() {
        assert_eq!(to_module_name("./c.js", Some("a/b.js")), "module$a$c");
    }

    #[test]
    fn relative_parent_directory() {
        assert_eq!(to_module_name("../c", Some("a/b/d.js")), "module$a$c");
    }

    #[test]
    fn relative_multiple_parent_directories() {
        assert_eq!(to_module_name("../../c", Some("a/b/d.js")), "module$c");
    }

    #[test]
    fn non_relative_specifier_is_left_as_module_id() {
        // A bare package name isn't resolved against ref_path at all —
        // the CJS rewriter only calls resolve_relative-style resolution
        // for specifiers that actually look relative.
        assert_eq!(to_module_name("a/b", None), "module$a$b");
    }

    #[test]
    fn deterministic_and_injective_for_distinct_paths() {
        let a = to_module_name("a/b.js", None);
        let b = to_module_name("a/c.js", None);
        assert_ne!(a, b);
        assert_eq!(a, to_module_name("a/b.js", None));
    }
}
