// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment Compositor (spec.md §4.4), grounded on
//! `examples/original_source/lib/winss/environment.cpp`'s `EnvironmentDir::ReadEnv`.
//!
//! Merges the process environment with overrides read from a directory of
//! name/value files: the file name is the variable name, its content the
//! value; an empty file removes the variable; names starting with `.` or
//! containing `=` are skipped. `${NAME}`-style references inside a value are
//! expanded once, against the environment composed so far (EXPANSION 4.4a) —
//! the original's `ExpandEnvironmentVariables` call happens per file, using
//! whatever the map already holds, not a second global pass.

use std::collections::BTreeMap;
use std::path::Path;

use winss_platform::FsHost;

/// Pure composition step: apply `dir_entries` (already read, in filesystem
/// enumeration order) onto `base`, expanding `${NAME}` references against
/// the map as it is built up.
pub fn compose(
    base: BTreeMap<String, String>,
    dir_entries: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    let mut env = base;
    for (key, raw_value) in dir_entries {
        if key.starts_with('.') || key.contains('=') {
            continue;
        }
        if raw_value.is_empty() {
            env.remove(&key);
            continue;
        }
        let expanded = expand(&raw_value, &env);
        env.insert(key, expanded);
    }
    env
}

/// Expands every `${NAME}` reference in `value` against `env`, one pass: the
/// substituted text is never itself re-scanned for further references.
/// A reference to a name not present in `env` expands to the empty string.
pub fn expand(value: &str, env: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = value[i + 2..].find('}') {
                let name = &value[i + 2..i + 2 + end];
                out.push_str(env.get(name).map(String::as_str).unwrap_or(""));
                i += 2 + end + 1;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Serializes a composed environment as `name=value\0` pairs terminated by
/// an extra `\0`, the block shape the platform process-creation call wants
/// (spec.md §4.4).
pub fn serialize_block(env: &BTreeMap<String, String>) -> Vec<u8> {
    let mut out = Vec::new();
    for (key, value) in env {
        out.extend_from_slice(key.as_bytes());
        out.push(b'=');
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    }
    out.push(0);
    out
}

/// Reads `env_dir` (if present) through `fs` and composes it onto
/// `process_env`. Returns `process_env` unchanged if `env_dir` does not
/// exist — an absent `env/` directory is not an error (spec.md §4.4:
/// "optional directory").
pub async fn compose_from_dir(
    fs: &impl FsHost,
    process_env: BTreeMap<String, String>,
    env_dir: &Path,
) -> BTreeMap<String, String> {
    if !fs.exists(env_dir).await {
        return process_env;
    }
    let mut names = fs.read_dir_names(env_dir).await.unwrap_or_default();
    names.sort();

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        if name.starts_with('.') || name.contains('=') {
            continue;
        }
        if let Ok(Some(value)) = fs.read_to_string(&env_dir.join(&name)).await {
            entries.push((name, value));
        }
    }
    compose(process_env, entries)
}

#[cfg(test)]
#[path = "env_compositor_tests.rs"]
mod tests;
