//! Type-specific content transforms
//!
//! A vault note and the local files it maps to are not always byte-identical.
//! An SSH key note holds both halves of a key pair (often with surrounding
//! text), while locally the private key and the `.pub` line live in two files.
//! [`canonical_content`] reduces either side to the same form so the two can
//! be compared by checksum.

use crate::catalog::ItemType;

/// Public key algorithm prefixes recognised on a `.pub` line
pub const PUBLIC_KEY_PREFIXES: &[&str] = &[
    "ssh-ed25519",
    "ssh-rsa",
    "ssh-dss",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "sk-ssh-ed25519@openssh.com",
    "sk-ecdsa-sha2-nistp256@openssh.com",
];

/// File name of the generated environment loader
pub const ENV_LOADER_NAME: &str = "load-env.sh";

fn is_begin_marker(line: &str) -> bool {
    line.starts_with("-----BEGIN") && line.ends_with("PRIVATE KEY-----")
}

fn is_end_marker(line: &str) -> bool {
    line.starts_with("-----END") && line.ends_with("PRIVATE KEY-----")
}

/// Extract the `-----BEGIN ... PRIVATE KEY-----` block, newline-terminated.
///
/// Returns `None` when no complete block is present.
pub fn extract_private_key(content: &str) -> Option<String> {
    let mut block: Vec<&str> = Vec::new();
    let mut inside = false;

    for line in content.lines().map(str::trim) {
        if !inside && is_begin_marker(line) {
            inside = true;
        }
        if inside {
            block.push(line);
            if is_end_marker(line) {
                return Some(ensure_trailing_newline(&block.join("\n")));
            }
        }
    }
    None
}

/// Extract the first public key line, newline-terminated.
pub fn extract_public_key(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| {
            PUBLIC_KEY_PREFIXES.iter().any(|prefix| {
                line.strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(' '))
            })
        })
        .map(ensure_trailing_newline)
}

/// Combine key halves into the canonical SSH key note.
pub fn combine_ssh_key(private_key: &str, public_key: Option<&str>) -> String {
    let mut combined = ensure_trailing_newline(private_key);
    if let Some(public_key) = public_key {
        combined.push_str(&ensure_trailing_newline(public_key));
    }
    combined
}

/// Reduce content to the form used for checksum comparison.
///
/// SSH keys become the private block followed by the public line; content
/// without a private block is left as is. Every other type is compared
/// verbatim.
pub fn canonical_content(item_type: ItemType, content: &str) -> String {
    match item_type {
        ItemType::SshKey => match extract_private_key(content) {
            Some(private_key) => {
                combine_ssh_key(&private_key, extract_public_key(content).as_deref())
            }
            None => content.to_string(),
        },
        ItemType::File | ItemType::Env | ItemType::Directory => content.to_string(),
    }
}

pub fn ensure_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

/// Variable assignments of an env file, in order.
///
/// Blank lines and `#` comments are skipped; a leading `export ` is
/// tolerated. Lines without `=` or with an invalid name are ignored.
pub fn parse_env_assignments(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            is_env_name(key).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

fn is_env_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Single-quote `value` for POSIX sh; `'` becomes `'\''`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Render a shell script exporting every assignment of `content`.
///
/// A value wrapped in one pair of quotes loses them; every value is then
/// single-quoted so sourcing performs no expansion or word splitting.
pub fn render_env_loader(content: &str) -> String {
    let mut script = String::from(
        "#!/bin/sh\n# Generated by dotvault on every pull. Do not edit.\n",
    );
    for (key, value) in parse_env_assignments(content) {
        script.push_str(&format!("export {key}={}\n", shell_quote(unquote(&value))));
    }
    script
}
