//! Lexical path primitives
//!
//! None of these functions touch the filesystem. They operate on the native
//! separator of the host (`/` on Unix, `\` on Windows, where `/` is accepted
//! as an alternate separator) and treat a leading volume name as opaque.

use std::path::{Component, Path};

/// Native path separator.
pub const SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Separator used in `PATH`-style lists.
#[cfg(windows)]
pub const LIST_SEPARATOR: char = ';';

/// Separator used in `PATH`-style lists.
#[cfg(not(windows))]
pub const LIST_SEPARATOR: char = ':';

fn is_sep(b: u8) -> bool {
    std::path::is_separator(char::from(b))
}

/// Length in bytes of the leading volume name (`C:`, `\\host\share`).
fn volume_name_len(path: &str) -> usize {
    match Path::new(path).components().next() {
        Some(Component::Prefix(prefix)) => prefix.as_os_str().len(),
        _ => 0,
    }
}

/// Leading volume name of `path`; always empty on Unix.
pub fn volume_name(path: &str) -> &str {
    &path[..volume_name_len(path)]
}

/// Whether `path` is absolute.
pub fn is_abs(path: &str) -> bool {
    Path::new(path).is_absolute()
}

/// Shortest path equivalent to `path` by purely lexical processing.
///
/// Repeated separators collapse, `.` elements are dropped, `..` consumes the
/// preceding element (and is dropped at the root), a trailing separator is
/// removed, and the empty result becomes `.`.
pub fn clean(path: &str) -> String {
    let vol_len = volume_name_len(path);
    let (vol, rest) = path.split_at(vol_len);
    if rest.is_empty() {
        // UNC roots stay as they are; a bare drive letter means "current dir on drive".
        if vol_len > 2 {
            return from_slash(path);
        }
        return format!("{}.", path);
    }

    let bytes = rest.as_bytes();
    let n = bytes.len();
    let rooted = is_sep(bytes[0]);

    let mut out: Vec<u8> = Vec::with_capacity(n);
    let mut r = 0;
    let mut dotdot = 0;
    if rooted {
        out.push(SEPARATOR as u8);
        r = 1;
        dotdot = 1;
    }

    while r < n {
        if is_sep(bytes[r]) {
            r += 1;
        } else if bytes[r] == b'.' && (r + 1 == n || is_sep(bytes[r + 1])) {
            r += 1;
        } else if bytes[r] == b'.'
            && bytes.get(r + 1) == Some(&b'.')
            && (r + 2 == n || is_sep(bytes[r + 2]))
        {
            r += 2;
            if out.len() > dotdot {
                let mut w = out.len() - 1;
                while w > dotdot && !is_sep(out[w]) {
                    w -= 1;
                }
                out.truncate(w);
            } else if !rooted {
                if !out.is_empty() {
                    out.push(SEPARATOR as u8);
                }
                out.extend_from_slice(b"..");
                dotdot = out.len();
            }
        } else {
            if (rooted && out.len() != 1) || (!rooted && !out.is_empty()) {
                out.push(SEPARATOR as u8);
            }
            while r < n && !is_sep(bytes[r]) {
                out.push(bytes[r]);
                r += 1;
            }
        }
    }

    if out.is_empty() {
        out.push(b'.');
    }

    // Only whole elements and ASCII separators were copied, so this is lossless.
    from_slash(&format!("{}{}", vol, String::from_utf8_lossy(&out)))
}

/// Last element of `path`.
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches(|c| std::path::is_separator(c));
    let trimmed = &trimmed[volume_name_len(trimmed)..];
    let last = match trimmed.rfind(|c| std::path::is_separator(c)) {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    };
    if last.is_empty() {
        return SEPARATOR.to_string();
    }
    last.to_string()
}

/// Index just past the final separator, never inside the volume name.
fn last_separator_end(path: &str) -> usize {
    let vol_len = volume_name_len(path);
    path.as_bytes()[vol_len..]
        .iter()
        .rposition(|&b| is_sep(b))
        .map_or(vol_len, |i| vol_len + i + 1)
}

/// All but the last element of `path`, cleaned.
pub fn dir(path: &str) -> String {
    let vol = volume_name(path);
    let end = last_separator_end(path);
    let dir = clean(&path[vol.len()..end]);
    if dir == "." && vol.len() > 2 {
        return vol.to_string();
    }
    format!("{}{}", vol, dir)
}

/// Suffix of the last element starting at its final dot, or `""`.
pub fn ext(path: &str) -> String {
    for (i, b) in path.bytes().enumerate().rev() {
        if is_sep(b) {
            break;
        }
        if b == b'.' {
            return path[i..].to_string();
        }
    }
    String::new()
}

/// Split immediately after the final separator into `(dir, file)`.
///
/// `dir + file` always equals `path`.
pub fn split(path: &str) -> (String, String) {
    let end = last_separator_end(path);
    (path[..end].to_string(), path[end..].to_string())
}

/// Join the non-empty `parts` with the separator and clean the result.
///
/// Returns `""` when every part is empty.
pub fn join<S: AsRef<str>>(parts: &[S]) -> String {
    match parts.iter().position(|p| !p.as_ref().is_empty()) {
        Some(first) => {
            let sep = SEPARATOR.to_string();
            let joined = parts[first..]
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<&str>>()
                .join(&sep);
            clean(&joined)
        }
        None => String::new(),
    }
}

/// Replace native separators with `/`.
pub fn to_slash(path: &str) -> String {
    if SEPARATOR == '/' {
        return path.to_string();
    }
    path.replace(SEPARATOR, "/")
}

/// Replace `/` with the native separator.
pub fn from_slash(path: &str) -> String {
    if SEPARATOR == '/' {
        return path.to_string();
    }
    path.replace('/', &SEPARATOR.to_string())
}

/// Split a `PATH`-style list; the empty string yields no elements.
pub fn split_list(list: &str) -> Vec<String> {
    if list.is_empty() {
        return Vec::new();
    }
    std::env::split_paths(list)
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

fn same_word(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Plain string prefix test; case-insensitive on Windows.
pub fn has_prefix(path: &str, prefix: &str) -> bool {
    if cfg!(windows) {
        path.to_lowercase().starts_with(&prefix.to_lowercase())
    } else {
        path.starts_with(prefix)
    }
}

/// Lexical path from `base` to `target`.
///
/// Fails when exactly one of the two is rooted, when the volumes differ, or
/// when `base` climbs above a directory whose name cannot be known without
/// consulting the working directory.
pub fn rel(base: &str, target: &str) -> Result<String, crate::FsError> {
    let fail = || crate::FsError::Rel {
        base: base.to_string(),
        target: target.to_string(),
    };

    let base_vol = volume_name(base);
    let targ_vol = volume_name(target);
    let base_clean = clean(base);
    let targ_clean = clean(target);
    if same_word(&targ_clean, &base_clean) {
        return Ok(".".to_string());
    }

    let mut b = &base_clean[base_vol.len()..];
    let t = &targ_clean[targ_vol.len()..];
    if b == "." {
        b = "";
    }

    let sep = SEPARATOR as u8;
    let base_rooted = b.as_bytes().first() == Some(&sep);
    let targ_rooted = t.as_bytes().first() == Some(&sep);
    if base_rooted != targ_rooted || !same_word(base_vol, targ_vol) {
        return Err(fail());
    }

    let (bb, tb) = (b.as_bytes(), t.as_bytes());
    let (bl, tl) = (bb.len(), tb.len());
    let (mut b0, mut bi, mut t0, mut ti) = (0, 0, 0, 0);
    loop {
        while bi < bl && bb[bi] != sep {
            bi += 1;
        }
        while ti < tl && tb[ti] != sep {
            ti += 1;
        }
        if !same_word(&t[t0..ti], &b[b0..bi]) {
            break;
        }
        if bi < bl {
            bi += 1;
        }
        if ti < tl {
            ti += 1;
        }
        b0 = bi;
        t0 = ti;
    }

    if &b[b0..bi] == ".." {
        return Err(fail());
    }

    if b0 != bl {
        let seps = bb[b0..].iter().filter(|&&c| c == sep).count();
        let mut out = String::from("..");
        for _ in 0..seps {
            out.push(SEPARATOR);
            out.push_str("..");
        }
        if t0 != tl {
            out.push(SEPARATOR);
            out.push_str(&t[t0..]);
        }
        return Ok(out);
    }
    Ok(t[t0..].to_string())
}
