// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Text helpers used by the emission methods: `$N` templates and hex dumps.

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Substitute `$0` through `$9` in `template` with the matching argument.
///
/// `$$` produces a literal `$`. A placeholder whose index is beyond `args` is left as written,
/// as is a `$` followed by anything other than a digit or another `$`.
///
/// # Examples
///
/// ```
/// use logweave::format::static_format;
///
/// assert_eq!(
///     static_format("User $0 performed $1", &["alice", "login"]),
///     "User alice performed login"
/// );
/// assert_eq!(static_format::<&str>("100% off: $$", &[]), "100% off: $");
/// ```
pub fn static_format<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('$') => result.push('$'),
            Some(d @ '0'..='9') => {
                let index = (d as u8 - b'0') as usize;
                match args.get(index) {
                    Some(arg) => result.push_str(arg.as_ref()),
                    None => {
                        result.push('$');
                        result.push(d);
                    }
                }
            }
            Some(other) => {
                result.push('$');
                result.push(other);
            }
            None => result.push('$'),
        }
    }

    result
}

/// Append a canonical hex and ASCII dump of `buffer` to `message`.
///
/// Each line covers 16 bytes: a 4-digit offset, the byte values in upper-case hex with an extra
/// space after the eighth, then the bytes as ASCII where anything outside `32..=126` prints as
/// `.`. A non-empty `message` is separated from the dump by a newline.
///
/// # Examples
///
/// ```
/// use logweave::format::format_dump;
///
/// let mut text = String::new();
/// format_dump(&mut text, &[0x41, 0x42, 0x00]);
/// assert_eq!(
///     text,
///     "0000  41 42 00                                          AB."
/// );
/// ```
pub fn format_dump(message: &mut String, buffer: &[u8]) {
    message.reserve(buffer.len() * 6);
    if !message.is_empty() {
        message.push('\n');
    }

    for (index, chunk) in buffer.chunks(BYTES_PER_LINE).enumerate() {
        if index > 0 {
            message.push('\n');
        }

        // SAFETY: write to a string always succeeds
        write!(message, "{:04X}  ", index * BYTES_PER_LINE).unwrap();
        for (offset, byte) in chunk.iter().enumerate() {
            write!(message, "{byte:02X}").unwrap();
            message.push_str(if offset == 7 { "  " } else { " " });
        }
        if chunk.len() < 7 {
            message.push(' ');
        }
        for _ in chunk.len()..BYTES_PER_LINE {
            message.push_str("   ");
        }
        message.push(' ');

        for &byte in chunk {
            message.push(if (32..127).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
    }
}
