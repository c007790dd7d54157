// Thu Feb 12 2026 - Alex

/// Heuristic equivalence between two C++ signature spellings.
///
/// A demangled linker name (`Print::write(unsigned char const*, unsigned
/// int)`) and a gcc stack-usage signature (`virtual size_t Print::write(const
/// uint8_t*, size_t)`) describe the same symbol with different type
/// spellings. Both are reduced to a canonical structural form and compared.
/// This is not a type-system check: templates with spaced arguments and
/// operator overloads are not handled.
pub fn display_names_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    canonical_signature(a) == canonical_signature(b)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSignature {
    pub name: String,
    pub params: Option<Vec<String>>,
    pub trailing_const: bool,
}

pub fn canonical_signature(text: &str) -> CanonicalSignature {
    let text = text.trim();

    let Some(open) = text.find('(') else {
        return CanonicalSignature {
            name: text.to_string(),
            params: None,
            trailing_const: false,
        };
    };
    let Some(close) = matching_paren(text, open) else {
        return CanonicalSignature {
            name: text.to_string(),
            params: None,
            trailing_const: false,
        };
    };

    // `virtual`, `static` and the return type all live left of the
    // scope::name token and are irrelevant to identity
    let name = text[..open]
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(['*', '&'])
        .to_string();

    let params = split_parameters(&text[open + 1..close])
        .into_iter()
        .map(|p| canonical_type(p))
        .collect();

    let trailing_const = text[close + 1..]
        .split_whitespace()
        .any(|tok| tok == "const");

    CanonicalSignature {
        name,
        params: Some(params),
        trailing_const,
    }
}

// `open` is a byte offset at the opening paren, so the scan starts from
// the slice rather than counting chars from the front.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_parameters(params: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '(' | '<' | '[' => depth += 1,
            ')' | '>' | ']' => depth -= 1,
            ',' if depth == 0 => {
                out.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = params[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}

/// Canonical spelling of one parameter type: `const` placement unified,
/// spacing around pointers/references dropped, and known integer spellings
/// folded onto fixed-width names for a 32-bit target. Wider or narrower
/// targets would need a different width table.
fn canonical_type(param: &str) -> String {
    let mut spaced = String::with_capacity(param.len() + 8);
    for c in param.chars() {
        match c {
            '*' | '&' => {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            }
            _ => spaced.push(c),
        }
    }

    let mut is_const = false;
    let mut base: Vec<&str> = Vec::new();
    let mut suffix = String::new();
    let mut in_suffix = false;
    for tok in spaced.split_whitespace() {
        match tok {
            "*" | "&" => {
                in_suffix = true;
                suffix.push_str(tok);
            }
            "const" | "volatile" => {
                if in_suffix {
                    suffix.push_str(tok);
                } else {
                    is_const = true;
                }
            }
            "struct" | "class" | "enum" => {}
            _ => {
                if in_suffix {
                    suffix.push_str(tok);
                } else {
                    base.push(tok);
                }
            }
        }
    }

    let mut out = String::new();
    if is_const {
        out.push_str("const ");
    }
    out.push_str(canonical_base(&base.join(" ")));
    out.push_str(&suffix);
    out
}

// 32-bit target widths: int and long are both 32 bits wide, so size_t,
// uint32_t, unsigned int and unsigned long all collapse onto one name.
fn canonical_base(base: &str) -> &str {
    match base {
        "unsigned char" | "uint8_t" | "byte" => "u8",
        "signed char" | "int8_t" => "i8",
        "unsigned short" | "unsigned short int" | "uint16_t" => "u16",
        "short" | "short int" | "int16_t" => "i16",
        "unsigned" | "unsigned int" | "unsigned long" | "unsigned long int" | "uint32_t"
        | "size_t" => "u32",
        "int" | "long" | "long int" | "int32_t" | "ssize_t" | "ptrdiff_t" => "i32",
        "unsigned long long" | "unsigned long long int" | "uint64_t" => "u64",
        "long long" | "long long int" | "int64_t" => "i64",
        other => other,
    }
}
