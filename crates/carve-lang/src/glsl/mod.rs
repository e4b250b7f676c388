//! GLSL shader generation
//!
//! Both emitters produce the same layout: the helper library from
//! [`carve_math::glsl_library`] followed by
//!
//! ```glsl
//! float sdf(vec3 p) {
//!     ...
//! }
//! ```
//!
//! [`ast::emit`] builds one nested expression, so every shape repeats the
//! full transformed point and output grows with the square of nesting depth.
//! [`ir::emit`] writes one statement per IR instruction and stays linear.
//!
//! GLSL leaves NaN handling in `min`/`max` to the implementation, so programs
//! that produce NaN may shade differently from the CPU interpreters.

pub mod ast;
pub mod ir;

/// Expand `{name}` and `{index}` placeholders in a builtin template.
///
/// Unknown placeholders are kept verbatim.
pub(crate) fn render(template: &str, named: &[(&str, &str)], args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        let replacement = key
            .parse::<usize>()
            .ok()
            .and_then(|i| args.get(i))
            .map(String::as_str)
            .or_else(|| named.iter().find(|(name, _)| *name == key).map(|(_, value)| *value));
        match replacement {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// A GLSL float literal. Non-finite values become constant divisions.
pub(crate) fn float_literal(n: f32) -> String {
    if n.is_nan() {
        "(0.0 / 0.0)".to_string()
    } else if n == f32::INFINITY {
        "(1.0 / 0.0)".to_string()
    } else if n == f32::NEG_INFINITY {
        "(-1.0 / 0.0)".to_string()
    } else if n.is_sign_negative() {
        format!("({:?})", n)
    } else {
        format!("{:?}", n)
    }
}

/// Wrap the body of `sdf` with the signature and the helper library
pub(crate) fn shader(body: &str) -> String {
    let library = carve_math::glsl_library();
    let mut out = String::with_capacity(library.len() + body.len() + 32);
    out.push_str(library);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\nfloat sdf(vec3 p) {\n");
    out.push_str(body);
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let args = vec!["r".to_string()];
        assert_eq!(render("(length({p}) - {0})", &[("p", "q")], &args), "(length(q) - r)");
        assert_eq!(render("min({a}, {b})", &[("a", "v1"), ("b", "v2")], &[]), "min(v1, v2)");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        assert_eq!(render("f({x}, {3})", &[], &[]), "f({x}, {3})");
        assert_eq!(render("open {p", &[("p", "q")], &[]), "open {p");
        assert_eq!(render("3.14159265", &[], &[]), "3.14159265");
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(-2.0), "(-2.0)");
        assert_eq!(float_literal(f32::INFINITY), "(1.0 / 0.0)");
        assert_eq!(float_literal(f32::NEG_INFINITY), "(-1.0 / 0.0)");
        assert_eq!(float_literal(f32::NAN), "(0.0 / 0.0)");
    }

    #[test]
    fn test_shader_wrapper() {
        let src = shader("    return 1.0;\n");
        assert!(src.starts_with(carve_math::glsl_library()));
        assert!(src.ends_with("float sdf(vec3 p) {\n    return 1.0;\n}\n"));
    }
}
