//! Integration tests for GLSL emission

#![allow(clippy::unwrap_used)]

use carve_lang::{Backend, Compiler, check_source, compile_to_shader, glsl, lower};

const PROGRAMS: &[&str] = &[
    "sphere(1)",
    "union(sphere(1), translate(sphere(1), vec3(3, 0, 0)))",
    "subtract(box(vec3(1, 1, 1)), rotate(cylinder(0.5, 2), vec3(90, 0, 0)))",
    "intersect(sphere(1), sphere(2), offset(box(vec3(1, 1, 1)), -0.1))",
    "scale(difference(sphere(1), translate(sphere(0.5), x_axis * pi / 4)), 2)",
];

/// The `sdf` function, without the helper library in front of it
fn sdf_function(shader: &str) -> &str {
    let start = shader.find("float sdf(vec3 p)").unwrap();
    &shader[start..]
}

fn assert_well_formed(shader: &str) {
    let mut depth: i64 = 0;
    for c in shader.chars() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0, "unbalanced delimiters:\n{}", shader);
    }
    assert_eq!(depth, 0, "unbalanced delimiters:\n{}", shader);
    assert_eq!(shader.matches("float sdf(vec3 p)").count(), 1);
    assert!(shader.starts_with(carve_math::glsl_library()));

    let function = sdf_function(shader);
    assert_eq!(function.matches("return ").count(), 1, "{}", function);
    assert!(function.trim_end().ends_with('}'));
}

#[test]
fn both_emitters_are_well_formed() {
    for src in PROGRAMS {
        for backend in [Backend::Ast, Backend::Ir] {
            let shader = Compiler::new(backend).shader(src).unwrap();
            assert_well_formed(&shader);
        }
    }
}

#[test]
fn default_shader_uses_ir() {
    let src = PROGRAMS[1];
    let program = check_source(src).unwrap();
    assert_eq!(compile_to_shader(src).unwrap(), glsl::ir::emit(&lower(&program)));
}

#[test]
fn emitters_reference_helper_functions() {
    let src = PROGRAMS[2];
    for backend in [Backend::Ast, Backend::Ir] {
        let shader = Compiler::new(backend).shader(src).unwrap();
        let function = sdf_function(&shader);
        assert!(function.contains("sd_box("));
        assert!(function.contains("sd_cylinder("));
        assert!(function.contains("op_rotate("));
    }
}

#[test]
fn ir_output_is_linear_in_nesting() {
    // each level repeats the transformed point in the AST output
    fn nested(depth: usize) -> String {
        let mut src = "sphere(1)".to_string();
        for _ in 0..depth {
            src = format!("translate(union({}, sphere(0.5)), x_axis)", src);
        }
        src
    }
    let size = |backend: Backend, depth: usize| {
        let shader = Compiler::new(backend).shader(&nested(depth)).unwrap();
        sdf_function(&shader).len() as f64
    };

    let ast_ratio = size(Backend::Ast, 40) / size(Backend::Ast, 20);
    let ir_ratio = size(Backend::Ir, 40) / size(Backend::Ir, 20);
    assert!(ast_ratio > 3.0, "ast ratio {}", ast_ratio);
    assert!(ir_ratio < 2.5, "ir ratio {}", ir_ratio);
}

#[test]
fn ir_shader_declares_every_slot_once() {
    let program = lower(&check_source(PROGRAMS[4]).unwrap());
    let shader = glsl::ir::emit(&program);
    for (id, inst) in program.iter() {
        let declaration = format!("{} v{} = ", inst.ty.glsl_name(), id.0);
        assert_eq!(shader.matches(&declaration).count(), 1, "{}", declaration);
    }
}
