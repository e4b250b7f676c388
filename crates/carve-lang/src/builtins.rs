//! The builtin signature table
//!
//! Each builtin is one static entry holding its signature, its evaluation
//! rule and its GLSL template. The checker reads the signature, both
//! interpreters run the rule, both emitters expand the template, so adding a
//! primitive is an edit to this file only.
//!
//! ## Template placeholders
//!
//! | rule | placeholders |
//! |---|---|
//! | [`Rule::Value`] | `{0}`.. evaluated arguments |
//! | [`Rule::Shape`] | `{p}` point, `{0}`.. arguments |
//! | [`Rule::Combine`] | `{a}`, `{b}` the two distances |
//! | [`Rule::Transform`] | warp: `{p}` point, `{0}`.. arguments after the geometry; correction: `{d}` distance, `{0}`.. |

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use carve_math::{op_intersect, op_rotate, op_subtract, op_union, sd_box, sd_cylinder, sd_sphere};
use glam::Vec3;

use crate::types::Type::{Geometry, Scalar};
use crate::types::{Type, type_list};
use crate::value::Value;

/// Parameter and return types of a builtin
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub params: &'static [Type],
    /// The last parameter may repeat any number of extra times
    pub variadic: bool,
    pub ret: Type,
}

impl Signature {
    pub fn accepts(&self, args: &[Type]) -> bool {
        if args.len() < self.params.len() || (!self.variadic && args.len() > self.params.len()) {
            return false;
        }
        let repeated = self.params.last().copied();
        args.iter()
            .enumerate()
            .all(|(i, ty)| Some(*ty) == self.params.get(i).copied().or(repeated))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = type_list(self.params);
        if self.variadic {
            params.insert_str(params.len() - 1, ", ...");
        }
        write!(f, "{} -> {}", params, self.ret)
    }
}

/// How a builtin is evaluated
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// A plain value computed from evaluated arguments
    Value(fn(&[Value]) -> Value),
    /// A primitive solid: distance from the point given the evaluated arguments
    Shape(fn(Vec3, &[Value]) -> f32),
    /// A boolean of two distances, folded left across every geometry argument
    Combine(fn(f32, f32) -> f32),
    /// A spatial operator on the geometry in argument 0.
    ///
    /// The point is warped before the geometry is evaluated and the resulting
    /// distance corrected afterwards; either step may be absent. Both receive
    /// the evaluated arguments after the geometry.
    Transform {
        warp: Option<fn(Vec3, &[Value]) -> Vec3>,
        correct: Option<fn(f32, &[Value]) -> f32>,
    },
}

/// GLSL emission template, see the module docs for placeholders
#[derive(Debug, Clone, Copy)]
pub struct Glsl {
    pub template: &'static str,
    /// Distance correction of a [`Rule::Transform`]
    pub correct: Option<&'static str>,
}

impl Glsl {
    const fn expr(template: &'static str) -> Self {
        Self {
            template,
            correct: None,
        }
    }

    const fn transform(warp: &'static str, correct: Option<&'static str>) -> Self {
        Self {
            template: warp,
            correct,
        }
    }
}

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub summary: &'static str,
    pub signature: Signature,
    pub rule: Rule,
    pub glsl: Glsl,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// Rule dispatch shared by both interpreters. A rule of the wrong kind only
// shows up for unchecked input and degrades to NaN or the identity.
impl Builtin {
    pub fn value(&self, args: &[Value]) -> Value {
        match self.rule {
            Rule::Value(f) => f(args),
            _ => Value::Scalar(f32::NAN),
        }
    }

    pub fn shape(&self, p: Vec3, args: &[Value]) -> f32 {
        match self.rule {
            Rule::Shape(f) => f(p, args),
            _ => f32::NAN,
        }
    }

    pub fn combine(&self, a: f32, b: f32) -> f32 {
        match self.rule {
            Rule::Combine(f) => f(a, b),
            _ => f32::NAN,
        }
    }

    pub fn warp(&self, p: Vec3, args: &[Value]) -> Vec3 {
        match self.rule {
            Rule::Transform { warp: Some(f), .. } => f(p, args),
            _ => p,
        }
    }

    pub fn correct(&self, d: f32, args: &[Value]) -> f32 {
        match self.rule {
            Rule::Transform {
                correct: Some(f), ..
            } => f(d, args),
            _ => d,
        }
    }

    pub fn has_warp(&self) -> bool {
        matches!(self.rule, Rule::Transform { warp: Some(_), .. })
    }

    pub fn has_correction(&self) -> bool {
        matches!(
            self.rule,
            Rule::Transform {
                correct: Some(_),
                ..
            }
        )
    }
}

const fn sig(params: &'static [Type], ret: Type) -> Signature {
    Signature {
        params,
        variadic: false,
        ret,
    }
}

const fn variadic(params: &'static [Type], ret: Type) -> Signature {
    Signature {
        params,
        variadic: true,
        ret,
    }
}

// === Rules ===

fn sphere(p: Vec3, a: &[Value]) -> f32 {
    sd_sphere(p, a[0].scalar())
}

fn cuboid(p: Vec3, a: &[Value]) -> f32 {
    sd_box(p, a[0].vector())
}

fn cylinder(p: Vec3, a: &[Value]) -> f32 {
    sd_cylinder(p, a[0].scalar(), a[1].scalar())
}

fn translate(p: Vec3, a: &[Value]) -> Vec3 {
    p - a[0].vector()
}

fn rotate(p: Vec3, a: &[Value]) -> Vec3 {
    op_rotate(p, a[0].vector())
}

fn shrink(p: Vec3, a: &[Value]) -> Vec3 {
    p / a[0].scalar()
}

// A negative factor mirrors the solid; the distance still scales by |s|
fn rescale(d: f32, a: &[Value]) -> f32 {
    d * a[0].scalar().abs()
}

fn inflate(d: f32, a: &[Value]) -> f32 {
    d - a[0].scalar()
}

fn vector(a: &[Value]) -> Value {
    Value::Vec3(Vec3::new(a[0].scalar(), a[1].scalar(), a[2].scalar()))
}

fn pi(_: &[Value]) -> Value {
    Value::Scalar(std::f32::consts::PI)
}

fn x_axis(_: &[Value]) -> Value {
    Value::Vec3(Vec3::X)
}

fn y_axis(_: &[Value]) -> Value {
    Value::Vec3(Vec3::Y)
}

fn z_axis(_: &[Value]) -> Value {
    Value::Vec3(Vec3::Z)
}

// === Table ===

static SPHERE: Builtin = Builtin {
    name: "sphere",
    summary: "sphere of radius r at the origin",
    signature: sig(&[Scalar], Geometry),
    rule: Rule::Shape(sphere),
    glsl: Glsl::expr("(length({p}) - {0})"),
};

static BOX: Builtin = Builtin {
    name: "box",
    summary: "axis-aligned box with the given half extents",
    signature: sig(&[Type::Vec3], Geometry),
    rule: Rule::Shape(cuboid),
    glsl: Glsl::expr("sd_box({p}, {0})"),
};

static CYLINDER: Builtin = Builtin {
    name: "cylinder",
    summary: "Y-aligned capped cylinder from radius and half height",
    signature: sig(&[Scalar, Scalar], Geometry),
    rule: Rule::Shape(cylinder),
    glsl: Glsl::expr("sd_cylinder({p}, {0}, {1})"),
};

static UNION: Builtin = Builtin {
    name: "union",
    summary: "everything inside any of the solids",
    signature: variadic(&[Geometry, Geometry], Geometry),
    rule: Rule::Combine(op_union),
    glsl: Glsl::expr("min({a}, {b})"),
};

static INTERSECT: Builtin = Builtin {
    name: "intersect",
    summary: "everything inside all of the solids",
    signature: variadic(&[Geometry, Geometry], Geometry),
    rule: Rule::Combine(op_intersect),
    glsl: Glsl::expr("max({a}, {b})"),
};

static SUBTRACT: Builtin = Builtin {
    name: "subtract",
    summary: "the first solid with the second carved out",
    signature: sig(&[Geometry, Geometry], Geometry),
    rule: Rule::Combine(op_subtract),
    glsl: Glsl::expr("max({a}, -{b})"),
};

static DIFFERENCE: Builtin = Builtin {
    name: "difference",
    summary: "alias of subtract",
    signature: sig(&[Geometry, Geometry], Geometry),
    rule: Rule::Combine(op_subtract),
    glsl: Glsl::expr("max({a}, -{b})"),
};

static TRANSLATE: Builtin = Builtin {
    name: "translate",
    summary: "move a solid by an offset",
    signature: sig(&[Geometry, Type::Vec3], Geometry),
    rule: Rule::Transform {
        warp: Some(translate),
        correct: None,
    },
    glsl: Glsl::transform("({p} - {0})", None),
};

static ROTATE: Builtin = Builtin {
    name: "rotate",
    summary: "rotate a solid by XYZ Euler angles in degrees",
    signature: sig(&[Geometry, Type::Vec3], Geometry),
    rule: Rule::Transform {
        warp: Some(rotate),
        correct: None,
    },
    glsl: Glsl::transform("op_rotate({p}, {0})", None),
};

static SCALE: Builtin = Builtin {
    name: "scale",
    summary: "uniformly scale a solid about the origin, mirroring it when negative",
    signature: sig(&[Geometry, Scalar], Geometry),
    rule: Rule::Transform {
        warp: Some(shrink),
        correct: Some(rescale),
    },
    glsl: Glsl::transform("({p} / {0})", Some("({d} * abs({0}))")),
};

static OFFSET: Builtin = Builtin {
    name: "offset",
    summary: "grow (or with a negative amount, shrink) a solid's surface",
    signature: sig(&[Geometry, Scalar], Geometry),
    rule: Rule::Transform {
        warp: None,
        correct: Some(inflate),
    },
    glsl: Glsl::transform("{p}", Some("({d} - {0})")),
};

static VEC3: Builtin = Builtin {
    name: "vec3",
    summary: "vector from three components",
    signature: sig(&[Scalar, Scalar, Scalar], Type::Vec3),
    rule: Rule::Value(vector),
    glsl: Glsl::expr("vec3({0}, {1}, {2})"),
};

static PI: Builtin = Builtin {
    name: "pi",
    summary: "the constant π",
    signature: sig(&[], Scalar),
    rule: Rule::Value(pi),
    glsl: Glsl::expr("3.14159265"),
};

static X_AXIS: Builtin = Builtin {
    name: "x_axis",
    summary: "unit vector along X",
    signature: sig(&[], Type::Vec3),
    rule: Rule::Value(x_axis),
    glsl: Glsl::expr("vec3(1.0, 0.0, 0.0)"),
};

static Y_AXIS: Builtin = Builtin {
    name: "y_axis",
    summary: "unit vector along Y",
    signature: sig(&[], Type::Vec3),
    rule: Rule::Value(y_axis),
    glsl: Glsl::expr("vec3(0.0, 1.0, 0.0)"),
};

static Z_AXIS: Builtin = Builtin {
    name: "z_axis",
    summary: "unit vector along Z",
    signature: sig(&[], Type::Vec3),
    rule: Rule::Value(z_axis),
    glsl: Glsl::expr("vec3(0.0, 0.0, 1.0)"),
};

static CATALOG: [&Builtin; 16] = [
    &SPHERE,
    &BOX,
    &CYLINDER,
    &UNION,
    &INTERSECT,
    &SUBTRACT,
    &DIFFERENCE,
    &TRANSLATE,
    &ROTATE,
    &SCALE,
    &OFFSET,
    &VEC3,
    &PI,
    &X_AXIS,
    &Y_AXIS,
    &Z_AXIS,
];

static INDEX: LazyLock<HashMap<&'static str, &'static Builtin>> =
    LazyLock::new(|| CATALOG.iter().map(|b| (b.name, *b)).collect());

/// Look up a builtin by name
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    INDEX.get(name).copied()
}

/// Every builtin, in catalog order
pub fn all() -> &'static [&'static Builtin] {
    &CATALOG
}

/// The constructor behind `vec3(x, y, z)` literals
pub fn vec3() -> &'static Builtin {
    &VEC3
}

/// Look up a name the checker has already resolved
pub(crate) fn resolved(name: &str) -> &'static Builtin {
    match lookup(name) {
        Some(builtin) => builtin,
        None => unreachable!("checked program calls unknown builtin '{}'", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Placeholder names used in a template
    fn placeholders(template: &str) -> Vec<&str> {
        template
            .split('{')
            .skip(1)
            .filter_map(|rest| rest.split_once('}').map(|(key, _)| key))
            .collect()
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("sphere").map(|b| b.name), Some("sphere"));
        assert!(lookup("foo").is_none());
        assert_eq!(all().len(), INDEX.len(), "builtin names must be unique");
    }

    #[test]
    fn test_signature_accepts() {
        let union = &UNION.signature;
        assert!(union.accepts(&[Geometry, Geometry]));
        assert!(union.accepts(&[Geometry, Geometry, Geometry, Geometry]));
        assert!(!union.accepts(&[Geometry]));
        assert!(!union.accepts(&[Geometry, Scalar]));

        let sphere = &SPHERE.signature;
        assert!(sphere.accepts(&[Scalar]));
        assert!(!sphere.accepts(&[Scalar, Scalar]));
        assert!(!sphere.accepts(&[]));

        assert!(PI.signature.accepts(&[]));
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(SPHERE.signature.to_string(), "(Scalar) -> Geometry");
        assert_eq!(
            UNION.signature.to_string(),
            "(Geometry, Geometry, ...) -> Geometry"
        );
        assert_eq!(PI.signature.to_string(), "() -> Scalar");
    }

    #[test]
    fn test_rules_match_signatures() {
        for b in all() {
            let params = b.signature.params;
            match b.rule {
                Rule::Value(_) => {
                    assert_ne!(b.signature.ret, Geometry, "{}", b.name);
                    assert!(!params.contains(&Geometry), "{}", b.name);
                }
                Rule::Shape(_) => {
                    assert_eq!(b.signature.ret, Geometry, "{}", b.name);
                    assert!(!params.contains(&Geometry), "{}", b.name);
                }
                Rule::Combine(_) => {
                    assert!(params.iter().all(|t| *t == Geometry), "{}", b.name);
                    assert_eq!(params.len(), 2, "{}", b.name);
                }
                Rule::Transform { correct, .. } => {
                    assert_eq!(params.first(), Some(&Geometry), "{}", b.name);
                    assert!(!params[1..].contains(&Geometry), "{}", b.name);
                    assert_eq!(correct.is_some(), b.glsl.correct.is_some(), "{}", b.name);
                }
            }
        }
    }

    #[test]
    fn test_templates_use_known_placeholders() {
        for b in all() {
            let params = b.signature.params;
            let (allowed, arg_count): (&[&str], usize) = match b.rule {
                Rule::Value(_) => (&[], params.len()),
                Rule::Shape(_) => (&["p"], params.len()),
                Rule::Combine(_) => (&["a", "b"], 0),
                Rule::Transform { .. } => (&["p"], params.len() - 1),
            };
            for key in placeholders(b.glsl.template) {
                let known = allowed.contains(&key)
                    || key.parse::<usize>().is_ok_and(|i| i < arg_count);
                assert!(known, "{}: unknown placeholder {{{}}}", b.name, key);
            }
            if let Some(correct) = b.glsl.correct {
                for key in placeholders(correct) {
                    let known =
                        key == "d" || key.parse::<usize>().is_ok_and(|i| i < arg_count);
                    assert!(known, "{}: unknown placeholder {{{}}}", b.name, key);
                }
            }
        }
    }

    #[test]
    fn test_transform_dispatch() {
        let two = [Value::Scalar(2.0)];
        assert_eq!(SCALE.warp(Vec3::new(4.0, 0.0, 0.0), &two), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(SCALE.correct(-1.0, &two), -2.0);
        assert!(SCALE.has_warp() && SCALE.has_correction());
        assert_eq!(SCALE.correct(-1.0, &[Value::Scalar(-2.0)]), -2.0);

        // offset leaves the point alone, translate leaves the distance alone
        assert!(!OFFSET.has_warp());
        assert_eq!(OFFSET.warp(Vec3::ONE, &two), Vec3::ONE);
        assert!(!TRANSLATE.has_correction());
        assert_eq!(TRANSLATE.correct(0.25, &[Value::Vec3(Vec3::X)]), 0.25);
    }

    #[test]
    fn test_mismatched_dispatch_is_nan() {
        assert!(UNION.shape(Vec3::ZERO, &[]).is_nan());
        assert!(SPHERE.combine(1.0, 2.0).is_nan());
        assert!(SPHERE.value(&[]).scalar().is_nan());
    }

    #[test]
    fn test_vector_rule() {
        let Rule::Value(rule) = vec3().rule else {
            panic!("vec3 must be a value builtin");
        };
        let v = rule(&[Value::Scalar(1.0), Value::Scalar(2.0), Value::Scalar(3.0)]);
        assert_eq!(v, Value::Vec3(Vec3::new(1.0, 2.0, 3.0)));
    }
}
