//! Static types of the language

use std::fmt;

use serde::Serialize;

/// The closed set of types.
///
/// `Geometry` marks an expression that describes a solid, a function from a
/// point to a distance. It has no runtime value of its own: evaluating a
/// geometry at a point yields a scalar distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Scalar,
    Vec3,
    Geometry,
}

impl Type {
    /// GLSL type of a value of this type; geometry evaluates to a `float`
    pub fn glsl_name(self) -> &'static str {
        match self {
            Type::Scalar | Type::Geometry => "float",
            Type::Vec3 => "vec3",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Scalar => "Scalar",
            Type::Vec3 => "Vec3",
            Type::Geometry => "Geometry",
        })
    }
}

/// Comma-separated list of types, e.g. `(Scalar, Vec3)`
pub(crate) fn type_list(types: &[Type]) -> String {
    let names: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("({})", names.join(", "))
}
