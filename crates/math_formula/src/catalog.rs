// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator catalog: the scalar and vector operator tables.
//!
//! Every operator is reachable through one or more aliases. Both tables are
//! merged into a single alias index when the catalog is built, and an alias
//! that shows up twice is rejected at that point rather than resolved on
//! every lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Which operator table and argument binding rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Float math node
    Scalar,
    /// Vector math node
    Vector,
}

/// Restricts a lookup to one of the operator tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainHint {
    /// Scalar table only
    Scalar,
    /// Vector table only
    Vector,
    /// Either table, scalar first
    Either,
}

impl DomainHint {
    fn admits(self, domain: Domain) -> bool {
        match self {
            Self::Scalar => domain == Domain::Scalar,
            Self::Vector => domain == Domain::Vector,
            Self::Either => true,
        }
    }
}

/// Operations of the attribute math node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    MultiplyAdd,
    Sine,
    Cosine,
    Tangent,
    Arcsine,
    Arccosine,
    Arctangent,
    Arctan2,
    Sinh,
    Cosh,
    Tanh,
    Power,
    Logarithm,
    Sqrt,
    InverseSqrt,
    Exponent,
    Minimum,
    Maximum,
    LessThan,
    GreaterThan,
    Sign,
    Compare,
    SmoothMin,
    SmoothMax,
    Fract,
    Modulo,
    Snap,
    Wrap,
    Pingpong,
    Absolute,
    Round,
    Floor,
    Ceil,
    Truncate,
    Radians,
    Degrees,
}

impl MathOperation {
    /// Canonical identifier, as the node editor spells it
    pub fn id(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::MultiplyAdd => "MULTIPLY_ADD",
            Self::Sine => "SINE",
            Self::Cosine => "COSINE",
            Self::Tangent => "TANGENT",
            Self::Arcsine => "ARCSINE",
            Self::Arccosine => "ARCCOSINE",
            Self::Arctangent => "ARCTANGENT",
            Self::Arctan2 => "ARCTAN2",
            Self::Sinh => "SINH",
            Self::Cosh => "COSH",
            Self::Tanh => "TANH",
            Self::Power => "POWER",
            Self::Logarithm => "LOGARITHM",
            Self::Sqrt => "SQRT",
            Self::InverseSqrt => "INVERSE_SQRT",
            Self::Exponent => "EXPONENT",
            Self::Minimum => "MINIMUM",
            Self::Maximum => "MAXIMUM",
            Self::LessThan => "LESS_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::Sign => "SIGN",
            Self::Compare => "COMPARE",
            Self::SmoothMin => "SMOOTH_MIN",
            Self::SmoothMax => "SMOOTH_MAX",
            Self::Fract => "FRACT",
            Self::Modulo => "MODULO",
            Self::Snap => "SNAP",
            Self::Wrap => "WRAP",
            Self::Pingpong => "PINGPONG",
            Self::Absolute => "ABSOLUTE",
            Self::Round => "ROUND",
            Self::Floor => "FLOOR",
            Self::Ceil => "CEIL",
            Self::Truncate => "TRUNCATE",
            Self::Radians => "RADIANS",
            Self::Degrees => "DEGREES",
        }
    }
}

/// Operations of the attribute vector math node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum VectorOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    CrossProduct,
    Project,
    Reflect,
    Snap,
    Modulo,
    Minimum,
    Maximum,
    DotProduct,
    Distance,
    Length,
    Scale,
    Normalize,
    Floor,
    Ceil,
    Fract,
    Absolute,
    Sine,
    Cosine,
    Tangent,
    Wrap,
}

impl VectorOperation {
    /// Canonical identifier, as the node editor spells it
    pub fn id(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::CrossProduct => "CROSS_PRODUCT",
            Self::Project => "PROJECT",
            Self::Reflect => "REFLECT",
            Self::Snap => "SNAP",
            Self::Modulo => "MODULO",
            Self::Minimum => "MINIMUM",
            Self::Maximum => "MAXIMUM",
            Self::DotProduct => "DOT_PRODUCT",
            Self::Distance => "DISTANCE",
            Self::Length => "LENGTH",
            Self::Scale => "SCALE",
            Self::Normalize => "NORMALIZE",
            Self::Floor => "FLOOR",
            Self::Ceil => "CEIL",
            Self::Fract => "FRACT",
            Self::Absolute => "ABSOLUTE",
            Self::Sine => "SINE",
            Self::Cosine => "COSINE",
            Self::Tangent => "TANGENT",
            Self::Wrap => "WRAP",
        }
    }
}

/// An operation of either node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Scalar domain operation
    Math(MathOperation),
    /// Vector domain operation
    Vector(VectorOperation),
}

impl Operation {
    /// The table this operation belongs to
    pub fn domain(self) -> Domain {
        match self {
            Self::Math(_) => Domain::Scalar,
            Self::Vector(_) => Domain::Vector,
        }
    }

    /// Canonical identifier without the domain
    pub fn id(self) -> &'static str {
        match self {
            Self::Math(op) => op.id(),
            Self::Vector(op) => op.id(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Math(op) => f.write_str(op.id()),
            Self::Vector(op) => write!(f, "VECTOR_{}", op.id()),
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    /// Spellings accepted in a formula
    pub aliases: &'static [&'static str],
    /// Operation the node is set to
    pub op: Operation,
    /// Number of operands popped off the stack
    pub arity: usize,
}

impl OperatorSpec {
    const fn math(aliases: &'static [&'static str], op: MathOperation, arity: usize) -> Self {
        Self { aliases, op: Operation::Math(op), arity }
    }

    const fn vector(aliases: &'static [&'static str], op: VectorOperation, arity: usize) -> Self {
        Self { aliases, op: Operation::Vector(op), arity }
    }

    /// Domain of the operation
    pub fn domain(&self) -> Domain {
        self.op.domain()
    }
}

/// Built-in scalar operators
pub const MATH_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::math(&["+", "add"], MathOperation::Add, 2),
    OperatorSpec::math(&["-", "sub"], MathOperation::Subtract, 2),
    OperatorSpec::math(&["*", "mult"], MathOperation::Multiply, 2),
    OperatorSpec::math(&["/", "div"], MathOperation::Divide, 2),
    OperatorSpec::math(&["*+", "mult_add"], MathOperation::MultiplyAdd, 3),
    OperatorSpec::math(&["sin", "sine"], MathOperation::Sine, 1),
    OperatorSpec::math(&["cos", "cosine"], MathOperation::Cosine, 1),
    OperatorSpec::math(&["tan", "tangent"], MathOperation::Tangent, 1),
    OperatorSpec::math(&["asin", "arcsin", "arcsine"], MathOperation::Arcsine, 1),
    OperatorSpec::math(&["acos", "arccos", "arccosine"], MathOperation::Arccosine, 1),
    OperatorSpec::math(&["atan", "arctan", "arctangent"], MathOperation::Arctangent, 1),
    OperatorSpec::math(&["atan2", "arctan2"], MathOperation::Arctan2, 2),
    OperatorSpec::math(&["sinh"], MathOperation::Sinh, 1),
    OperatorSpec::math(&["cosh"], MathOperation::Cosh, 1),
    OperatorSpec::math(&["tanh"], MathOperation::Tanh, 1),
    OperatorSpec::math(&["^", "pow", "power"], MathOperation::Power, 2),
    OperatorSpec::math(&["log", "logarithm"], MathOperation::Logarithm, 2),
    OperatorSpec::math(&["sqrt"], MathOperation::Sqrt, 1),
    OperatorSpec::math(&["1/sqrt", "inv_sqrt"], MathOperation::InverseSqrt, 1),
    OperatorSpec::math(&["e^x", "e^", "exp"], MathOperation::Exponent, 1),
    OperatorSpec::math(&["min", "minimum"], MathOperation::Minimum, 2),
    OperatorSpec::math(&["max", "maximum"], MathOperation::Maximum, 2),
    OperatorSpec::math(&["<", "less_than"], MathOperation::LessThan, 2),
    OperatorSpec::math(&[">", "greater_than"], MathOperation::GreaterThan, 2),
    OperatorSpec::math(&["sgn", "sign"], MathOperation::Sign, 1),
    OperatorSpec::math(&["==", "compare"], MathOperation::Compare, 3),
    OperatorSpec::math(&["smin", "smooth_min", "smooth_minimum"], MathOperation::SmoothMin, 3),
    OperatorSpec::math(&["smax", "smooth_max", "smooth_maximum"], MathOperation::SmoothMax, 3),
    OperatorSpec::math(&["fract"], MathOperation::Fract, 1),
    OperatorSpec::math(&["%", "mod"], MathOperation::Modulo, 2),
    OperatorSpec::math(&["snap"], MathOperation::Snap, 2),
    OperatorSpec::math(&["wrap"], MathOperation::Wrap, 3),
    OperatorSpec::math(&["pingpong", "ping_pong"], MathOperation::Pingpong, 2),
    OperatorSpec::math(&["abs", "absolute"], MathOperation::Absolute, 1),
    OperatorSpec::math(&["round"], MathOperation::Round, 1),
    OperatorSpec::math(&["floor"], MathOperation::Floor, 1),
    OperatorSpec::math(&["ceil"], MathOperation::Ceil, 1),
    OperatorSpec::math(&["trunc", "truncate"], MathOperation::Truncate, 1),
    OperatorSpec::math(&["rad", "to_rad", "to_radians", "radians"], MathOperation::Radians, 1),
    OperatorSpec::math(&["deg", "to_deg", "to_degrees", "degrees"], MathOperation::Degrees, 1),
];

/// Built-in vector operators
pub const VECTOR_OPERATORS: &[OperatorSpec] = &[
    OperatorSpec::vector(&["v+", "vadd"], VectorOperation::Add, 2),
    OperatorSpec::vector(&["v-", "vsub"], VectorOperation::Subtract, 2),
    OperatorSpec::vector(&["v*", "vmult"], VectorOperation::Multiply, 2),
    OperatorSpec::vector(&["v/", "vdiv"], VectorOperation::Divide, 2),
    OperatorSpec::vector(&["cross", "cross_product"], VectorOperation::CrossProduct, 2),
    OperatorSpec::vector(&["project"], VectorOperation::Project, 2),
    OperatorSpec::vector(&["reflect"], VectorOperation::Reflect, 2),
    OperatorSpec::vector(&["vsnap"], VectorOperation::Snap, 2),
    // "mod" belongs to the scalar table
    OperatorSpec::vector(&["v%", "vmod"], VectorOperation::Modulo, 2),
    OperatorSpec::vector(&["vmin", "vminimum"], VectorOperation::Minimum, 2),
    OperatorSpec::vector(&["vmax", "vmaximum"], VectorOperation::Maximum, 2),
    OperatorSpec::vector(&["dot", "dot_product"], VectorOperation::DotProduct, 2),
    OperatorSpec::vector(&["dist", "distance"], VectorOperation::Distance, 2),
    OperatorSpec::vector(&["length"], VectorOperation::Length, 1),
    OperatorSpec::vector(&["scale"], VectorOperation::Scale, 2),
    OperatorSpec::vector(&["normalize"], VectorOperation::Normalize, 1),
    OperatorSpec::vector(&["vfloor"], VectorOperation::Floor, 1),
    OperatorSpec::vector(&["vceil"], VectorOperation::Ceil, 1),
    OperatorSpec::vector(&["vfract"], VectorOperation::Fract, 1),
    OperatorSpec::vector(&["vabs", "vabsolute"], VectorOperation::Absolute, 1),
    OperatorSpec::vector(&["vsin", "vsine"], VectorOperation::Sine, 1),
    OperatorSpec::vector(&["vcos", "vcosine"], VectorOperation::Cosine, 1),
    OperatorSpec::vector(&["vtan", "vtangent"], VectorOperation::Tangent, 1),
    OperatorSpec::vector(&["vwrap"], VectorOperation::Wrap, 3),
];

/// Error when building a catalog from operator tables
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The same alias names two operators
    #[error("alias `{alias}` is used by both {first} and {second}")]
    DuplicateAlias {
        /// The offending alias
        alias: &'static str,
        /// Operator registered first
        first: Operation,
        /// Operator that tried to reuse the alias
        second: Operation,
    },

    /// An entry was placed in the table of the other domain
    #[error("{op} is listed in the {table:?} table")]
    WrongTable {
        /// Misplaced operation
        op: Operation,
        /// Table it was found in
        table: Domain,
    },

    /// Arity outside `1..=3`
    #[error("{op} declares {arity} arguments, node inputs allow 1 to 3")]
    InvalidArity {
        /// Operation with the bad arity
        op: Operation,
        /// Declared arity
        arity: usize,
    },

    /// Operator without any alias
    #[error("{0} has no aliases")]
    NoAliases(Operation),
}

/// Alias index over the scalar and vector operator tables
#[derive(Debug, Clone)]
pub struct OperatorCatalog {
    specs: Vec<OperatorSpec>,
    by_alias: IndexMap<&'static str, usize>,
}

impl OperatorCatalog {
    /// Build a catalog, rejecting misplaced entries and alias collisions
    pub fn from_tables(
        scalar: &[OperatorSpec],
        vector: &[OperatorSpec],
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            specs: Vec::with_capacity(scalar.len() + vector.len()),
            by_alias: IndexMap::new(),
        };

        // Scalar first so its aliases are the ones already present on collision
        for (table, domain) in [(scalar, Domain::Scalar), (vector, Domain::Vector)] {
            for spec in table {
                catalog.insert(*spec, domain)?;
            }
        }

        Ok(catalog)
    }

    fn insert(&mut self, spec: OperatorSpec, table: Domain) -> Result<(), CatalogError> {
        if spec.domain() != table {
            return Err(CatalogError::WrongTable { op: spec.op, table });
        }
        if !(1..=3).contains(&spec.arity) {
            return Err(CatalogError::InvalidArity { op: spec.op, arity: spec.arity });
        }
        if spec.aliases.is_empty() {
            return Err(CatalogError::NoAliases(spec.op));
        }

        let index = self.specs.len();
        for &alias in spec.aliases {
            if let Some(&existing) = self.by_alias.get(alias) {
                return Err(CatalogError::DuplicateAlias {
                    alias,
                    first: self.specs[existing].op,
                    second: spec.op,
                });
            }
            self.by_alias.insert(alias, index);
        }
        self.specs.push(spec);
        Ok(())
    }

    /// The catalog of built-in operators, built on first use
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<OperatorCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::from_tables(MATH_OPERATORS, VECTOR_OPERATORS)
                .unwrap_or_else(|err| panic!("built-in operator tables are inconsistent: {err}"))
        })
    }

    /// Exact, case-sensitive alias lookup
    pub fn lookup(&self, alias: &str, hint: DomainHint) -> Option<&OperatorSpec> {
        let spec = self.by_alias.get(alias).map(|&index| &self.specs[index])?;
        hint.admits(spec.domain()).then_some(spec)
    }

    /// All operators, scalar table first
    pub fn specs(&self) -> impl Iterator<Item = &OperatorSpec> {
        self.specs.iter()
    }

    /// All known aliases in registration order
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_alias.keys().copied()
    }

    /// Number of operators
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog holds no operators
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_disjoint() {
        let catalog = OperatorCatalog::builtin();
        assert_eq!(catalog.len(), MATH_OPERATORS.len() + VECTOR_OPERATORS.len());

        let alias_count: usize = catalog.specs().map(|s| s.aliases.len()).sum();
        assert_eq!(catalog.aliases().count(), alias_count);
    }

    #[test]
    fn test_every_alias_resolves_to_its_operator() {
        let catalog = OperatorCatalog::builtin();
        for spec in MATH_OPERATORS.iter().chain(VECTOR_OPERATORS) {
            for alias in spec.aliases {
                let found = catalog.lookup(alias, DomainHint::Either).unwrap();
                assert_eq!(found.op, spec.op, "alias {alias}");
                assert!(found.aliases.contains(alias));
            }
        }
    }

    #[test]
    fn test_domain_hint_filters_tables() {
        let catalog = OperatorCatalog::builtin();

        assert!(catalog.lookup("*", DomainHint::Scalar).is_some());
        assert!(catalog.lookup("*", DomainHint::Vector).is_none());
        assert!(catalog.lookup("cross", DomainHint::Scalar).is_none());

        let scale = catalog.lookup("scale", DomainHint::Vector).unwrap();
        assert_eq!(scale.op, Operation::Vector(VectorOperation::Scale));
        assert_eq!(scale.arity, 2);
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = OperatorCatalog::builtin();
        assert!(catalog.lookup("ADD", DomainHint::Either).is_none());
        assert!(catalog.lookup("ad", DomainHint::Either).is_none());
        assert!(catalog.lookup("add ", DomainHint::Either).is_none());

        let modulo = catalog.lookup("mod", DomainHint::Either).unwrap();
        assert_eq!(modulo.op, Operation::Math(MathOperation::Modulo));
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let scalar = [OperatorSpec::math(&["%", "mod"], MathOperation::Modulo, 2)];
        let vector = [OperatorSpec::vector(&["v%", "mod"], VectorOperation::Modulo, 2)];

        let err = OperatorCatalog::from_tables(&scalar, &vector).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateAlias {
                alias: "mod",
                first: Operation::Math(MathOperation::Modulo),
                second: Operation::Vector(VectorOperation::Modulo),
            }
        );
    }

    #[test]
    fn test_malformed_tables_are_rejected() {
        let misplaced = [OperatorSpec::vector(&["length"], VectorOperation::Length, 1)];
        assert!(matches!(
            OperatorCatalog::from_tables(&misplaced, &[]),
            Err(CatalogError::WrongTable { table: Domain::Scalar, .. })
        ));

        let too_many = [OperatorSpec::math(&["lerp"], MathOperation::MultiplyAdd, 4)];
        assert!(matches!(
            OperatorCatalog::from_tables(&too_many, &[]),
            Err(CatalogError::InvalidArity { arity: 4, .. })
        ));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Math(MathOperation::MultiplyAdd).to_string(), "MULTIPLY_ADD");
        assert_eq!(Operation::Vector(VectorOperation::Add).to_string(), "VECTOR_ADD");
        assert_eq!(Operation::Vector(VectorOperation::Add).id(), "ADD");
    }
}
