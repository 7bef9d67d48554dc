//! Structural type descriptions.
//!
//! A [`TypeDesc`] is an immutable, recursive description of a type's shape.
//! Named types are referenced by [`QualifiedName`] and looked up lazily
//! through a [`crate::TypeResolver`], so repeated references to the same
//! named type share one resolved definition.

use std::fmt;

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasicKind {
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
    /// Platform sized signed integer.
    Int,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer (also `rune`).
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Platform sized unsigned integer.
    Uint,
    /// Unsigned 8-bit integer (also `byte`).
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Pointer sized unsigned integer.
    Uintptr,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
}

impl BasicKind {
    /// Returns the source-level name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parses a kind from its source-level name, accepting the `byte` and
    /// `rune` aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "int8" => Some(Self::Int8),
            "int16" => Some(Self::Int16),
            "int32" | "rune" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "uint" => Some(Self::Uint),
            "uint8" | "byte" => Some(Self::Uint8),
            "uint16" => Some(Self::Uint16),
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "uintptr" => Some(Self::Uintptr),
            "float32" => Some(Self::Float32),
            "float64" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Returns the class used to pick a scalar-specific template.
    #[must_use]
    pub const fn scalar_class(&self) -> ScalarClass {
        match self {
            Self::Bool => ScalarClass::Bool,
            Self::String => ScalarClass::String,
            Self::Int64 => ScalarClass::Int64,
            _ => ScalarClass::Other,
        }
    }

    /// Returns the literal for the zero value of the kind.
    #[must_use]
    pub const fn zero_literal(&self) -> &'static str {
        match self {
            Self::Bool => "false",
            Self::String => "\"\"",
            _ => "0",
        }
    }

    /// Returns true for integer and floating point kinds.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(self, Self::Bool | Self::String)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar classes that have dedicated pointer helpers in generated code.
///
/// Every kind without a helper of its own maps to [`ScalarClass::Other`],
/// which templates render with a direct comparison or assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarClass {
    /// `bool`.
    Bool,
    /// `string`.
    String,
    /// `int64`.
    Int64,
    /// Any other basic kind.
    Other,
}

/// Fully qualified reference to a named type: package path plus type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Package path, e.g. `github.com/acme/apis/storage/v1alpha1`.
    pub package: String,
    /// Type name inside the package.
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Splits a combined `path/to/pkg.Name` string.
    ///
    /// The separator is the last `.` after the last `/`, so dotted hosts in
    /// the package path are kept intact.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let tail_start = path.rfind('/').map_or(0, |idx| idx + 1);
        let dot = tail_start + path[tail_start..].rfind('.')?;
        let (package, name) = (&path[..dot], &path[dot + 1..]);
        if package.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(package, name))
    }

    /// Returns the last segment of the package path.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.package.rsplit('/').next().unwrap_or(&self.package)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Structural type description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    /// Built-in scalar.
    Basic(BasicKind),
    /// Pointer to the element type.
    Pointer(Box<TypeDesc>),
    /// Variable length sequence of the element type.
    Slice(Box<TypeDesc>),
    /// Associative map.
    Map {
        /// Key type.
        key: Box<TypeDesc>,
        /// Value type.
        elem: Box<TypeDesc>,
    },
    /// Record with ordered fields.
    Struct(StructDesc),
    /// Reference to a named type, resolved on demand.
    Named(QualifiedName),
}

impl TypeDesc {
    /// Creates a pointer to `elem`.
    #[must_use]
    pub fn pointer(elem: TypeDesc) -> Self {
        Self::Pointer(Box::new(elem))
    }

    /// Creates a slice of `elem`.
    #[must_use]
    pub fn slice(elem: TypeDesc) -> Self {
        Self::Slice(Box::new(elem))
    }

    /// Creates a map from `key` to `elem`.
    #[must_use]
    pub fn map(key: TypeDesc, elem: TypeDesc) -> Self {
        Self::Map {
            key: Box::new(key),
            elem: Box::new(elem),
        }
    }

    /// Creates a reference to a named type.
    #[must_use]
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(QualifiedName::new(package, name))
    }

    /// Returns a short name for the shape, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::Pointer(_) => "pointer",
            Self::Slice(_) => "slice",
            Self::Map { .. } => "map",
            Self::Struct(_) => "struct",
            Self::Named(_) => "named",
        }
    }

    /// Returns true when the zero value of the type is `nil`.
    #[must_use]
    pub const fn is_nilable(&self) -> bool {
        matches!(self, Self::Pointer(_) | Self::Slice(_) | Self::Map { .. })
    }

    /// Returns the struct description if the type is a literal struct.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructDesc> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Calls `f` for every named type referenced anywhere inside the type.
    pub fn for_each_named<F>(&self, f: &mut F)
    where
        F: FnMut(&QualifiedName),
    {
        match self {
            Self::Basic(_) => {}
            Self::Pointer(elem) | Self::Slice(elem) => elem.for_each_named(f),
            Self::Map { key, elem } => {
                key.for_each_named(f);
                elem.for_each_named(f);
            }
            Self::Struct(s) => {
                for field in &s.fields {
                    field.ty.for_each_named(f);
                }
            }
            Self::Named(name) => f(name),
        }
    }
}

/// Struct description with fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructDesc {
    /// Fields, unique by name.
    pub fields: Vec<Field>,
}

impl StructDesc {
    /// Creates an empty struct description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field unless one with the same name already exists.
    ///
    /// Returns false when the field was dropped.
    pub fn push_field(&mut self, field: Field) -> bool {
        if self.field(&field.name).is_some() {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Builder form of [`Self::push_field`].
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.push_field(field);
        self
    }

    /// Looks up a field by exact, case-sensitive name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the struct has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeDesc,
    /// Opaque metadata such as serialization directives.
    pub tag: String,
    /// Annotation lines reproduced verbatim above the field.
    pub markers: Vec<String>,
}

impl Field {
    /// Creates a field without tag or markers.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: String::new(),
            markers: Vec::new(),
        }
    }

    /// Sets the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Adds a marker line.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }
}

/// A resolved named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    /// Qualified name.
    pub name: QualifiedName,
    /// Underlying shape.
    pub underlying: TypeDesc,
}

impl NamedType {
    /// Creates a named type.
    #[must_use]
    pub fn new(name: QualifiedName, underlying: TypeDesc) -> Self {
        Self { name, underlying }
    }

    /// Returns the struct description if the underlying type is a struct.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructDesc> {
        self.underlying.as_struct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_kind_names() {
        assert_eq!(BasicKind::from_name("byte"), Some(BasicKind::Uint8));
        assert_eq!(BasicKind::from_name("rune"), Some(BasicKind::Int32));
        assert_eq!(BasicKind::from_name("complex64"), None);
        assert_eq!(BasicKind::Float64.name(), "float64");
        assert_eq!(BasicKind::Uintptr.to_string(), "uintptr");
    }

    #[test]
    fn test_scalar_class() {
        assert_eq!(BasicKind::Bool.scalar_class(), ScalarClass::Bool);
        assert_eq!(BasicKind::String.scalar_class(), ScalarClass::String);
        assert_eq!(BasicKind::Int64.scalar_class(), ScalarClass::Int64);
        assert_eq!(BasicKind::Int32.scalar_class(), ScalarClass::Other);
        assert_eq!(BasicKind::Float64.scalar_class(), ScalarClass::Other);
    }

    #[test]
    fn test_zero_literal() {
        assert_eq!(BasicKind::Bool.zero_literal(), "false");
        assert_eq!(BasicKind::String.zero_literal(), "\"\"");
        assert_eq!(BasicKind::Uint16.zero_literal(), "0");
        assert!(BasicKind::Float32.is_numeric());
        assert!(!BasicKind::String.is_numeric());
    }

    #[test]
    fn test_qualified_name_parse() {
        let qn = QualifiedName::parse("github.com/acme/apis/storage/v1alpha1.Bucket")
            .expect("valid path");
        assert_eq!(qn.package, "github.com/acme/apis/storage/v1alpha1");
        assert_eq!(qn.name, "Bucket");
        assert_eq!(qn.package_name(), "v1alpha1");
        assert_eq!(
            qn.to_string(),
            "github.com/acme/apis/storage/v1alpha1.Bucket"
        );

        let qn = QualifiedName::parse("storage.Bucket").expect("valid path");
        assert_eq!(qn.package, "storage");

        assert!(QualifiedName::parse("github.com/acme/storage").is_none());
        assert!(QualifiedName::parse("Bucket").is_none());
        assert!(QualifiedName::parse("storage.").is_none());
    }

    #[test]
    fn test_struct_first_field_wins() {
        let mut s = StructDesc::new();
        assert!(s.push_field(Field::new("Name", TypeDesc::Basic(BasicKind::String))));
        assert!(!s.push_field(Field::new("Name", TypeDesc::Basic(BasicKind::Int64))));
        assert_eq!(s.len(), 1);
        assert_eq!(
            s.field("Name").map(|f| &f.ty),
            Some(&TypeDesc::Basic(BasicKind::String))
        );
        assert!(s.field("name").is_none());
    }

    #[test]
    fn test_for_each_named() {
        let ty = TypeDesc::Struct(
            StructDesc::new()
                .with_field(Field::new(
                    "Rules",
                    TypeDesc::slice(TypeDesc::pointer(TypeDesc::named("a/b", "Rule"))),
                ))
                .with_field(Field::new(
                    "Labels",
                    TypeDesc::map(
                        TypeDesc::Basic(BasicKind::String),
                        TypeDesc::named("a/c", "Label"),
                    ),
                )),
        );
        let mut seen = Vec::new();
        ty.for_each_named(&mut |qn| seen.push(qn.to_string()));
        assert_eq!(seen, vec!["a/b.Rule", "a/c.Label"]);
    }

    #[test]
    fn test_kind_name_and_nilable() {
        assert_eq!(TypeDesc::Basic(BasicKind::Bool).kind_name(), "basic");
        assert!(TypeDesc::slice(TypeDesc::Basic(BasicKind::Bool)).is_nilable());
        assert!(!TypeDesc::Struct(StructDesc::new()).is_nilable());
        assert!(!TypeDesc::named("a", "B").is_nilable());
    }
}
