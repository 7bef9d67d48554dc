//! # Typewright Bench
//!
//! Schema fixtures for typewright performance testing.
//!
//! Every fixture declares the same structs in a local and a remote package so
//! the two sides correlate field by field.

use typewright_schema::{ParseError, SchemaRegistry};

/// Package holding the local side of every fixture.
pub const LOCAL_PACKAGE: &str = "example.com/bench/local";
/// Package holding the remote side of every fixture.
pub const REMOTE_PACKAGE: &str = "example.com/bench/remote";

/// Name of the root struct of [`wide_documents`].
pub const WIDE_ROOT: &str = "Wide";
/// Name of the root struct of [`deep_documents`].
pub const DEEP_ROOT: &str = "Level0";

const FIELD_TYPES: [&str; 5] = [
    "string",
    "*int64",
    "[]string",
    "map[string]string",
    "*bool",
];

/// Builds documents declaring one struct with `fields` fields, cycling
/// through scalar, pointer, slice and map shapes.
#[must_use]
pub fn wide_documents(fields: usize) -> String {
    let mut body = String::new();
    body.push_str(&format!("    <struct name=\"{WIDE_ROOT}\">\n"));
    for idx in 0..fields {
        body.push_str(&format!(
            "        <field name=\"Field{idx}\" type=\"{}\" tag='json:\"field{idx}\"'/>\n",
            FIELD_TYPES[idx % FIELD_TYPES.len()]
        ));
    }
    body.push_str("    </struct>\n");
    packages(&body)
}

/// Builds documents declaring a chain of `depth` structs, each holding a
/// pointer to the next and a slice of leaf records.
#[must_use]
pub fn deep_documents(depth: usize) -> String {
    let mut body = String::new();
    for level in 0..depth {
        body.push_str(&format!("    <struct name=\"Level{level}\">\n"));
        body.push_str("        <field name=\"Name\" type=\"string\"/>\n");
        body.push_str("        <field name=\"Size\" type=\"*int64\"/>\n");
        body.push_str("        <field name=\"Leaves\" type=\"[]Leaf\"/>\n");
        if level + 1 < depth {
            body.push_str(&format!(
                "        <field name=\"Next\" type=\"*Level{}\"/>\n",
                level + 1
            ));
        }
        body.push_str("    </struct>\n");
    }
    body.push_str("    <struct name=\"Leaf\">\n");
    body.push_str("        <field name=\"Key\" type=\"string\"/>\n");
    body.push_str("        <field name=\"Values\" type=\"map[string]*string\"/>\n");
    body.push_str("    </struct>\n");
    packages(&body)
}

/// Loads fixture documents into a registry.
///
/// # Errors
/// Returns `ParseError` if the documents are malformed.
pub fn registry(documents: &str) -> Result<SchemaRegistry, ParseError> {
    SchemaRegistry::from_documents([documents])
}

fn packages(body: &str) -> String {
    format!(
        "<packages>\n<package path=\"{LOCAL_PACKAGE}\" name=\"local\">\n{body}</package>\n\
         <package path=\"{REMOTE_PACKAGE}\" name=\"remote\">\n{body}</package>\n</packages>"
    )
}
