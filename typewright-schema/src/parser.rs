//! Package document parser.
//!
//! A package document declares the types of one or more packages:
//!
//! ```xml
//! <package path="github.com/acme/apis/storage/v1alpha1" name="v1alpha1">
//!     <struct name="BucketParameters">
//!         <field name="Location" type="string" tag='json:"location"'/>
//!         <field name="Labels" type="map[string]string">
//!             <marker>+optional</marker>
//!         </field>
//!     </struct>
//!     <alias name="Region" type="string"/>
//! </package>
//! ```
//!
//! Several `<package>` elements may be wrapped in a `<packages>` root.

use crate::error::ParseError;
use crate::types::{AliasDecl, FieldDecl, PackageDef, StructDecl, TypeDecl};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses every package declared in an XML document.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, contains unknown elements,
/// or declares no package at all.
pub fn parse_packages(xml: &str) -> Result<Vec<PackageDef>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut packages = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "package" => {
                        let mut package = parse_package_attrs(e)?;
                        parse_package_body(&mut reader, &mut package)?;
                        packages.push(package);
                    }
                    "packages" => {}
                    other => return Err(ParseError::unknown_element(other, "document")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                if name == "package" {
                    packages.push(parse_package_attrs(e)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if packages.is_empty() {
        return Err(ParseError::InvalidStructure {
            message: "No package element found".to_string(),
        });
    }
    Ok(packages)
}

/// Parses a document that declares exactly one package.
///
/// # Errors
/// Returns `ParseError` on malformed input or when the document declares
/// more than one package.
pub fn parse_package(xml: &str) -> Result<PackageDef, ParseError> {
    let mut packages = parse_packages(xml)?;
    if packages.len() > 1 {
        return Err(ParseError::InvalidStructure {
            message: format!("expected one package, found {}", packages.len()),
        });
    }
    packages.pop().ok_or_else(|| ParseError::InvalidStructure {
        message: "No package element found".to_string(),
    })
}

/// Parses the package element attributes.
fn parse_package_attrs(e: &BytesStart<'_>) -> Result<PackageDef, ParseError> {
    let mut path = None;
    let mut name = None;
    let mut description = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "path" => path = Some(value.to_string()),
            "name" => name = Some(value.to_string()),
            "description" => description = Some(value.to_string()),
            _ => {}
        }
    }

    let path = path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ParseError::missing_attr("package", "path"))?;
    let name = name.unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());

    let mut package = PackageDef::new(path, name);
    package.description = description;
    Ok(package)
}

/// Parses the children of a package element up to its end tag.
fn parse_package_body(
    reader: &mut Reader<&[u8]>,
    package: &mut PackageDef,
) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "struct" => {
                        let decl = parse_struct(reader, e, &package.path)?;
                        package.add_type(TypeDecl::Struct(decl))?;
                    }
                    "alias" => {
                        let decl = parse_alias(e)?;
                        skip_to_end(reader)?;
                        package.add_type(TypeDecl::Alias(decl))?;
                    }
                    other => return Err(ParseError::unknown_element(other, "package")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "struct" => {
                        let decl = parse_struct_attrs(e)?;
                        package.add_type(TypeDecl::Struct(decl))?;
                    }
                    "alias" => package.add_type(TypeDecl::Alias(parse_alias(e)?))?,
                    other => return Err(ParseError::unknown_element(other, "package")),
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated package '{}'", package.path),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses the struct element attributes.
fn parse_struct_attrs(e: &BytesStart<'_>) -> Result<StructDecl, ParseError> {
    let mut name = String::new();
    let mut description = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = value.to_string(),
            "description" => description = Some(value.to_string()),
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ParseError::missing_attr("struct", "name"));
    }

    let mut decl = StructDecl::new(name);
    decl.description = description;
    Ok(decl)
}

/// Parses a struct declaration with its fields.
fn parse_struct(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    package_path: &str,
) -> Result<StructDecl, ParseError> {
    let mut decl = parse_struct_attrs(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name != "field" {
                    return Err(ParseError::unknown_element(tag_name, "struct"));
                }
                let mut field = parse_field_attrs(e)?;
                parse_field_markers(reader, &mut field)?;
                add_field(&mut decl, field, package_path);
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name != "field" {
                    return Err(ParseError::unknown_element(tag_name, "struct"));
                }
                let field = parse_field_attrs(e)?;
                add_field(&mut decl, field, package_path);
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated struct '{}'", decl.name),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(decl)
}

fn add_field(decl: &mut StructDecl, field: FieldDecl, package_path: &str) {
    let field_name = field.name.clone();
    if !decl.add_field(field) {
        tracing::warn!(
            "Dropping duplicate field {} in {}.{}",
            field_name,
            package_path,
            decl.name
        );
    }
}

/// Parses the field element attributes.
fn parse_field_attrs(e: &BytesStart<'_>) -> Result<FieldDecl, ParseError> {
    let mut name = String::new();
    let mut type_expr = String::new();
    let mut tag = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = value.to_string(),
            "type" => type_expr = value.to_string(),
            "tag" => tag = Some(value.to_string()),
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ParseError::missing_attr("field", "name"));
    }
    if type_expr.is_empty() {
        return Err(ParseError::missing_attr("field", "type"));
    }

    let mut field = FieldDecl::new(name, type_expr);
    field.tag = tag;
    Ok(field)
}

/// Parses the `<marker>` children of a field up to the field's end tag.
fn parse_field_markers(
    reader: &mut Reader<&[u8]>,
    field: &mut FieldDecl,
) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let tag_name = std::str::from_utf8(&name_bytes)?;
                if tag_name != "marker" {
                    return Err(ParseError::unknown_element(tag_name, "field"));
                }
                let text = read_text(reader)?;
                if !text.is_empty() {
                    field.markers.push(text);
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated field '{}'", field.name),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses an alias declaration.
fn parse_alias(e: &BytesStart<'_>) -> Result<AliasDecl, ParseError> {
    let mut name = String::new();
    let mut type_expr = String::new();
    let mut description = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = value.to_string(),
            "type" => type_expr = value.to_string(),
            "description" => description = Some(value.to_string()),
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ParseError::missing_attr("alias", "name"));
    }
    if type_expr.is_empty() {
        return Err(ParseError::missing_attr("alias", "type"));
    }

    let mut decl = AliasDecl::new(name, type_expr);
    decl.description = description;
    Ok(decl)
}

/// Reads the text content of the current element, consuming its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, ParseError> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(ref t)) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Ok(Event::CData(ref t)) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
