// Copyright 2025 the Starviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How a field's text is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Coerced to `f64`; unparseable text becomes `NaN`.
    Number,
    /// Kept verbatim.
    Text,
}

/// A declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Column name in the CSV header.
    pub name: String,
    /// Interpretation.
    pub kind: FieldKind,
}

/// The declared fields of a CSV source, in column-id order.
///
/// Declared field `i` becomes `ColId(i)`. Columns the schema does not mention are still loaded,
/// as text, with ids after the declared ones in header order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema: every column loads as text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a numeric field.
    pub fn number(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Number)
    }

    /// Declares a text field.
    pub fn text(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Text)
    }

    /// Declares a field. Redeclaring a name replaces its kind in place.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(f) => f.kind = kind,
            None => self.fields.push(Field { name, kind }),
        }
        self
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Position of a declared field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Names of the declared numeric fields.
    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Number)
            .map(|f| f.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaring_keeps_position() {
        let s = Schema::new().number("vmag").text("name").text("vmag");
        assert_eq!(s.position("vmag"), Some(0));
        assert_eq!(s.fields()[0].kind, FieldKind::Text);
        assert_eq!(s.numeric_fields().count(), 0);
    }
}
