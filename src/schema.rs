//! Variable schema and flattened column registry.
//!
//! A granule schema is declared as one top-level [`VariableSet`] plus any
//! number of named sub-group sets. [`ColumnRegistry`] flattens that
//! declaration once into the ordered output columns, each carrying its
//! source path, numeric kind and optional fill sentinel.

pub mod gedi_l4a;

use crate::error::{Error, Result};
use polars::prelude::DataType;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Value kind of a declared variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Integer,
    Float,
    String,
}

impl VariableKind {
    /// Polars dtype every column of this kind is normalised to
    pub fn dtype(&self) -> DataType {
        match self {
            VariableKind::Integer => DataType::Int64,
            VariableKind::Float => DataType::Float64,
            VariableKind::String => DataType::String,
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Integer => write!(f, "integer"),
            VariableKind::Float => write!(f, "float"),
            VariableKind::String => write!(f, "string"),
        }
    }
}

/// Which fill convention a sentinel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillKind {
    Float,
    Byte,
}

/// Reserved source value meaning "no data"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValue {
    /// Sentinel stored in floating point fields
    Float(f64),
    /// Sentinel stored in unsigned byte flag fields
    Byte(i64),
}

impl FillValue {
    pub fn kind(&self) -> FillKind {
        match self {
            FillValue::Float(_) => FillKind::Float,
            FillValue::Byte(_) => FillKind::Byte,
        }
    }

    /// Variable kind the sentinel may be attached to
    pub fn variable_kind(&self) -> VariableKind {
        match self {
            FillValue::Float(_) => VariableKind::Float,
            FillValue::Byte(_) => VariableKind::Integer,
        }
    }
}

/// Three disjoint sets of variable names grouped by kind.
///
/// Insertion order never leaks out: [`numeric_vars`](Self::numeric_vars) and
/// [`all_vars`](Self::all_vars) are always lexicographically sorted, and that
/// order is the output column order for the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    integer_variables: Vec<String>,
    float_variables: Vec<String>,
    string_variables: Vec<String>,
    fills: BTreeMap<String, FillValue>,
}

impl VariableSet {
    /// Create a variable set, rejecting names declared more than once
    pub fn new<I, F, S>(integers: I, floats: F, strings: S) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let set = Self {
            integer_variables: integers.into_iter().map(Into::into).collect(),
            float_variables: floats.into_iter().map(Into::into).collect(),
            string_variables: strings.into_iter().map(Into::into).collect(),
            fills: BTreeMap::new(),
        };

        let mut seen = HashSet::new();
        for name in set
            .integer_variables
            .iter()
            .chain(&set.float_variables)
            .chain(&set.string_variables)
        {
            if name.is_empty() || name.contains('/') {
                return Err(Error::schema(format!("invalid variable name '{}'", name)));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::schema(format!(
                    "variable '{}' is declared more than once",
                    name
                )));
            }
        }

        Ok(set)
    }

    /// Attach the floating point fill sentinel to float variables
    pub fn with_float_fill<N>(self, names: N, sentinel: f64) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        self.with_fill(names, FillValue::Float(sentinel))
    }

    /// Attach the byte fill sentinel to integer flag variables
    pub fn with_byte_fill<N>(self, names: N, sentinel: i64) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        self.with_fill(names, FillValue::Byte(sentinel))
    }

    fn with_fill<N>(mut self, names: N, fill: FillValue) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            match self.kind_of(name) {
                None => {
                    return Err(Error::schema(format!(
                        "fill sentinel attached to undeclared variable '{}'",
                        name
                    )));
                }
                Some(kind) if kind != fill.variable_kind() => {
                    return Err(Error::schema(format!(
                        "{:?} fill sentinel attached to {} variable '{}'",
                        fill.kind(),
                        kind,
                        name
                    )));
                }
                Some(_) => {}
            }
            self.fills.insert(name.to_string(), fill);
        }
        Ok(self)
    }

    pub fn integer_variables(&self) -> &[String] {
        &self.integer_variables
    }

    pub fn float_variables(&self) -> &[String] {
        &self.float_variables
    }

    pub fn string_variables(&self) -> &[String] {
        &self.string_variables
    }

    /// Returns all numeric variables sorted alphanumerically
    pub fn numeric_vars(&self) -> Vec<String> {
        let mut vars: Vec<String> = self
            .integer_variables
            .iter()
            .chain(&self.float_variables)
            .cloned()
            .collect();
        vars.sort();
        vars
    }

    /// Returns all variables sorted alphanumerically
    pub fn all_vars(&self) -> Vec<String> {
        let mut vars = self.numeric_vars();
        vars.extend(self.string_variables.iter().cloned());
        vars.sort();
        vars
    }

    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        let declared = |vars: &[String]| vars.iter().any(|v| v == name);
        if declared(&self.integer_variables) {
            Some(VariableKind::Integer)
        } else if declared(&self.float_variables) {
            Some(VariableKind::Float)
        } else if declared(&self.string_variables) {
            Some(VariableKind::String)
        } else {
            None
        }
    }

    pub fn fill_of(&self, name: &str) -> Option<FillValue> {
        self.fills.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.integer_variables.len() + self.float_variables.len() + self.string_variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Top-level variables plus named sub-groups, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionSchema {
    top_level: VariableSet,
    groups: Vec<(String, VariableSet)>,
}

impl ExtractionSchema {
    pub fn new(top_level: VariableSet) -> Self {
        Self {
            top_level,
            groups: Vec::new(),
        }
    }

    /// Add a named sub-group; group names must be unique
    pub fn with_group(mut self, name: impl Into<String>, variables: VariableSet) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::schema("sub-group name must not be empty"));
        }
        if self.groups.iter().any(|(existing, _)| *existing == name) {
            return Err(Error::schema(format!(
                "sub-group '{}' is declared more than once",
                name
            )));
        }
        self.groups.push((name, variables));
        Ok(self)
    }

    pub fn top_level(&self) -> &VariableSet {
        &self.top_level
    }

    pub fn groups(&self) -> &[(String, VariableSet)] {
        &self.groups
    }
}

/// One flattened output column and where it comes from
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Bare variable name, used as the output column name
    pub name: String,
    /// Path relative to the beam group, `group/variable` for sub-groups
    pub source_path: String,
    pub group: Option<String>,
    pub kind: VariableKind,
    pub fill: Option<FillValue>,
}

impl ColumnSpec {
    /// Human readable origin used in diagnostics
    pub fn origin(&self) -> String {
        match &self.group {
            Some(group) => format!("sub-group '{}'", group),
            None => "top level".to_string(),
        }
    }
}

/// Ordered mapping from output column name to source location and kind
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRegistry {
    columns: Vec<ColumnSpec>,
    index: HashMap<String, usize>,
}

impl ColumnRegistry {
    /// Flatten a schema into output columns.
    ///
    /// Top-level variables come first in `all_vars()` order, followed by each
    /// sub-group in declaration order. Two entries flattening onto the same
    /// output name is an error.
    pub fn build(schema: &ExtractionSchema) -> Result<Self> {
        let mut registry = Self {
            columns: Vec::new(),
            index: HashMap::new(),
        };

        registry.extend(None, schema.top_level())?;
        for (group, variables) in schema.groups() {
            registry.extend(Some(group), variables)?;
        }

        Ok(registry)
    }

    fn extend(&mut self, group: Option<&String>, variables: &VariableSet) -> Result<()> {
        for name in variables.all_vars() {
            let kind = variables
                .kind_of(&name)
                .ok_or_else(|| Error::schema(format!("variable '{}' has no kind", name)))?;
            let spec = ColumnSpec {
                source_path: match group {
                    Some(group) => format!("{}/{}", group, name),
                    None => name.clone(),
                },
                group: group.cloned(),
                kind,
                fill: variables.fill_of(&name),
                name,
            };

            if let Some(&existing) = self.index.get(&spec.name) {
                return Err(Error::duplicate_column(
                    spec.name.clone(),
                    self.columns[existing].origin(),
                    spec.origin(),
                ));
            }

            self.index.insert(spec.name.clone(), self.columns.len());
            self.columns.push(spec);
        }
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Output column names in registry order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns carrying a fill sentinel of the given kind, in registry order
    pub fn fill_columns(&self, kind: FillKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.fill.is_some_and(|fill| fill.kind() == kind))
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
