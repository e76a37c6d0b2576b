//! Forms: ordered field groups bound to a record
//!
//! A form always has at least one group. Assigning a flat field list replaces
//! the groups with a single unnamed group, and [`Form::fields`] reads the
//! first group, so nothing downstream has to special-case "no groups".

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{AttributeError, SpecError};
use crate::field::Field;
use crate::group::Group;
use crate::record::{Presentable, Record};

/// HTTP verb a form submits with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    /// Create a new record
    Post,
    /// Update an existing record
    Put,
}

impl FormMethod {
    /// Pick the verb from the record's persistence state
    pub fn for_record(record: &dyn Presentable) -> Self {
        if record.is_new_record() {
            FormMethod::Post
        } else {
            FormMethod::Put
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Post => "post",
            FormMethod::Put => "put",
        }
    }

    /// Submit button caption
    pub fn button(&self) -> &'static str {
        match self {
            FormMethod::Post => "Create",
            FormMethod::Put => "Update",
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved field value handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub id: String,
    pub value: Value,
    /// Whether the renderer must escape `value`
    pub sanitize: bool,
}

/// Stand-in record for a form with nothing bound
struct Unbound;

impl Record for Unbound {
    fn read(&self, _accessor: &str) -> Option<Value> {
        None
    }
}

/// An ordered collection of groups plus the record being edited
#[derive(Debug, Clone, PartialEq)]
pub struct Form<R> {
    presentable: Option<R>,
    groups: Vec<Group>,
}

impl<R> Default for Form<R> {
    fn default() -> Self {
        Self {
            presentable: None,
            groups: vec![Group::default()],
        }
    }
}

impl<R> Form<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the record being presented
    pub fn with_presentable(mut self, record: R) -> Self {
        self.presentable = Some(record);
        self
    }

    pub fn set_presentable(&mut self, record: R) {
        self.presentable = Some(record);
    }

    pub fn presentable(&self) -> Option<&R> {
        self.presentable.as_ref()
    }

    /// Replace all groups with one unnamed group built from a field list shape
    pub fn set_fields(&mut self, spec: &Value) -> Result<(), SpecError> {
        self.groups = vec![Group::unnamed(Field::list_from_spec(spec)?)?];
        Ok(())
    }

    /// Replace all groups from a list of group shapes
    pub fn set_groups(&mut self, spec: &Value) -> Result<(), SpecError> {
        self.set_group_list(Group::list_from_spec(spec)?);
        Ok(())
    }

    /// Replace all groups; an empty list leaves one empty default group
    pub fn set_group_list(&mut self, groups: Vec<Group>) {
        self.groups = groups;
        if self.groups.is_empty() {
            self.groups.push(Group::default());
        }
    }

    /// Append a field shape to the first group
    pub fn push_field(&mut self, spec: &Value) -> Result<(), SpecError> {
        self.push(Field::from_spec(spec)?)
    }

    /// Append a field to the first group
    pub fn push(&mut self, field: Field) -> Result<(), SpecError> {
        field.validate()?;
        match self.groups.first_mut() {
            Some(group) => group.push(field),
            None => self.groups.push(Group::unnamed(vec![field])?),
        }
        Ok(())
    }

    /// Fields of the first group
    pub fn fields(&self) -> &[Field] {
        self.groups.first().map(Group::fields).unwrap_or_default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

impl<R: Presentable> Form<R> {
    /// Submit verb; a form with nothing bound creates
    pub fn method(&self) -> FormMethod {
        match &self.presentable {
            Some(record) => FormMethod::for_record(record),
            None => FormMethod::Post,
        }
    }

    /// Submit button caption ("Create" or "Update")
    pub fn button(&self) -> &'static str {
        self.method().button()
    }
}

impl<R: Record> Form<R> {
    /// Resolve every field of every group against the bound record, in order
    pub fn values(&self) -> Result<Vec<FieldValue>, AttributeError> {
        let record: &dyn Record = match &self.presentable {
            Some(record) => record,
            None => &Unbound,
        };

        self.groups
            .iter()
            .flat_map(Group::fields)
            .map(|field| {
                Ok(FieldValue {
                    id: field.id(),
                    value: field.resolve(record)?,
                    sanitize: field.attribute().sanitize(),
                })
            })
            .collect()
    }
}
